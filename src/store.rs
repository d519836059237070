use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::catalog::{DetailRecord, MovieId};
use crate::error::StoreError;
use crate::export::{ExportConfiguration, Table};

/// Personal rating on the 1-10 scale used by the `Rating10` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, StoreError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(StoreError::InvalidRating(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub rating: Option<Rating>,
    pub review: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEntry {
    pub id: MovieId,
    pub detail: DetailRecord,
    pub annotation: Annotation,
}

/// Selected movies for one session, keyed by id and kept in the order each id
/// was first added.
#[derive(Debug, Default)]
pub struct SelectionStore {
    entries: Vec<SelectionEntry>,
    positions: HashMap<MovieId, usize>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn get(&self, id: MovieId) -> Option<&SelectionEntry> {
        self.positions.get(&id).map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }

    /// Adds `detail` under `id`, or swaps the stored record of an existing
    /// entry in place. The annotation and position of an existing entry are
    /// kept.
    pub fn upsert(&mut self, id: MovieId, detail: DetailRecord) {
        match self.positions.get(&id) {
            Some(&idx) => {
                debug!(%id, "replacing selected detail record");
                self.entries[idx].detail = detail;
            }
            None => {
                debug!(%id, "adding selection");
                self.positions.insert(id, self.entries.len());
                self.entries.push(SelectionEntry {
                    id,
                    detail,
                    annotation: Annotation::default(),
                });
            }
        }
    }

    /// Overwrites the supplied annotation fields. `None` means "not provided"
    /// and keeps the previous value.
    pub fn annotate(
        &mut self,
        id: MovieId,
        rating: Option<Rating>,
        review: Option<String>,
    ) -> Result<(), StoreError> {
        let entry = self.entry_mut(id)?;
        if let Some(rating) = rating {
            entry.annotation.rating = Some(rating);
        }
        if let Some(review) = review {
            entry.annotation.review = Some(review);
        }
        Ok(())
    }

    pub fn clear_annotation(&mut self, id: MovieId) -> Result<(), StoreError> {
        self.entry_mut(id)?.annotation = Annotation::default();
        Ok(())
    }

    pub fn remove(&mut self, id: MovieId) -> Option<SelectionEntry> {
        let idx = self.positions.remove(&id)?;
        let removed = self.entries.remove(idx);
        for entry in &self.entries[idx..] {
            if let Some(position) = self.positions.get_mut(&entry.id) {
                *position -= 1;
            }
        }
        debug!(%id, "removed selection");
        Some(removed)
    }

    pub fn export(&self, config: &ExportConfiguration) -> Table {
        Table::from_entries(self.entries.iter(), config)
    }

    fn entry_mut(&mut self, id: MovieId) -> Result<&mut SelectionEntry, StoreError> {
        match self.positions.get(&id) {
            Some(&idx) => Ok(&mut self.entries[idx]),
            None => Err(StoreError::UnknownIdentifier(id)),
        }
    }
}
