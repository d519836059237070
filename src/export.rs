use std::io::Write;

use serde::Deserialize;

use crate::catalog::TitleLanguage;
use crate::format::release_year;
use crate::store::SelectionEntry;

/// Which identifier goes in the first column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    #[default]
    Tmdb,
    Imdb,
}

/// Columns enabled for export. Only shapes the table; never which entries
/// appear in it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfiguration {
    pub id_kind: IdKind,
    pub title_language: TitleLanguage,
    pub title: bool,
    pub year: bool,
    pub rating: bool,
    pub review: bool,
}

impl Default for ExportConfiguration {
    fn default() -> Self {
        Self {
            id_kind: IdKind::Tmdb,
            title_language: TitleLanguage::Original,
            title: true,
            year: true,
            rating: false,
            review: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    TmdbId,
    ImdbId,
    Title,
    Year,
    Rating,
    Review,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Self::TmdbId => "tmdbID",
            Self::ImdbId => "imdbID",
            Self::Title => "Title",
            Self::Year => "Year",
            Self::Rating => "Rating10",
            Self::Review => "Review",
        }
    }

    fn cell(self, entry: &SelectionEntry, language: TitleLanguage) -> Option<String> {
        match self {
            Self::TmdbId => Some(entry.id.to_string()),
            Self::ImdbId => entry.detail.imdb_id.clone(),
            Self::Title => Some(entry.detail.title_in(language).to_string()),
            Self::Year => release_year(entry.detail.release_date.as_deref()).map(|year| year.to_string()),
            Self::Rating => entry.annotation.rating.map(|rating| rating.value().to_string()),
            Self::Review => entry.annotation.review.clone(),
        }
    }
}

impl ExportConfiguration {
    /// Identifier first, then Title, Year, Rating10, Review as enabled.
    pub fn columns(&self) -> Vec<Column> {
        let mut columns = vec![match self.id_kind {
            IdKind::Tmdb => Column::TmdbId,
            IdKind::Imdb => Column::ImdbId,
        }];
        for (enabled, column) in [
            (self.title, Column::Title),
            (self.year, Column::Year),
            (self.rating, Column::Rating),
            (self.review, Column::Review),
        ] {
            if enabled {
                columns.push(column);
            }
        }
        columns
    }
}

/// Derived export table. A `None` cell is a missing value and is written as an
/// empty CSV field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub(crate) fn from_entries<'a>(
        entries: impl Iterator<Item = &'a SelectionEntry>,
        config: &ExportConfiguration,
    ) -> Self {
        let columns = config.columns();
        let rows = entries
            .map(|entry| {
                columns
                    .iter()
                    .map(|column| column.cell(entry, config.title_language))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.header()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.headers())?;
        for row in &self.rows {
            out.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        out.flush()?;
        Ok(())
    }
}
