use std::io::Read;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::catalog::{DetailClient, MovieId};
use crate::store::{Rating, SelectionStore};

/// One line of a picks file: `id[,rating][,review]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pick {
    pub(crate) id: MovieId,
    pub(crate) rating: Option<Rating>,
    pub(crate) review: Option<String>,
}

/// Parses a picks CSV. A first row whose id column is not numeric is treated
/// as a header; blank rows are skipped. Reviews with commas must be quoted.
pub(crate) fn parse_picks<R: Read>(reader: R) -> Result<Vec<Pick>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut picks = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let line = idx + 1;
        let record = record.with_context(|| format!("invalid CSV at record {line}"))?;
        let raw_id = record.get(0).unwrap_or_default();
        if raw_id.is_empty() && record.iter().all(str::is_empty) {
            continue;
        }
        let id = match raw_id.parse::<MovieId>() {
            Ok(id) => id,
            Err(_) if idx == 0 => continue,
            Err(err) => bail!("record {line}: {err}"),
        };
        if record.len() > 3 {
            bail!(
                "record {line}: expected at most 3 fields, found {}; quote reviews that contain commas",
                record.len()
            );
        }

        let rating = match record.get(1).filter(|raw| !raw.is_empty()) {
            Some(raw) => {
                let value = raw
                    .parse::<i64>()
                    .with_context(|| format!("record {line}: invalid rating {raw:?}"))?;
                Some(Rating::new(value).with_context(|| format!("record {line}"))?)
            }
            None => None,
        };
        let review = record
            .get(2)
            .filter(|raw| !raw.is_empty())
            .map(str::to_string);

        picks.push(Pick { id, rating, review });
    }
    Ok(picks)
}

/// Fetches, selects, and annotates each pick in order. Stops at the first
/// catalog failure.
pub(crate) fn apply_picks<C: DetailClient>(
    client: &C,
    store: &mut SelectionStore,
    picks: Vec<Pick>,
) -> Result<()> {
    for pick in picks {
        let detail = client
            .fetch(pick.id)
            .with_context(|| format!("failed to fetch movie {}", pick.id))?;
        store.upsert(pick.id, detail);
        if pick.rating.is_some() || pick.review.is_some() {
            store.annotate(pick.id, pick.rating, pick.review)?;
        }
    }
    info!(selected = store.len(), "picks applied");
    Ok(())
}
