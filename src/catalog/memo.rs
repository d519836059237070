use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

use super::{DetailClient, DetailRecord, MovieId, SearchClient, SummaryRecord, normalize_query};
use crate::error::CatalogError;

/// Session-lifetime cache in front of a catalog client. Only successful
/// responses are remembered.
pub(crate) struct Memoized<C> {
    inner: C,
    searches: RefCell<HashMap<String, Vec<SummaryRecord>>>,
    details: RefCell<HashMap<MovieId, DetailRecord>>,
}

impl<C> Memoized<C> {
    pub(crate) fn new(inner: C) -> Self {
        Self {
            inner,
            searches: RefCell::new(HashMap::new()),
            details: RefCell::new(HashMap::new()),
        }
    }
}

impl<C: SearchClient> SearchClient for Memoized<C> {
    fn search(&self, query: &str) -> Result<Vec<SummaryRecord>, CatalogError> {
        let key = normalize_query(query).to_lowercase();
        if let Some(hit) = self.searches.borrow().get(&key) {
            debug!(query = %key, "search cache hit");
            return Ok(hit.clone());
        }
        let results = self.inner.search(query)?;
        self.searches.borrow_mut().insert(key, results.clone());
        Ok(results)
    }
}

impl<C: DetailClient> DetailClient for Memoized<C> {
    fn fetch(&self, id: MovieId) -> Result<DetailRecord, CatalogError> {
        if let Some(hit) = self.details.borrow().get(&id) {
            debug!(%id, "detail cache hit");
            return Ok(hit.clone());
        }
        let record = self.inner.fetch(id)?;
        self.details.borrow_mut().insert(id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Counting {
        searches: Cell<usize>,
        fetches: Cell<usize>,
        fail_fetch: bool,
    }

    impl SearchClient for Counting {
        fn search(&self, _query: &str) -> Result<Vec<SummaryRecord>, CatalogError> {
            self.searches.set(self.searches.get() + 1);
            Ok(vec![SummaryRecord {
                id: MovieId(1),
                title: "Alien".to_string(),
                original_title: "Alien".to_string(),
                release_date: Some("1979-05-25".to_string()),
                popularity: 3.0,
            }])
        }
    }

    impl DetailClient for Counting {
        fn fetch(&self, id: MovieId) -> Result<DetailRecord, CatalogError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail_fetch {
                return Err(CatalogError::UpstreamUnavailable("down".to_string()));
            }
            Ok(DetailRecord {
                id,
                title: "Alien".to_string(),
                original_title: "Alien".to_string(),
                release_date: None,
                runtime: None,
                genres: Vec::new(),
                vote_average: None,
                overview: None,
                poster_path: None,
                imdb_id: None,
            })
        }
    }

    fn counting(fail_fetch: bool) -> Memoized<Counting> {
        Memoized::new(Counting {
            searches: Cell::new(0),
            fetches: Cell::new(0),
            fail_fetch,
        })
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let client = counting(false);

        client.search("Alien").expect("first search");
        client.search("  alien ").expect("second search");
        client.fetch(MovieId(1)).expect("first fetch");
        client.fetch(MovieId(1)).expect("second fetch");

        assert_eq!(client.inner.searches.get(), 1);
        assert_eq!(client.inner.fetches.get(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let client = counting(true);

        assert!(client.fetch(MovieId(1)).is_err());
        assert!(client.fetch(MovieId(1)).is_err());

        assert_eq!(client.inner.fetches.get(), 2);
    }
}
