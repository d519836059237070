use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{DetailClient, DetailRecord, MovieId, SearchClient, SummaryRecord, normalize_query};
use crate::error::CatalogError;
use crate::http::{build_agent, get_text};

/// TMDb refuses page numbers above this.
const MAX_SEARCH_PAGES: u32 = 500;

/// TMDb v3 client for the search and detail endpoints.
pub(crate) struct TmdbClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            agent: build_agent(connect_timeout, read_timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn search_page(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError> {
        let page_text = page.to_string();
        let raw = get_text(
            &self.agent,
            &format!("{}/search/movie", self.base_url),
            &[
                ("query", query),
                ("page", page_text.as_str()),
                ("api_key", self.api_key.as_str()),
            ],
        )?;
        parse_search_page(&raw)
    }
}

impl SearchClient for TmdbClient {
    fn search(&self, query: &str) -> Result<Vec<SummaryRecord>, CatalogError> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let first = self.search_page(&query, 1)?;
        let total_pages = first.total_pages.min(MAX_SEARCH_PAGES);
        let mut results: Vec<SummaryRecord> =
            first.results.into_iter().map(RawSummary::into_record).collect();
        for page in 2..=total_pages {
            let next = self.search_page(&query, page)?;
            results.extend(next.results.into_iter().map(RawSummary::into_record));
        }
        debug!(query = %query, total_pages, results = results.len(), "search complete");

        sort_by_popularity(&mut results);
        Ok(results)
    }
}

impl DetailClient for TmdbClient {
    fn fetch(&self, id: MovieId) -> Result<DetailRecord, CatalogError> {
        let raw = get_text(
            &self.agent,
            &format!("{}/movie/{id}", self.base_url),
            &[("api_key", self.api_key.as_str())],
        )?;
        let record = parse_detail(&raw)?;
        info!(%id, title = %record.title, "fetched movie detail");
        Ok(record)
    }
}

/// Most popular first; ties keep upstream order.
pub(crate) fn sort_by_popularity(results: &mut [SummaryRecord]) {
    results.sort_by(|left, right| right.popularity.total_cmp(&left.popularity));
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<RawSummary>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    original_title: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    popularity: f64,
}

impl RawSummary {
    fn into_record(self) -> SummaryRecord {
        SummaryRecord {
            id: MovieId(self.id),
            title: self.title,
            original_title: self.original_title,
            release_date: non_empty(self.release_date),
            popularity: self.popularity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    id: u64,
    title: Option<String>,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<RawGenre>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    imdb_id: Option<String>,
}

fn parse_json(raw: &str) -> Result<Value, CatalogError> {
    serde_json::from_str(raw)
        .map_err(|err| CatalogError::UpstreamUnavailable(format!("undecodable response: {err}")))
}

fn parse_search_page(raw: &str) -> Result<SearchPage, CatalogError> {
    serde_json::from_value(parse_json(raw)?)
        .map_err(|err| CatalogError::MalformedRecord(format!("search page: {err}")))
}

pub(crate) fn parse_detail(raw: &str) -> Result<DetailRecord, CatalogError> {
    let detail: RawDetail = serde_json::from_value(parse_json(raw)?)
        .map_err(|err| CatalogError::MalformedRecord(format!("movie detail: {err}")))?;

    let Some(title) = non_empty(detail.title) else {
        return Err(CatalogError::MalformedRecord(format!(
            "movie {} has no title",
            detail.id
        )));
    };
    let original_title = non_empty(detail.original_title).unwrap_or_else(|| title.clone());

    Ok(DetailRecord {
        id: MovieId(detail.id),
        title,
        original_title,
        release_date: non_empty(detail.release_date),
        runtime: detail.runtime,
        genres: detail
            .genres
            .into_iter()
            .map(|genre| genre.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        vote_average: detail.vote_average,
        overview: non_empty(detail.overview),
        poster_path: non_empty(detail.poster_path),
        imdb_id: non_empty(detail.imdb_id),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
