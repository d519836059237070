mod memo;
mod tmdb;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::CatalogError;

pub(crate) use memo::Memoized;
pub(crate) use tmdb::TmdbClient;

/// Upstream catalog key (the TMDb numeric id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for MovieId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<u64>()
            .map(MovieId)
            .map_err(|_| format!("invalid movie id: {raw:?}"))
    }
}

/// Which title variant to show and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TitleLanguage {
    #[default]
    Original,
    Localized,
}

/// One row of a search result page.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub id: MovieId,
    pub title: String,
    pub original_title: String,
    pub release_date: Option<String>,
    pub popularity: f64,
}

impl SummaryRecord {
    pub fn title_in(&self, language: TitleLanguage) -> &str {
        pick_title(&self.original_title, &self.title, language)
    }
}

/// Snapshot of a movie's detail record, taken when it was selected.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub id: MovieId,
    pub title: String,
    pub original_title: String,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub imdb_id: Option<String>,
}

impl DetailRecord {
    pub fn title_in(&self, language: TitleLanguage) -> &str {
        pick_title(&self.original_title, &self.title, language)
    }
}

fn pick_title<'a>(original: &'a str, localized: &'a str, language: TitleLanguage) -> &'a str {
    match language {
        TitleLanguage::Original if !original.trim().is_empty() => original,
        TitleLanguage::Original | TitleLanguage::Localized => localized,
    }
}

pub trait SearchClient {
    /// Every result for `query` across all pages, most popular first.
    fn search(&self, query: &str) -> Result<Vec<SummaryRecord>, CatalogError>;
}

pub trait DetailClient {
    fn fetch(&self, id: MovieId) -> Result<DetailRecord, CatalogError>;
}

/// Collapses runs of whitespace; the HTTP layer does the URL encoding.
pub(crate) fn normalize_query(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_id_parses_trimmed_digits() {
        assert_eq!(" 550 ".parse::<MovieId>(), Ok(MovieId(550)));
        assert!("tt0137523".parse::<MovieId>().is_err());
    }

    #[test]
    fn original_title_falls_back_to_localized_when_blank() {
        assert_eq!(pick_title("", "Spirited Away", TitleLanguage::Original), "Spirited Away");
        assert_eq!(
            pick_title("千と千尋の神隠し", "Spirited Away", TitleLanguage::Original),
            "千と千尋の神隠し"
        );
        assert_eq!(
            pick_title("千と千尋の神隠し", "Spirited Away", TitleLanguage::Localized),
            "Spirited Away"
        );
    }

    #[test]
    fn normalize_query_collapses_whitespace() {
        assert_eq!(normalize_query("  fight   club\t"), "fight club");
        assert_eq!(normalize_query("   "), "");
    }
}
