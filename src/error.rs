use thiserror::Error;

use crate::catalog::MovieId;

/// Failures reported by a catalog client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream rate limited: {0}")]
    UpstreamRateLimited(String),

    /// A record came back without a field the caller cannot do without.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("movie {0} has not been selected")]
    UnknownIdentifier(MovieId),

    #[error("rating {0} is outside 1..=10")]
    InvalidRating(i64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no TMDb API key configured (set TMDB_API_KEY or api_key in the config file)")]
    MissingApiKey,
}
