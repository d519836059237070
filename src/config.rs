use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::error::ConfigError;
use crate::export::ExportConfiguration;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// On-disk `config.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub export: ExportConfiguration,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_ms: 5_000,
            read_timeout_ms: 10_000,
            export: ExportConfiguration::default(),
        }
    }
}

impl FileConfig {
    /// Reads `path`; a missing file yields defaults unless `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Effective settings after layering file, environment, and flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub export: ExportConfiguration,
}

impl Settings {
    pub fn resolve(file: FileConfig, args: &GlobalArgs) -> Self {
        let mut export = file.export;
        if let Some(lang) = args.lang {
            export.title_language = lang;
        }
        if let Some(id_kind) = args.id_kind {
            export.id_kind = id_kind;
        }
        if args.no_title {
            export.title = false;
        }
        if args.no_year {
            export.year = false;
        }
        if args.rating {
            export.rating = true;
        }
        if args.review {
            export.review = true;
        }

        let api_key = args
            .api_key
            .clone()
            .or(file.api_key)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Self {
            api_key,
            base_url: file.base_url,
            connect_timeout: Duration::from_millis(file.connect_timeout_ms),
            read_timeout: Duration::from_millis(file.read_timeout_ms),
            export,
        }
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

/// Explicit `--config` must exist; the default location is optional.
pub fn load_settings(args: &GlobalArgs, default_path: Option<PathBuf>) -> anyhow::Result<Settings> {
    let file = match (&args.config, default_path) {
        (Some(path), _) => FileConfig::load(path, true)?,
        (None, Some(path)) => FileConfig::load(&path, false)?,
        (None, None) => FileConfig::default(),
    };
    Ok(Settings::resolve(file, args))
}
