use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::kernel::lexicon::{Lexicon, SongTable};

pub const ENV_DB_PATH: &str = "ATTUNE_DB_PATH";
pub const ENV_SONGS: &str = "ATTUNE_SONGS";
pub const ENV_CHANNEL_CAPACITY: &str = "ATTUNE_CHANNEL_CAPACITY";

const DEFAULT_DB_PATH: &str = "attune.db";
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got `{value}`")]
    InvalidNumber { name: &'static str, value: String },

    #[error("reading song table {path}: {source}")]
    SongsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing song table {path}: {source}")]
    SongsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file; `:memory:` keeps everything in process.
    pub db_path: PathBuf,
    /// Optional JSON object `{ "<song>": "<asset path>" }` layered over the built-in songs.
    pub songs_path: Option<PathBuf>,
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            songs_path: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Config::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            cfg.db_path = PathBuf::from(path.trim());
        }
        if let Some(path) = lookup(ENV_SONGS).filter(|v| !v.trim().is_empty()) {
            cfg.songs_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(raw) = lookup(ENV_CHANNEL_CAPACITY) {
            cfg.channel_capacity = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: ENV_CHANNEL_CAPACITY,
                        value: raw,
                    })
                }
            };
        }

        Ok(cfg)
    }

    /// Built-in months and songs, plus the songs file if one is configured.
    pub fn lexicon(&self) -> Result<Lexicon, ConfigError> {
        let mut lexicon = Lexicon::default();

        if let Some(path) = &self.songs_path {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::SongsIo {
                path: path.clone(),
                source,
            })?;
            let extra: HashMap<String, String> =
                serde_json::from_str(&text).map_err(|source| ConfigError::SongsParse {
                    path: path.clone(),
                    source,
                })?;
            let extra = SongTable::new(extra);
            info!("Loaded {} songs from {}", extra.len(), path.display());
            lexicon.songs.merge(extra);
        }

        Ok(lexicon)
    }
}
