use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
const REQUIRED_ITEMS: [&str; 2] = ["database", "archive_dir"];

/// Process-wide settings, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: PathBuf,
    pub archive_dir: PathBuf,
    pub listen: SocketAddr,
    pub query_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    firsts: Option<RawFirsts>,
}

#[derive(Debug, Deserialize)]
struct RawFirsts {
    database: Option<PathBuf>,
    archive_dir: Option<PathBuf>,
    listen: Option<String>,
    query_timeout_ms: Option<u64>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let parsed: RawConfig = toml::from_str(raw)?;
        let firsts = parsed.firsts.ok_or(ConfigError::MissingSection)?;

        let database = firsts.database.ok_or_else(|| missing("database"))?;
        let archive_dir = firsts.archive_dir.ok_or_else(|| missing("archive_dir"))?;

        let listen_raw = firsts
            .listen
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidListen {
                value: listen_raw.clone(),
                source,
            })?;

        let query_timeout =
            Duration::from_millis(firsts.query_timeout_ms.unwrap_or(DEFAULT_QUERY_TIMEOUT_MS));

        Ok(Self {
            database,
            archive_dir,
            listen,
            query_timeout,
        })
    }
}

fn missing(item: &'static str) -> ConfigError {
    ConfigError::MissingItem {
        item,
        required: REQUIRED_ITEMS.join(", "),
    }
}
