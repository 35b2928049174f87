use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file")]
    Parse(#[from] toml::de::Error),

    #[error("missing configuration section [firsts]")]
    MissingSection,

    #[error("missing configuration item {item}; {required} are required")]
    MissingItem {
        item: &'static str,
        required: String,
    },

    #[error("invalid listen address {value}")]
    InvalidListen {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to firsts database {path}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("firsts query failed")]
    Query(#[from] rusqlite::Error),

    #[error("firsts query timed out after {0:?}")]
    Timeout(Duration),

    #[error("firsts query worker stopped unexpectedly")]
    Worker(#[from] tokio::task::JoinError),
}
