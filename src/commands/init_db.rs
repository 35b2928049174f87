use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::cli::InitDbArgs;
use crate::config::AppConfig;
use crate::store::{configure_connection, ensure_schema};
use crate::util::ensure_directory;

pub fn run(args: InitDbArgs) -> Result<()> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration {}", args.config.display()))?;

    if let Some(parent) = config
        .database
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        ensure_directory(parent)?;
    }

    let connection = Connection::open(&config.database)
        .with_context(|| format!("failed to open {}", config.database.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;

    info!(path = %config.database.display(), "firsts schema ready");
    Ok(())
}
