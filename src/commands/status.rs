use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::archive::latest_archive_date;
use crate::cli::StatusArgs;
use crate::config::AppConfig;
use crate::model::Kind;
use crate::store::SqliteStore;

pub fn run(args: StatusArgs) -> Result<()> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration {}", args.config.display()))?;

    info!(config = %args.config.display(), "status requested");

    match latest_archive_date(&config.archive_dir) {
        Ok(Some(date)) => info!(
            archive_dir = %config.archive_dir.display(),
            latest = %date,
            "latest discoveries archive"
        ),
        Ok(None) => warn!(
            archive_dir = %config.archive_dir.display(),
            "no discoveries archive found"
        ),
        Err(err) => warn!(error = %format!("{err:#}"), "failed to scan archive directory"),
    }

    if !config.database.exists() {
        warn!(path = %config.database.display(), "database file missing");
        return Ok(());
    }

    let store = SqliteStore::new(config.database.clone(), config.query_timeout);
    let counts = store
        .kind_counts()
        .with_context(|| format!("failed to count firsts in {}", store.path().display()))?;

    let mut total = 0_i64;
    for (kind, count) in &counts {
        total += count;
        if Kind::parse(kind).is_some() {
            info!(kind = %kind, firsts = count, "kind count");
        } else {
            warn!(kind = %kind, firsts = count, "rows with unknown kind are never shown");
        }
    }

    info!(
        path = %store.path().display(),
        firsts = total,
        kinds = counts.len(),
        "database status"
    );

    Ok(())
}
