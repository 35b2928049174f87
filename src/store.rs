use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, OpenFlags, Row, params_from_iter};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{FirstRecord, Kind, SearchCriteria};
use crate::util::parse_stamp;

/// SQLite VM instructions between deadline checks.
const PROGRESS_INTERVAL_OPS: i32 = 1_000;

pub trait FirstsStore: Send + Sync {
    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<FirstRecord>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstsQuery {
    pub sql: String,
    pub params: Vec<String>,
}

/// `None` when neither a player nor a guild was given; such searches never reach storage.
pub fn build_query(criteria: &SearchCriteria) -> Option<FirstsQuery> {
    if !criteria.has_name_filter() {
        return None;
    }

    let mut predicates = Vec::new();
    let mut params = Vec::new();

    if !criteria.player.is_empty() {
        params.push(criteria.player.clone());
        predicates.push(format!("Player = ?{} COLLATE NOCASE", params.len()));
    }
    if let Some(shard) = criteria.shard {
        params.push(shard.as_str().to_string());
        predicates.push(format!("Shard = ?{}", params.len()));
    }
    if !criteria.guild.is_empty() {
        params.push(criteria.guild.clone());
        predicates.push(format!("Guild = ?{} COLLATE NOCASE", params.len()));
    }
    if let Some(kind) = criteria.kind {
        params.push(kind.as_str().to_string());
        predicates.push(format!("Kind = ?{}", params.len()));
    }

    let sql = format!(
        "SELECT Kind, What, Player, Shard, Guild, Stamp, Id FROM firsts WHERE {} ORDER BY Kind, Stamp",
        predicates.join(" AND ")
    );

    Some(FirstsQuery { sql, params })
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    query_timeout: Duration,
}

impl SqliteStore {
    /// `query_timeout` bounds both lock waits and statement execution; a statement
    /// still running at the deadline is interrupted inside SQLite.
    pub fn new(path: impl Into<PathBuf>, query_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            query_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let connection = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .and_then(|connection| {
            connection.busy_timeout(self.query_timeout)?;
            Ok(connection)
        })
        .map_err(|source| StoreError::Connection {
            path: self.path.clone(),
            source,
        })?;
        Ok(connection)
    }

    pub fn kind_counts(&self) -> Result<Vec<(String, i64)>, StoreError> {
        let connection = self.open()?;
        let mut statement = connection
            .prepare("SELECT Kind, COUNT(*) FROM firsts GROUP BY Kind ORDER BY Kind")?;
        let rows = statement.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let counts = rows.collect::<Result<Vec<(String, i64)>, _>>()?;
        Ok(counts)
    }
}

impl FirstsStore for SqliteStore {
    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<FirstRecord>, StoreError> {
        let Some(query) = build_query(criteria) else {
            return Ok(Vec::new());
        };

        let connection = self.open()?;
        let deadline = Instant::now() + self.query_timeout;
        connection.progress_handler(
            PROGRESS_INTERVAL_OPS,
            Some(move || Instant::now() >= deadline),
        );

        let records = read_records(&connection, &query).map_err(|source| {
            if source.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
                StoreError::Timeout(self.query_timeout)
            } else {
                StoreError::Query(source)
            }
        })?;

        debug!(
            path = %self.path.display(),
            result_count = records.len(),
            "firsts query returned"
        );

        Ok(records)
    }
}

fn read_records(connection: &Connection, query: &FirstsQuery) -> rusqlite::Result<Vec<FirstRecord>> {
    let mut statement = connection.prepare(&query.sql)?;
    let mut rows = statement.query(params_from_iter(query.params.iter()))?;

    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let kind_name: String = row.get(0)?;
        let Some(kind) = Kind::parse(&kind_name) else {
            warn!(kind = %kind_name, "skipping firsts row with unknown kind");
            continue;
        };

        let raw_stamp: Value = row.get(5)?;
        let Some(stamp) = stamp_from_value(&raw_stamp) else {
            warn!(
                kind = %kind_name,
                stamp = ?raw_stamp,
                "skipping firsts row with unreadable stamp"
            );
            continue;
        };

        records.push(record_from_row(kind, stamp, row)?);
    }

    Ok(records)
}

fn record_from_row(kind: Kind, stamp: NaiveDateTime, row: &Row<'_>) -> rusqlite::Result<FirstRecord> {
    Ok(FirstRecord {
        kind,
        what: row.get(1)?,
        player: row.get(2)?,
        shard: row.get(3)?,
        guild: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        stamp,
        id: id_text(row.get(6)?),
    })
}

fn stamp_from_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Text(raw) => parse_stamp(raw),
        _ => None,
    }
}

fn id_text(value: Value) -> String {
    match value {
        Value::Integer(id) => id.to_string(),
        Value::Real(id) => id.to_string(),
        Value::Text(id) => id,
        Value::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Value::Null => String::new(),
    }
}

pub fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS firsts (
              Kind TEXT NOT NULL,
              What TEXT NOT NULL,
              Player TEXT NOT NULL,
              Shard TEXT NOT NULL,
              Guild TEXT,
              Stamp TEXT NOT NULL,
              Id TEXT NOT NULL,
              PRIMARY KEY (Kind, Id, Shard)
            );

            CREATE INDEX IF NOT EXISTS idx_firsts_player ON firsts(Player COLLATE NOCASE);
            CREATE INDEX IF NOT EXISTS idx_firsts_guild ON firsts(Guild COLLATE NOCASE);
            CREATE INDEX IF NOT EXISTS idx_firsts_kind_stamp ON firsts(Kind, Stamp);
            ",
        )
        .context("failed to create firsts schema")?;
    Ok(())
}
