use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Html;
use axum::routing::get;
use chrono::NaiveDate;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::archive::latest_archive_date;
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::model::SearchCriteria;
use crate::render::{SearchOutcome, SearchPage, render_page};
use crate::store::{FirstsStore, SqliteStore};


/// Four short form fields never come close; larger bodies render the empty form.
pub const MAX_FORM_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FirstsStore>,
    pub archive_dir: Arc<PathBuf>,
    pub query_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(SqliteStore::new(config.database.clone(), config.query_timeout)),
            archive_dir: Arc::new(config.archive_dir.clone()),
            query_timeout: config.query_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(search_page).post(search_page))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn search_page(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Html<String> {
    let criteria = match body {
        Ok(body) => SearchCriteria::from_form_body(&body),
        Err(rejection) => {
            warn!(error = %rejection, "unreadable request body; rendering empty form");
            SearchCriteria::default()
        }
    };
    let outcome = run_search(&state, &criteria).await;
    let latest_archive = discover_archive_date(&state).await;

    let page = SearchPage {
        criteria: &criteria,
        latest_archive,
        outcome: &outcome,
    };
    Html(render_page(&page).into_string())
}

async fn health() -> &'static str {
    "ok"
}

async fn run_search(state: &AppState, criteria: &SearchCriteria) -> SearchOutcome {
    if !criteria.has_name_filter() {
        debug!("no player or guild given; skipping firsts query");
        return SearchOutcome::NotSearched;
    }

    let store = Arc::clone(&state.store);
    let owned = criteria.clone();
    let task = tokio::task::spawn_blocking(move || store.search(&owned));

    let result = match tokio::time::timeout(state.query_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(StoreError::Worker(join_error)),
        Err(_) => Err(StoreError::Timeout(state.query_timeout)),
    };

    match result {
        Ok(records) => {
            info!(
                player = %criteria.player,
                guild = %criteria.guild,
                shard = criteria.shard_label(),
                kind = criteria.kind_label(),
                result_count = records.len(),
                "search completed"
            );
            SearchOutcome::Found(records)
        }
        Err(err) => {
            log_store_failure(&err, criteria);
            SearchOutcome::Failed
        }
    }
}

fn log_store_failure(err: &StoreError, criteria: &SearchCriteria) {
    match err {
        StoreError::Connection { path, source } => error!(
            path = %path.display(),
            error = %source,
            "failed to connect to firsts database"
        ),
        StoreError::Query(source) => error!(
            player = %criteria.player,
            guild = %criteria.guild,
            error = %source,
            "firsts query failed"
        ),
        StoreError::Timeout(limit) => error!(
            player = %criteria.player,
            guild = %criteria.guild,
            timeout_ms = limit.as_millis() as u64,
            "firsts query timed out"
        ),
        StoreError::Worker(source) => error!(error = %source, "firsts query worker failed"),
    }
}

async fn discover_archive_date(state: &AppState) -> Option<NaiveDate> {
    let archive_dir = Arc::clone(&state.archive_dir);
    let scan = tokio::task::spawn_blocking(move || latest_archive_date(&archive_dir)).await;

    match scan {
        Ok(Ok(date)) => date,
        Ok(Err(err)) => {
            warn!(error = %format!("{err:#}"), "failed to scan archive directory");
            None
        }
        Err(err) => {
            warn!(error = %err, "archive scan worker failed");
            None
        }
    }
}
