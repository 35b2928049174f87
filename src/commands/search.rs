use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::archive::latest_archive_date;
use crate::cli::{OutputFormat, SearchArgs};
use crate::config::AppConfig;
use crate::model::{FirstRecord, Kind, SearchCriteria};
use crate::render::{SearchOutcome, SearchPage, group_by_kind, render_page};
use crate::store::{FirstsStore, SqliteStore};
use crate::util::format_stamp;

#[derive(Debug, Serialize)]
struct SearchResponse<'a> {
    player: &'a str,
    guild: &'a str,
    shard: &'a str,
    kind: &'a str,
    searched: bool,
    returned: usize,
    groups: Vec<GroupResponse<'a>>,
}

#[derive(Debug, Serialize)]
struct GroupResponse<'a> {
    kind: Kind,
    records: Vec<&'a FirstRecord>,
}

pub fn run(args: SearchArgs) -> Result<()> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration {}", args.config.display()))?;
    let criteria = SearchCriteria::normalize(&args.player, &args.guild, &args.shard, &args.kind);

    let outcome = if criteria.has_name_filter() {
        let store = SqliteStore::new(config.database.clone(), config.query_timeout);
        let records = store
            .search(&criteria)
            .with_context(|| format!("search against {} failed", store.path().display()))?;
        info!(
            player = %criteria.player,
            guild = %criteria.guild,
            shard = criteria.shard_label(),
            kind = criteria.kind_label(),
            result_count = records.len(),
            "search completed"
        );
        SearchOutcome::Found(records)
    } else {
        warn!("no player or guild given; nothing to search");
        SearchOutcome::NotSearched
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    match args.format {
        OutputFormat::Text => write_text_response(&mut output, &criteria, &outcome)?,
        OutputFormat::Json => write_json_response(&mut output, &criteria, &outcome)?,
        OutputFormat::Html => write_html_response(&mut output, &config, &criteria, &outcome)?,
    }
    output.flush()?;
    Ok(())
}

fn found_records(outcome: &SearchOutcome) -> &[FirstRecord] {
    match outcome {
        SearchOutcome::Found(records) => records.as_slice(),
        SearchOutcome::NotSearched | SearchOutcome::Failed => &[],
    }
}

fn write_text_response(
    output: &mut impl Write,
    criteria: &SearchCriteria,
    outcome: &SearchOutcome,
) -> Result<()> {
    let records = found_records(outcome);

    writeln!(
        output,
        "Search: player={} guild={} shard={} kind={}",
        criteria.player,
        criteria.guild,
        criteria.shard_label(),
        criteria.kind_label()
    )?;
    writeln!(output, "Results: {}", records.len())?;

    for group in group_by_kind(records) {
        writeln!(output, "{} ({})", group.kind.heading(), group.records.len())?;
        for (index, record) in group.records.iter().enumerate() {
            writeln!(
                output,
                "{}.\t{}\t{}\t{}\t{}",
                index + 1,
                record.player_at_shard(),
                record.guild,
                record.what,
                format_stamp(record.stamp)
            )?;
            writeln!(output, "\t{}", record.asset_url())?;
        }
    }

    Ok(())
}

fn write_json_response(
    output: &mut impl Write,
    criteria: &SearchCriteria,
    outcome: &SearchOutcome,
) -> Result<()> {
    let records = found_records(outcome);
    let response = SearchResponse {
        player: &criteria.player,
        guild: &criteria.guild,
        shard: criteria.shard_label(),
        kind: criteria.kind_label(),
        searched: !matches!(outcome, SearchOutcome::NotSearched),
        returned: records.len(),
        groups: group_by_kind(records)
            .into_iter()
            .map(|group| GroupResponse {
                kind: group.kind,
                records: group.records,
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *output, &response)
        .context("failed to serialize search json output")?;
    writeln!(output)?;
    Ok(())
}

fn write_html_response(
    output: &mut impl Write,
    config: &AppConfig,
    criteria: &SearchCriteria,
    outcome: &SearchOutcome,
) -> Result<()> {
    let latest_archive = match latest_archive_date(&config.archive_dir) {
        Ok(date) => date,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "failed to scan archive directory");
            None
        }
    };

    let page = SearchPage {
        criteria,
        latest_archive,
        outcome,
    };
    writeln!(output, "{}", render_page(&page).into_string())?;
    Ok(())
}
