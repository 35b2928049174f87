use std::collections::BTreeMap;

use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::model::{ALL, FirstRecord, Kind, Region, SearchCriteria, Shard};
use crate::util::format_stamp;

pub const GENERIC_ERROR: &str = "Something went wrong while searching the shard firsts database.";
pub const UNKNOWN_ARCHIVE_DATE: &str = "*unknown*";

const TABLE_HEADERS: [&str; 4] = ["Player", "Guild", "What", "Date (UTC)"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    NotSearched,
    Found(Vec<FirstRecord>),
    Failed,
}

pub struct SearchPage<'a> {
    pub criteria: &'a SearchCriteria,
    pub latest_archive: Option<NaiveDate>,
    pub outcome: &'a SearchOutcome,
}

#[derive(Debug)]
pub struct KindGroup<'a> {
    pub kind: Kind,
    pub records: Vec<&'a FirstRecord>,
}

/// One pass over the records; groups come back in `Kind` order whatever the input order.
pub fn group_by_kind(records: &[FirstRecord]) -> Vec<KindGroup<'_>> {
    let mut buckets: BTreeMap<Kind, Vec<&FirstRecord>> = BTreeMap::new();
    for record in records {
        buckets.entry(record.kind).or_default().push(record);
    }

    buckets
        .into_iter()
        .map(|(kind, records)| KindGroup { kind, records })
        .collect()
}

pub fn render_page(page: &SearchPage<'_>) -> Markup {
    let archive_label = page
        .latest_archive
        .map(|date| date.to_string())
        .unwrap_or_else(|| UNKNOWN_ARCHIVE_DATE.to_string());

    html! {
        (DOCTYPE)
        html {
            head {
                meta http-equiv="Content-Type" content="text/html; charset=utf-8";
                link rel="stylesheet" type="text/css" href="style.css";
                script src="./sorttable.js" type="text/javascript" {}
                script src="https://www.magelocdn.com/pack/rift/en/magelo-bar.js#1" type="text/javascript" {}
                title { "RIFT Shard Firsts Search" }
            }
            body {
                // keeps CDN email obfuscation away from Player@Shard cells
                (PreEscaped("<!--email_off-->"))
                h3 { "Rift Shard Firsts BETA" }
                p { "This site tells you the shard firsts for your character or guild." }
                p {
                    "Data is checked for from Trion daily. The latest is dated "
                    em { (archive_label) }
                    ". All information is straight from Trion's "
                    a href="http://webcdn.triongames.com/addons/assets/" { "public assets" }
                    "."
                }
                (search_form(page.criteria))
                p { "Enter a player name and/or a guild name, then press Submit." }
                @match page.outcome {
                    SearchOutcome::Failed => {
                        p class="error" { (GENERIC_ERROR) }
                    }
                    SearchOutcome::Found(records) => {
                        @for group in group_by_kind(records) {
                            (kind_table(&group))
                        }
                    }
                    SearchOutcome::NotSearched => {}
                }
                (PreEscaped("<!--/email_off-->"))
            }
        }
    }
}

fn search_form(criteria: &SearchCriteria) -> Markup {
    let selected_shard = criteria.shard_label();
    let selected_kind = criteria.kind_label();

    html! {
        form id="firstfrom" {
            label for="player" { "Character: " }
            input type="text" name="player" id="player" size="14" value=(criteria.player);
            label for="shard" { " Shard: " }
            select name="shard" id="shard" {
                (select_option(ALL, selected_shard))
                @for region in [Region::NorthAmerica, Region::Europe] {
                    optgroup label=(region.label()) {
                        @for shard in Shard::in_region(region) {
                            (select_option(shard.as_str(), selected_shard))
                        }
                    }
                }
            }
            label for="guild" { " Guild: " }
            input type="text" name="guild" id="guild" size="14" value=(criteria.guild);
            label for="kind" { " Type: " }
            select name="kind" id="kind" {
                (select_option(ALL, selected_kind))
                @for kind in Kind::ALL {
                    (select_option(kind.as_str(), selected_kind))
                }
            }
            input type="submit" formmethod="post";
        }
    }
}

fn select_option(value: &str, selected: &str) -> Markup {
    html! {
        option value=(value) selected[value == selected] { (value) }
    }
}

fn kind_table(group: &KindGroup<'_>) -> Markup {
    html! {
        h4 { (group.kind.heading()) }
        table class="sortable" {
            thead {
                tr {
                    @for header in TABLE_HEADERS {
                        th { (header) }
                    }
                }
            }
            tbody {
                @for record in &group.records {
                    tr {
                        td { (record.player_at_shard()) }
                        td { (record.guild) }
                        td { a href=(record.asset_url()) { (record.what) } }
                        td { (format_stamp(record.stamp)) }
                    }
                }
            }
        }
    }
}
