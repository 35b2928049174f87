use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Timelike};
use regex::Regex;

const NAIVE_STAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

static LETTER_CLUSTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}\p{M}*").expect("hardcoded regex pattern is valid"));

/// Keeps Unicode letters (general category `L`) in any script, together with the
/// combining marks (`M`) that follow them. Digits, letter-numbers such as `Ⅻ`,
/// punctuation, symbols and whitespace are dropped.
pub fn letters_only(input: &str) -> String {
    LETTER_CLUSTER
        .find_iter(input)
        .map(|cluster| cluster.as_str())
        .collect()
}

/// Accepts SQLite-style naive timestamps and RFC 3339 with an offset, which is
/// normalized to UTC.
pub fn parse_stamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NAIVE_STAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|stamp| stamp.naive_utc())
        })
}

pub fn format_stamp(stamp: NaiveDateTime) -> String {
    if stamp.nanosecond() / 1_000 == 0 {
        stamp.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        stamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn letters_only_strips_digits_punctuation_and_symbols() {
        assert_eq!(letters_only("Bob_the-2nd!"), "Bobthend");
        assert_eq!(letters_only("<script>"), "script");
        assert_eq!(letters_only("  "), "");
    }

    #[test]
    fn letters_only_keeps_letters_of_any_script() {
        assert_eq!(letters_only("Zoë Ærøskøbing"), "ZoëÆrøskøbing");
        assert_eq!(letters_only("Дракон 7"), "Дракон");
        assert_eq!(letters_only("龍の騎士"), "龍の騎士");
    }

    #[test]
    fn letters_only_is_idempotent() {
        for raw in ["Bob@Hailol", "Ünïcødé-42", "", "ab  cd"] {
            let once = letters_only(raw);
            assert_eq!(letters_only(&once), once);
        }
    }

    #[test]
    fn letters_only_keeps_combining_marks_and_drops_letter_numbers() {
        assert_eq!(letters_only("Re\u{301}my 2"), "Re\u{301}my");
        assert_eq!(letters_only("\u{301}Bob"), "Bob");
        assert_eq!(letters_only("KingⅫ"), "King");
        assert_eq!(letters_only(&letters_only("Ze\u{301}\u{300}!")), "Ze\u{301}\u{300}");
    }

    #[test]
    fn parse_stamp_accepts_naive_and_rfc3339_forms() {
        let expected = NaiveDate::from_ymd_opt(2017, 2, 1)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .expect("valid timestamp");
        assert_eq!(parse_stamp("2017-02-01 08:00:00"), Some(expected));
        assert_eq!(parse_stamp("2017-02-01T08:00:00"), Some(expected));
        assert_eq!(parse_stamp("2017-02-01T08:00:00Z"), Some(expected));
        assert_eq!(parse_stamp("2017-02-01T10:00:00+02:00"), Some(expected));
        assert_eq!(
            parse_stamp("2017-02-01 08:00:00.250000").map(|stamp| stamp.nanosecond()),
            Some(250_000_000)
        );
        assert_eq!(parse_stamp("yesterday"), None);
        assert_eq!(parse_stamp(""), None);
    }

    #[test]
    fn format_stamp_omits_zero_fraction() {
        let stamp = NaiveDate::from_ymd_opt(2017, 3, 5)
            .and_then(|date| date.and_hms_opt(4, 2, 9))
            .expect("valid timestamp");
        assert_eq!(format_stamp(stamp), "2017-03-05 04:02:09");
    }

    #[test]
    fn format_stamp_prints_microseconds_when_present() {
        let stamp = NaiveDate::from_ymd_opt(2017, 3, 5)
            .and_then(|date| date.and_hms_micro_opt(4, 2, 9, 1_500))
            .expect("valid timestamp");
        assert_eq!(format_stamp(stamp), "2017-03-05 04:02:09.001500");
    }
}
