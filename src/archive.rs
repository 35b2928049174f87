use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

const ARCHIVE_PREFIX: &str = "Rift_Discoveries";
const ARCHIVE_EXTENSION: &str = ".zip";

/// Newest date embedded in a `Rift_Discoveries*.zip` filename, independent of listing order.
pub fn latest_archive_date(archive_dir: &Path) -> Result<Option<NaiveDate>> {
    let pattern = Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})")
        .context("failed to compile archive date regex")?;

    let entries = fs::read_dir(archive_dir)
        .with_context(|| format!("failed to read {}", archive_dir.display()))?;

    let mut latest: Option<NaiveDate> = None;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", archive_dir.display()))?;
        let path = entry.path();

        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !is_archive_name(filename) {
            continue;
        }

        // follows symlinks; a dangling link is not an archive
        if !fs::metadata(&path).is_ok_and(|metadata| metadata.is_file()) {
            continue;
        }

        if let Some(date) = archive_date_from_filename(filename, &pattern) {
            latest = latest.max(Some(date));
        }
    }

    Ok(latest)
}

fn is_archive_name(filename: &str) -> bool {
    filename.starts_with(ARCHIVE_PREFIX) && filename.ends_with(ARCHIVE_EXTENSION)
}

fn archive_date_from_filename(filename: &str, pattern: &Regex) -> Option<NaiveDate> {
    let captures = pattern.captures(filename)?;
    let year = captures.get(1)?.as_str().parse::<i32>().ok()?;
    let month = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let day = captures.get(3)?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).expect("create archive fixture");
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn picks_chronologically_latest_not_lexically_last() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Rift_Discoveries_2021-3-5.zip");
        touch(dir.path(), "Rift_Discoveries_2021-12-1.zip");
        touch(dir.path(), "Rift_Discoveries_2021-9-30.zip");

        let latest = latest_archive_date(dir.path()).expect("scan should succeed");
        assert_eq!(latest, Some(date(2021, 12, 1)));
    }

    #[test]
    fn ignores_non_matching_and_undated_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Rift_Discoveries_2020-1-2.zip");
        touch(dir.path(), "Other_2029-1-1.zip");
        touch(dir.path(), "Rift_Discoveries_2029-1-1.tar");
        touch(dir.path(), "Rift_Discoveries_latest.zip");
        touch(dir.path(), "Rift_Discoveries_2024-13-40.zip");
        fs::create_dir(dir.path().join("Rift_Discoveries_2030-1-1.zip")).expect("mkdir");

        let latest = latest_archive_date(dir.path()).expect("scan should succeed");
        assert_eq!(latest, Some(date(2020, 1, 2)));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_archives_are_counted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join("store");
        let zips = dir.path().join("zips");
        fs::create_dir(&store).expect("mkdir store");
        fs::create_dir(&zips).expect("mkdir zips");
        touch(&store, "discoveries.zip");
        touch(&zips, "Rift_Discoveries_2021-3-5.zip");

        std::os::unix::fs::symlink(
            store.join("discoveries.zip"),
            zips.join("Rift_Discoveries_2021-12-1.zip"),
        )
        .expect("symlink archive");
        std::os::unix::fs::symlink(
            store.join("absent.zip"),
            zips.join("Rift_Discoveries_2022-1-1.zip"),
        )
        .expect("dangling symlink");

        let latest = latest_archive_date(&zips).expect("scan should succeed");
        assert_eq!(latest, Some(date(2021, 12, 1)));
    }

    #[test]
    fn empty_directory_has_no_date() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(latest_archive_date(dir.path()).expect("scan"), None);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(latest_archive_date(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn filename_date_accepts_unpadded_fields() {
        let pattern = Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("regex");
        assert_eq!(
            archive_date_from_filename("Rift_Discoveries_2017-7-04.zip", &pattern),
            Some(date(2017, 7, 4))
        );
        assert_eq!(
            archive_date_from_filename("Rift_Discoveries.zip", &pattern),
            None
        );
    }
}
