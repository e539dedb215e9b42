//! Snapshot Loader Module
//! Reads one daily CSV snapshot with Polars and classifies its schema era by file date.

use chrono::NaiveDate;
use polars::prelude::*;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// First snapshot date written in the second schema.
pub const FORMAT2_SINCE: NaiveDate = match NaiveDate::from_ymd_opt(2020, 3, 22) {
    Some(date) => date,
    None => panic!("invalid schema cutoff date"),
};

/// File stem layout of daily snapshots, e.g. `03-25-2020`.
pub const SNAPSHOT_DATE_FORMAT: &str = "%m-%d-%Y";

/// Columns every snapshot must carry once legacy names are normalized.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Province_State",
    "Country_Region",
    "Confirmed",
    "Deaths",
    "Recovered",
];

/// Column names used by the first schema, mapped to their second-schema names.
const LEGACY_COLUMNS: [(&str, &str); 3] = [
    ("Province/State", "Province_State"),
    ("Country/Region", "Country_Region"),
    ("Last Update", "Last_Update"),
];

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("File name {0:?} is not a month-day-year date")]
    Parse(String),
    #[error("Unrecognized snapshot layout: missing column {0:?}")]
    UnknownFormat(String),
    #[error("Failed to load CSV: {0}")]
    Table(#[from] PolarsError),
}

/// Schema era of a daily snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaFormat {
    /// Before 2020-03-22. Recognized but never validated.
    Format1,
    /// On or after 2020-03-22.
    Format2,
}

impl SchemaFormat {
    pub fn of(date: NaiveDate) -> Self {
        if date < FORMAT2_SINCE {
            SchemaFormat::Format1
        } else {
            SchemaFormat::Format2
        }
    }
}

/// A daily snapshot file whose date and format have been derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    path: PathBuf,
    date: NaiveDate,
    format: SchemaFormat,
}

impl SnapshotFile {
    /// Derive the snapshot date from the file stem (`MM-DD-YYYY`).
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SnapshotError::Parse(path.display().to_string()))?;
        let date = NaiveDate::parse_from_str(stem, SNAPSHOT_DATE_FORMAT)
            .map_err(|_| SnapshotError::Parse(stem.to_string()))?;

        Ok(Self {
            format: SchemaFormat::of(date),
            date,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn format(&self) -> SchemaFormat {
        self.format
    }

    /// File name for progress messages.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Load the snapshot rows, normalizing first-schema column names.
    pub fn load(&self) -> Result<DataFrame, SnapshotError> {
        let mut lf = LazyCsvReader::new(&self.path)
            .with_infer_schema_length(Some(10000))
            .finish()?;

        let schema = lf.collect_schema()?;
        let (legacy, current): (Vec<&str>, Vec<&str>) = LEGACY_COLUMNS
            .iter()
            .filter(|(legacy, current)| schema.contains(legacy) && !schema.contains(current))
            .copied()
            .unzip();
        for column in REQUIRED_COLUMNS {
            let renamed = current.contains(&column);
            if !schema.contains(column) && !renamed {
                return Err(SnapshotError::UnknownFormat(column.to_string()));
            }
        }

        Ok(lf.rename(legacy, current, true).collect()?)
    }
}

/// Every `.csv` file under `root`, recursively.
///
/// Within a directory, files come first in lexicographic order, followed by
/// subdirectories (also in name order), so the sequence is deterministic.
pub fn csv_files(root: &Path) -> impl Iterator<Item = walkdir::Result<PathBuf>> {
    WalkDir::new(root)
        .sort_by(files_first)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() && has_csv_extension(&entry) => {
                Some(Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn has_csv_extension(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RegionFilter;
    use std::fs;

    #[test]
    fn derives_date_and_format_from_name() {
        let early = SnapshotFile::from_path("data/03-21-2020.csv").unwrap();
        assert_eq!(early.date(), NaiveDate::from_ymd_opt(2020, 3, 21).unwrap());
        assert_eq!(early.format(), SchemaFormat::Format1);

        let cutoff = SnapshotFile::from_path("data/03-22-2020.csv").unwrap();
        assert_eq!(cutoff.format(), SchemaFormat::Format2);
        assert_eq!(cutoff.name(), "03-22-2020.csv");
    }

    #[test]
    fn rejects_names_that_are_not_dates() {
        let err = SnapshotFile::from_path("data/README.csv").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(ref s) if s == "README"));

        let err = SnapshotFile::from_path("data/13-40-2020.csv").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn renames_legacy_columns_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("03-01-2020.csv");
        fs::write(
            &path,
            "Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered\n\
             ,Russia,2020-03-01T12:00:00,2,0,2\n",
        )
        .unwrap();

        let df = SnapshotFile::from_path(&path).unwrap().load().unwrap();
        assert!(df.get_column_index("Province_State").is_some());
        assert!(df.get_column_index("Country_Region").is_some());
        assert!(df.get_column_index("Last_Update").is_some());
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn legacy_columns_usable_in_region_filters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("03-01-2020.csv");
        fs::write(
            &path,
            "Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered\n\
             Moscow,Russia,2020-03-01T12:00:00,2,0,0\n\
             Lombardia,Italy,2020-03-01T12:00:00,900,20,40\n",
        )
        .unwrap();

        let df = SnapshotFile::from_path(&path).unwrap().load().unwrap();
        let russia = RegionFilter::country(&df, "Russia").unwrap();
        let rows = RegionFilter::rows(&russia).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].province.as_deref(), Some("Moscow"));
        assert_eq!(rows[0].last_update.as_deref(), Some("2020-03-01T12:00:00"));
    }

    #[test]
    fn missing_count_column_is_an_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("03-26-2020.csv");
        fs::write(&path, "Province_State,Country_Region,Confirmed\nMoscow,Russia,5\n").unwrap();

        let err = SnapshotFile::from_path(&path).unwrap().load().unwrap_err();
        assert!(matches!(err, SnapshotError::UnknownFormat(ref c) if c == "Deaths"));
    }

    #[test]
    fn csv_files_sorted_with_files_before_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive").join("01-01-2020.csv"), "").unwrap();
        fs::write(dir.path().join("03-23-2020.csv"), "").unwrap();
        fs::write(dir.path().join("03-22-2020.csv"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let names: Vec<String> = csv_files(dir.path())
            .map(|p| p.unwrap().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["03-22-2020.csv", "03-23-2020.csv", "01-01-2020.csv"]);
    }
}
