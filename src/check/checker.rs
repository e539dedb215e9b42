//! Consistency Checker Module
//! Validates daily snapshots against the expected region count and against the
//! previous day: cumulative counts per region never decrease.

use crate::check::state::{CheckerState, RegionCounts, Snapshot};
use crate::data::{csv_files, CaseRow, RegionFilter, SchemaFormat, SnapshotError, SnapshotFile};
use chrono::NaiveDate;
use polars::prelude::PolarsError;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Date from which the upstream reports every Russian region.
pub const ALL_REGIONS_SINCE: NaiveDate = match NaiveDate::from_ymd_opt(2020, 3, 25) {
    Some(date) => date,
    None => panic!("invalid region count date"),
};

/// Cumulative count tracked per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recovered",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("Failed to filter regions: {0}")]
    Table(#[from] PolarsError),
    #[error("Number of regions has changed! Expected {expected}, found {found}")]
    RegionCount { expected: usize, found: usize },
    #[error("Ill-formed {metric} for {region}: {}", display_count(.value))]
    NegativeCount {
        metric: Metric,
        region: String,
        value: Option<i64>,
    },
    #[error("{metric} decreased for {region}: {previous} -> {current}")]
    Monotonicity {
        metric: Metric,
        region: String,
        previous: i64,
        current: i64,
    },
}

fn display_count(value: &Option<i64>) -> String {
    value.map_or_else(|| "missing or not a whole number".to_string(), |v| v.to_string())
}

/// A failure recorded against one file of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub file: PathBuf,
    pub message: String,
}

impl FileError {
    pub fn new(file: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self {
            file: file.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Result of a file that passed (or was not subject to) validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// First-schema file, not validated.
    Skipped,
    /// Valid, but there was no previous snapshot to compare against.
    NoBaseline,
    /// Valid against the previous snapshot. Lists regions it did not contain.
    Passed { new_regions: Vec<String> },
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Skipped => f.write_str("skipping"),
            CheckOutcome::NoBaseline => f.write_str("noprev"),
            CheckOutcome::Passed { new_regions } if new_regions.is_empty() => f.write_str("OK"),
            CheckOutcome::Passed { new_regions } => {
                write!(f, "OK, new regions: {}", new_regions.join(", "))
            }
        }
    }
}

/// Expected number of Russian regions per era, keyed by first date of the era.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCountTable {
    eras: Vec<(NaiveDate, usize)>,
}

impl Default for RegionCountTable {
    fn default() -> Self {
        // Only Moscow and Saint Petersburg were reported before the full list.
        Self::new(vec![
            (crate::data::FORMAT2_SINCE, 2),
            (ALL_REGIONS_SINCE, 55),
        ])
    }
}

impl RegionCountTable {
    pub fn new(mut eras: Vec<(NaiveDate, usize)>) -> Self {
        eras.sort_by_key(|(since, _)| *since);
        Self { eras }
    }

    /// Region count required on `date`, or `None` before the first era.
    pub fn expected(&self, date: NaiveDate) -> Option<usize> {
        self.eras
            .iter()
            .rev()
            .find(|(since, _)| *since <= date)
            .map(|(_, count)| *count)
    }
}

/// Collect-all-errors validator over a sequence of snapshot files.
#[derive(Debug, Default)]
pub struct Checker {
    state: CheckerState,
    region_counts: RegionCountTable,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region_counts(region_counts: RegionCountTable) -> Self {
        Self {
            state: CheckerState::new(),
            region_counts,
        }
    }

    pub fn state(&self) -> &CheckerState {
        &self.state
    }

    /// Forget every baseline, as if no file had been checked yet.
    pub fn reset(&mut self) {
        self.state.clear();
    }

    /// Validate all snapshot files under `root`, returning every failure.
    pub fn run(&mut self, root: &Path) -> Vec<FileError> {
        let mut errors = Vec::new();

        for entry in csv_files(root) {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    let file = err.path().unwrap_or(root).to_path_buf();
                    warn!(file = %file.display(), error = %err, "cannot read directory entry");
                    errors.push(FileError::new(file, err));
                    continue;
                }
            };

            match self.check_file(&path) {
                Ok(outcome) => info!(file = %path.display(), "Checking.....{outcome}"),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "Checking.....ERROR");
                    errors.push(FileError::new(path, err));
                }
            }
        }

        errors
    }

    /// Validate one file and update the baseline of its format.
    ///
    /// On failure the baseline of that format is dropped.
    pub fn check_file(&mut self, path: &Path) -> Result<CheckOutcome, CheckError> {
        let file = SnapshotFile::from_path(path)?;
        if file.format() == SchemaFormat::Format1 {
            return Ok(CheckOutcome::Skipped);
        }

        match self.validate(&file) {
            Ok((snapshot, outcome)) => {
                self.state.record(file.format(), snapshot);
                Ok(outcome)
            }
            Err(err) => {
                self.state.reset(file.format());
                Err(err)
            }
        }
    }

    fn validate(&self, file: &SnapshotFile) -> Result<(Snapshot, CheckOutcome), CheckError> {
        let df = file.load()?;
        let rows = RegionFilter::rows(&RegionFilter::russian_regions(&df)?)?;

        if let Some(expected) = self.region_counts.expected(file.date()) {
            if rows.len() != expected {
                return Err(CheckError::RegionCount {
                    expected,
                    found: rows.len(),
                });
            }
        }

        let regions = rows
            .into_iter()
            .map(Self::region_counts)
            .collect::<Result<Vec<_>, _>>()?;

        let outcome = match self.state.previous(file.format()) {
            None => CheckOutcome::NoBaseline,
            Some(previous) => CheckOutcome::Passed {
                new_regions: Self::compare(previous, &regions)?,
            },
        };

        let snapshot = Snapshot {
            date: file.date(),
            regions,
        };
        Ok((snapshot, outcome))
    }

    fn region_counts(row: CaseRow) -> Result<RegionCounts, CheckError> {
        let region = row.province.unwrap_or_default();
        let non_negative = |metric: Metric, value: Option<i64>| match value {
            Some(v) if v >= 0 => Ok(v),
            _ => Err(CheckError::NegativeCount {
                metric,
                region: region.clone(),
                value,
            }),
        };

        Ok(RegionCounts {
            confirmed: non_negative(Metric::Confirmed, row.confirmed)?,
            deaths: non_negative(Metric::Deaths, row.deaths)?,
            recovered: non_negative(Metric::Recovered, row.recovered)?,
            region,
        })
    }

    /// Check day-over-day monotonicity; returns regions absent from `previous`.
    fn compare(previous: &Snapshot, current: &[RegionCounts]) -> Result<Vec<String>, CheckError> {
        let mut new_regions = Vec::new();

        for row in current {
            let Some(before) = previous.region(&row.region) else {
                new_regions.push(row.region.clone());
                continue;
            };

            let pairs = [
                (Metric::Confirmed, before.confirmed, row.confirmed),
                (Metric::Deaths, before.deaths, row.deaths),
                (Metric::Recovered, before.recovered, row.recovered),
            ];
            for (metric, previous, current) in pairs {
                if current < previous {
                    return Err(CheckError::Monotonicity {
                        metric,
                        region: row.region.clone(),
                        previous,
                        current,
                    });
                }
            }
        }

        Ok(new_regions)
    }
}

/// Validate every snapshot under `root` with a fresh checker.
pub fn check_all(root: &Path) -> Vec<FileError> {
    Checker::new().run(root)
}
