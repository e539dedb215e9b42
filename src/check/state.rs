//! Checker State
//! Per-format memory of the last validated snapshot.

use crate::data::SchemaFormat;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Cumulative counts of one region on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCounts {
    pub region: String,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

/// The Russian-region rows of one validated day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub regions: Vec<RegionCounts>,
}

impl Snapshot {
    /// First row recorded for `region`, if any.
    pub fn region(&self, region: &str) -> Option<&RegionCounts> {
        self.regions.iter().find(|r| r.region == region)
    }
}

/// Last validated snapshot per schema format.
///
/// Owned by a single validation run. A failed file clears its format's entry
/// so the next file of that format starts without a baseline.
#[derive(Debug, Default)]
pub struct CheckerState {
    previous: HashMap<SchemaFormat, Snapshot>,
}

impl CheckerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self, format: SchemaFormat) -> Option<&Snapshot> {
        self.previous.get(&format)
    }

    /// Replace the baseline for `format`.
    pub fn record(&mut self, format: SchemaFormat, snapshot: Snapshot) {
        self.previous.insert(format, snapshot);
    }

    /// Drop the baseline for `format`.
    pub fn reset(&mut self, format: SchemaFormat) {
        self.previous.remove(&format);
    }

    pub fn clear(&mut self) {
        self.previous.clear();
    }
}
