//! Pending Fetch Records
//! One timestamped poll of the provider, persisted as a JSON dump.

use crate::fetch::FetchError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File stem layout of pending dumps, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y__%H:%M:%S:%6f";

/// Provider counts for one region at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionReport {
    pub cases: i64,
    pub cured: i64,
    pub deaths: i64,
    /// Provider order: `[longitude, latitude]`.
    pub coordinates: Option<[f64; 2]>,
    #[serde(default)]
    pub histogram: Vec<serde_json::Value>,
}

impl RegionReport {
    /// `(latitude, longitude)` read from the provider pair.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        self.coordinates.map(|[lon, lat]| (lat, lon))
    }
}

/// Result of one poll, keyed by provider region name.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub captured_at: DateTime<Utc>,
    pub regions: BTreeMap<String, RegionReport>,
}

/// Render a UTC timestamp in the pending file-name layout.
pub fn timestring(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Capture time encoded in a pending dump's file name.
pub fn pending_timestamp(path: &Path) -> Result<DateTime<Utc>, FetchError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| FetchError::BadTimestamp(path.display().to_string()))?;
    NaiveDateTime::parse_from_str(stem, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| FetchError::BadTimestamp(stem.to_string()))
}

impl PendingRecord {
    pub fn new(captured_at: DateTime<Utc>, regions: BTreeMap<String, RegionReport>) -> Self {
        Self {
            captured_at,
            regions,
        }
    }

    /// Path of this record's dump with the given extension inside `dir`.
    pub fn dump_path(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(format!("{}.{}", timestring(&self.captured_at), extension))
    }

    /// Write the regions as indented JSON, keeping non-ASCII names as is.
    pub fn save_json(&self, dir: &Path) -> Result<PathBuf, FetchError> {
        if !dir.is_dir() {
            return Err(FetchError::MissingDumpDir(dir.to_path_buf()));
        }
        let path = self.dump_path(dir, "json");

        let mut writer = BufWriter::new(File::create(&path)?);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.regions.serialize(&mut serializer)?;
        writer.flush()?;

        info!(path = %path.display(), "Saved");
        Ok(path)
    }

    /// Read a JSON dump back, taking the capture time from its file name.
    pub fn load(path: &Path) -> Result<Self, FetchError> {
        let captured_at = pending_timestamp(path)?;
        let text = fs::read_to_string(path)?;
        let regions = serde_json::from_str(&text)?;
        Ok(Self::new(captured_at, regions))
    }
}
