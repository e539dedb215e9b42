//! CSV Reformatter
//! Turns a pending record into daily-snapshot CSV rows with canonical region names.

use crate::fetch::regions::{to_english, UnknownRegionMode};
use crate::fetch::{FetchError, PendingRecord, RegionReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Header of the second snapshot schema.
pub const CSSE2_HEADER: &str = "FIPS,Admin2,Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active,Combined_Key";

const UPDATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV rows for one pending record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reformatted {
    /// One data line per mapped region, without header.
    pub lines: Vec<String>,
    /// Provider names skipped because they are not in the region table.
    pub missed: Vec<String>,
}

/// Confirmed minus deaths minus recovered. Not clamped: inconsistent provider
/// counts yield a negative value.
pub fn active_cases(report: &RegionReport) -> i64 {
    report.cases - report.deaths - report.cured
}

/// Format every region of `record` as a snapshot row.
pub fn reformat(record: &PendingRecord, mode: UnknownRegionMode) -> Result<Reformatted, FetchError> {
    let update_time = record.captured_at.format(UPDATE_TIME_FORMAT).to_string();
    let mut out = Reformatted::default();

    for (name_ru, report) in &record.regions {
        let Some(name_en) = to_english(name_ru) else {
            match mode {
                UnknownRegionMode::Strict => return Err(FetchError::UnknownRegion(name_ru.clone())),
                UnknownRegionMode::Lenient => {
                    out.missed.push(name_ru.clone());
                    continue;
                }
            }
        };
        out.lines.push(csv_line(name_en, &update_time, report));
    }

    if !out.missed.is_empty() {
        warn!(missed = ?out.missed, "Missed locations");
    }
    Ok(out)
}

fn csv_line(region: &str, update_time: &str, report: &RegionReport) -> String {
    let (lat, lon) = report
        .lat_lon()
        .map(|(lat, lon)| (lat.to_string(), lon.to_string()))
        .unwrap_or_default();
    format!(
        ",,\"{region}\",Russia,{update_time},{lat},{lon},{},{},{},{},\"{region}, Russia\"",
        report.cases,
        report.deaths,
        report.cured,
        active_cases(report),
    )
}

/// Write header and lines next to the record's JSON dump.
pub fn write_csv(
    record: &PendingRecord,
    formatted: &Reformatted,
    dir: &Path,
) -> Result<PathBuf, FetchError> {
    if !dir.is_dir() {
        return Err(FetchError::MissingDumpDir(dir.to_path_buf()));
    }
    let path = record.dump_path(dir, "csv");

    let mut text = String::from(CSSE2_HEADER);
    for line in &formatted.lines {
        text.push('\n');
        text.push_str(line);
    }
    text.push('\n');
    fs::write(&path, text)?;

    info!(path = %path.display(), "Saved");
    Ok(path)
}
