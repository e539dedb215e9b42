//! Monitoring details chart data
//! Compares raw provider polls of one region with the values that made it
//! into the daily snapshots.

use crate::charts::timeline::Corpus;
use crate::charts::ChartError;
use crate::data::{RegionFilter, TRACKED_COUNTRY};
use crate::fetch::{pending_timestamp, PendingRecord};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Region shown on the monitoring chart, provider and canonical names.
pub const MONITORED_REGION: (&str, &str) = ("Москва", "Moscow");

const LAST_UPDATE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%y %H:%M"];

/// A `Last_Update` cell as UTC, in any of the layouts the upstream has used.
pub fn parse_last_update(value: &str) -> Option<DateTime<Utc>> {
    LAST_UPDATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `(capture time, cases)` of `region` from every JSON dump captured after `since`.
pub fn pending_measurements(
    pending_dir: &Path,
    region: &str,
    since: DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, i64)>, ChartError> {
    let mut out = Vec::new();
    for entry in WalkDir::new(pending_dir).sort_by_file_name() {
        let entry = entry.map_err(|err| ChartError::Walk(err.to_string()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let captured_at = match pending_timestamp(path) {
            Ok(ts) => ts,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping pending dump");
                continue;
            }
        };
        if captured_at <= since {
            continue;
        }
        let record = PendingRecord::load(path)?;
        if let Some(report) = record.regions.get(region) {
            out.push((captured_at, report.cases));
        }
    }
    out.sort();
    Ok(out)
}

/// `(Last_Update, Confirmed)` of `province` in snapshots dated after `since`.
pub fn included_measurements(
    corpus: &Corpus,
    province: &str,
    since: DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, i64)>, ChartError> {
    let mut out = Vec::new();
    for (date, df) in corpus.range(since.date_naive().succ_opt().unwrap_or(since.date_naive())..) {
        let rows = RegionFilter::rows(&RegionFilter::country(df, TRACKED_COUNTRY)?)?;
        let Some(row) = rows.into_iter().find(|r| r.province.as_deref() == Some(province)) else {
            warn!(%date, province, "region missing from snapshot");
            continue;
        };
        if let (Some(at), Some(confirmed)) = (
            row.last_update.as_deref().and_then(parse_last_update),
            row.confirmed,
        ) {
            out.push((at, confirmed));
        }
    }
    out.sort();
    Ok(out)
}

/// `Last_Update` of the country-level row in snapshots dated after `since`.
pub fn upstream_updates(corpus: &Corpus, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, ChartError> {
    let mut out = Vec::new();
    for (_, df) in corpus.range(since.date_naive().succ_opt().unwrap_or(since.date_naive())..) {
        let rows = RegionFilter::rows(&RegionFilter::country(df, TRACKED_COUNTRY)?)?;
        out.extend(
            rows.iter()
                .filter(|r| r.combined_key.as_deref() == Some(TRACKED_COUNTRY))
                .filter_map(|r| r.last_update.as_deref().and_then(parse_last_update))
                .take(1),
        );
    }
    out.sort();
    Ok(out)
}

/// Monitoring chart in hours since the UTC midnight before the first measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringSpec {
    pub title: String,
    pub origin: DateTime<Utc>,
    pub available: Vec<(f64, f64)>,
    pub included: Vec<(f64, f64)>,
    pub upstream: Vec<f64>,
    pub midnights: Vec<f64>,
}

impl MonitoringSpec {
    pub fn build(
        available: &[(DateTime<Utc>, i64)],
        included: &[(DateTime<Utc>, i64)],
        upstream: &[DateTime<Utc>],
    ) -> Result<Self, ChartError> {
        let times = available.iter().chain(included).map(|(t, _)| *t);
        let first = times.clone().min().ok_or(ChartError::NoData)?;
        let last = times.max().ok_or(ChartError::NoData)?;

        let origin = first
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or(ChartError::NoData)?;
        let hours = |t: DateTime<Utc>| (t - origin).num_seconds() as f64 / 3600.0;

        let mut midnights = Vec::new();
        let mut midnight = origin;
        while midnight < last {
            midnights.push(hours(midnight));
            midnight += Duration::days(1);
        }

        Ok(Self {
            title: format!("Monitoring details (data is for {}, Russia)", MONITORED_REGION.1),
            origin,
            available: available.iter().map(|&(t, v)| (hours(t), v as f64)).collect(),
            included: included.iter().map(|&(t, v)| (hours(t), v as f64)).collect(),
            upstream: upstream.iter().map(|&t| hours(t)).collect(),
            midnights,
        })
    }

    /// Largest x coordinate of any point or marker.
    pub fn max_hours(&self) -> f64 {
        self.available
            .iter()
            .chain(&self.included)
            .map(|(x, _)| *x)
            .chain(self.upstream.iter().copied())
            .chain(self.midnights.iter().copied())
            .fold(0.0, f64::max)
    }
}
