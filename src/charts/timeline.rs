//! Time Lines
//! Aligned per-region time series built from the historical snapshot corpus.

use crate::charts::ChartError;
use crate::data::{csv_files, RegionFilter, SnapshotError, SnapshotFile};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

/// `(Province_State, Country_Region)`
pub type RegionKey = (String, String);

/// Time lines keyed by region, in key order.
pub type TimeLines = BTreeMap<RegionKey, TimeLine>;

/// Snapshot tables keyed by their date.
pub type Corpus = BTreeMap<NaiveDate, DataFrame>;

/// Length of the moving-average window, in days.
pub const MOVING_AVERAGE_DAYS: usize = 7;

/// Metric plotted on the value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMetric {
    Confirmed,
    /// Seven-day moving average of daily new confirmed cases.
    DailyCasesMa7,
}

/// Parallel date/confirmed/deaths/recovered sequences of one region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeLine {
    dates: Vec<NaiveDate>,
    confirmed: Vec<i64>,
    deaths: Vec<i64>,
    recovered: Vec<i64>,
}

impl TimeLine {
    pub fn new(
        dates: Vec<NaiveDate>,
        confirmed: Vec<i64>,
        deaths: Vec<i64>,
        recovered: Vec<i64>,
    ) -> Result<Self, ChartError> {
        let n = dates.len();
        if confirmed.len() != n || deaths.len() != n || recovered.len() != n {
            return Err(ChartError::Misaligned);
        }
        Ok(Self {
            dates,
            confirmed,
            deaths,
            recovered,
        })
    }

    /// Append one day. A repeated last date adds to that day instead.
    pub fn push(&mut self, date: NaiveDate, confirmed: i64, deaths: i64, recovered: i64) {
        if self.dates.last() == Some(&date) {
            let i = self.dates.len() - 1;
            self.confirmed[i] += confirmed;
            self.deaths[i] += deaths;
            self.recovered[i] += recovered;
            return;
        }
        self.dates.push(date);
        self.confirmed.push(confirmed);
        self.deaths.push(deaths);
        self.recovered.push(recovered);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn confirmed(&self) -> &[i64] {
        &self.confirmed
    }

    pub fn deaths(&self) -> &[i64] {
        &self.deaths
    }

    pub fn recovered(&self) -> &[i64] {
        &self.recovered
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Trailing seven-day mean of day-over-day confirmed increments.
    ///
    /// The first increment is 0; the window is shorter over the first six days.
    pub fn daily_cases_ma7(&self) -> Vec<f64> {
        let daily: Vec<f64> = self
            .confirmed
            .iter()
            .enumerate()
            .map(|(i, &c)| if i == 0 { 0.0 } else { (c - self.confirmed[i - 1]) as f64 })
            .collect();

        (0..daily.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(MOVING_AVERAGE_DAYS);
                let window = &daily[start..=i];
                window.iter().sum::<f64>() / window.len() as f64
            })
            .collect()
    }

    pub fn metric(&self, metric: ChartMetric) -> Vec<f64> {
        match metric {
            ChartMetric::Confirmed => self.confirmed.iter().map(|&c| c as f64).collect(),
            ChartMetric::DailyCasesMa7 => self.daily_cases_ma7(),
        }
    }

    fn by_date(&self) -> BTreeMap<NaiveDate, (i64, i64, i64)> {
        self.dates
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, (self.confirmed[i], self.deaths[i], self.recovered[i])))
            .collect()
    }

    /// Date-wise sum over the union of both date sets; a missing day counts as zero.
    pub fn merged(&self, other: &TimeLine) -> TimeLine {
        let a = self.by_date();
        let b = other.by_date();
        let dates: BTreeSet<NaiveDate> = a.keys().chain(b.keys()).copied().collect();

        let mut out = TimeLine::default();
        for date in dates {
            let (c1, d1, r1) = a.get(&date).copied().unwrap_or_default();
            let (c2, d2, r2) = b.get(&date).copied().unwrap_or_default();
            out.push(date, c1 + c2, d1 + d2, r1 + r2);
        }
        out
    }
}

/// Load every dated snapshot under `root`. Files whose names are not dates are skipped,
/// and for a repeated date the first file in traversal order wins.
pub fn load_corpus(root: &Path) -> Result<Corpus, ChartError> {
    let mut corpus = Corpus::new();
    for entry in csv_files(root) {
        let path = entry.map_err(|err| ChartError::Walk(err.to_string()))?;
        let file = match SnapshotFile::from_path(&path) {
            Ok(file) => file,
            Err(SnapshotError::Parse(name)) => {
                warn!(file = %path.display(), "skipping {name}: not a dated snapshot");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if corpus.contains_key(&file.date()) {
            warn!(file = %path.display(), date = %file.date(), "skipping duplicate snapshot date");
            continue;
        }
        debug!(file = %file.name(), "loading snapshot");
        corpus.insert(file.date(), file.load()?);
    }
    Ok(corpus)
}

/// Time lines of every region of `country`, rows without a region keyed by `default_loc`.
pub fn timelines(corpus: &Corpus, country: &str, default_loc: &str) -> Result<TimeLines, ChartError> {
    let mut out = TimeLines::new();
    for (&date, df) in corpus {
        for row in RegionFilter::rows(&RegionFilter::country(df, country)?)? {
            let key = (
                row.province.unwrap_or_else(|| default_loc.to_string()),
                row.country,
            );
            out.entry(key).or_default().push(
                date,
                row.confirmed.unwrap_or(0),
                row.deaths.unwrap_or(0),
                row.recovered.unwrap_or(0),
            );
        }
    }
    Ok(out)
}

/// Per-date totals over all rows of `country`.
pub fn country_total(corpus: &Corpus, country: &str) -> Result<TimeLine, ChartError> {
    let mut total = TimeLine::default();
    for (&date, df) in corpus {
        for row in RegionFilter::rows(&RegionFilter::country(df, country)?)? {
            total.push(
                date,
                row.confirmed.unwrap_or(0),
                row.deaths.unwrap_or(0),
                row.recovered.unwrap_or(0),
            );
        }
    }
    Ok(total)
}

/// Replace `key1` and `key2` by their date-wise sum under `key_out`.
pub fn merge(
    tls: &mut TimeLines,
    key1: &RegionKey,
    key2: &RegionKey,
    key_out: RegionKey,
) -> Result<(), ChartError> {
    let first = tls
        .remove(key1)
        .ok_or_else(|| ChartError::MissingTimeLine(key1.clone()))?;
    let Some(second) = tls.remove(key2) else {
        tls.insert(key1.clone(), first);
        return Err(ChartError::MissingTimeLine(key2.clone()));
    };
    tls.insert(key_out, first.merged(&second));
    Ok(())
}

fn key(province: &str, country: &str) -> RegionKey {
    (province.to_string(), country.to_string())
}

/// Merge capitals with their surrounding oblasts and drop the country-level line.
pub fn preprocess(tls: &mut TimeLines) -> Result<(), ChartError> {
    merge(
        tls,
        &key("Moscow", "Russia"),
        &key("Moscow oblast", "Russia"),
        key("Moscow+MO", "Russia"),
    )?;
    merge(
        tls,
        &key("Saint Petersburg", "Russia"),
        &key("Leningradskaya oblast", "Russia"),
        key("SPb+LO", "Russia"),
    )?;
    tls.remove(&key("", "Russia"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    #[test]
    fn unequal_sequences_are_rejected() {
        let err = TimeLine::new(vec![day(1), day(2)], vec![1, 2], vec![0], vec![0, 0]).unwrap_err();
        assert!(matches!(err, ChartError::Misaligned));
    }

    #[test]
    fn merging_disjoint_dates_takes_the_union() {
        let a = TimeLine::new(vec![day(1), day(3)], vec![10, 30], vec![1, 3], vec![0, 2]).unwrap();
        let b = TimeLine::new(vec![day(2), day(3)], vec![5, 7], vec![0, 1], vec![1, 1]).unwrap();

        let m = a.merged(&b);
        assert_eq!(m.dates(), [day(1), day(2), day(3)]);
        assert_eq!(m.confirmed(), [10, 5, 37]);
        assert_eq!(m.deaths(), [1, 0, 4]);
        assert_eq!(m.recovered(), [0, 1, 3]);
    }

    #[test]
    fn merge_replaces_both_keys() {
        let mut tls = TimeLines::new();
        tls.insert(key("Moscow", "Russia"), TimeLine::new(vec![day(1)], vec![3], vec![0], vec![0]).unwrap());
        tls.insert(key("Moscow oblast", "Russia"), TimeLine::new(vec![day(1)], vec![2], vec![0], vec![0]).unwrap());

        merge(&mut tls, &key("Moscow", "Russia"), &key("Moscow oblast", "Russia"), key("Moscow+MO", "Russia")).unwrap();
        assert_eq!(tls.len(), 1);
        assert_eq!(tls[&key("Moscow+MO", "Russia")].confirmed(), [5]);
    }

    #[test]
    fn merge_with_missing_key_leaves_lines_untouched() {
        let mut tls = TimeLines::new();
        tls.insert(key("Moscow", "Russia"), TimeLine::new(vec![day(1)], vec![3], vec![0], vec![0]).unwrap());

        let err = merge(&mut tls, &key("Moscow", "Russia"), &key("Moscow oblast", "Russia"), key("Moscow+MO", "Russia")).unwrap_err();
        assert!(matches!(err, ChartError::MissingTimeLine(_)));
        assert!(tls.contains_key(&key("Moscow", "Russia")));
    }

    #[test]
    fn moving_average_of_daily_increments() {
        let confirmed: Vec<i64> = (0..10).map(|i| i * 7).collect();
        let dates: Vec<NaiveDate> = (1..=10).map(day).collect();
        let tl = TimeLine::new(dates, confirmed, vec![0; 10], vec![0; 10]).unwrap();

        let ma = tl.daily_cases_ma7();
        assert_eq!(ma.len(), 10);
        assert_eq!(ma[0], 0.0);
        assert_eq!(ma[1], 3.5);
        assert_eq!(ma[7], 7.0);
        assert_eq!(ma[9], 7.0);
    }

    #[test]
    fn first_snapshot_of_a_date_wins() {
        let dir = tempfile::tempdir().unwrap();
        let header = "Province_State,Country_Region,Confirmed,Deaths,Recovered";
        std::fs::create_dir(dir.path().join("archive")).unwrap();
        std::fs::write(dir.path().join("04-01-2020.csv"), format!("{header}\nMoscow,Russia,10,0,0\n")).unwrap();
        std::fs::write(
            dir.path().join("archive").join("04-01-2020.csv"),
            format!("{header}\nMoscow,Russia,99,0,0\n"),
        )
        .unwrap();

        let corpus = load_corpus(dir.path()).unwrap();
        assert_eq!(corpus.len(), 1);
        let tls = timelines(&corpus, "Russia", "").unwrap();
        assert_eq!(tls[&key("Moscow", "Russia")].confirmed(), [10]);
    }

    #[test]
    fn push_accumulates_repeated_dates() {
        let mut tl = TimeLine::default();
        tl.push(day(1), 1, 0, 0);
        tl.push(day(1), 2, 1, 0);
        tl.push(day(2), 4, 1, 1);
        assert_eq!(tl.len(), 2);
        assert_eq!(tl.confirmed(), [3, 4]);
    }
}
