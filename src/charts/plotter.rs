//! Chart Plotter Module
//! Picks the leading regions, aligns every series on days since a threshold
//! and attaches labels and styles. Drawing happens in the renderer.

use crate::charts::timeline::{ChartMetric, RegionKey, TimeLine, TimeLines};
use crate::fetch::regions::to_russian;
use chrono::NaiveDate;
use plotters::style::RGBColor;

use super::ChartError;

/// Colors for regions without a fixed color.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

pub const GROWTH_CURVE_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Reference countries drawn next to the Russian regions.
pub struct ReferenceCountry {
    pub country: &'static str,
    pub label_en: &'static str,
    pub label_ru: &'static str,
    pub color: RGBColor,
    pub alpha: f64,
}

pub static REFERENCE_COUNTRIES: [ReferenceCountry; 4] = [
    ReferenceCountry {
        country: "Italy",
        label_en: "Italy (ref)",
        label_ru: "Италия (справ.)",
        color: RGBColor(0xd6, 0x27, 0x28),
        alpha: 0.6,
    },
    ReferenceCountry {
        country: "Japan",
        label_en: "Japan (ref)",
        label_ru: "Япония (справ.)",
        color: RGBColor(0x94, 0x67, 0xbd),
        alpha: 0.6,
    },
    ReferenceCountry {
        country: "Ukraine",
        label_en: "Ukraine (ref)",
        label_ru: "Украина (справ.)",
        color: RGBColor(0x94, 0x07, 0xbd),
        alpha: 1.0,
    },
    ReferenceCountry {
        country: "Belarus",
        label_en: "Belarus (ref)",
        label_ru: "Белоруссия (справ.)",
        color: RGBColor(0x94, 0x67, 0x0d),
        alpha: 1.0,
    },
];

const MOSCOW_MERGED: &str = "Moscow+MO";
const MOSCOW_REFERENCE: &str = "Moscow+MO (ref)";

/// Growth rates (percent per day) of the optional reference curves.
const GROWTH_RATES: [u32; 2] = [5, 30];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Russian,
    English,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dotted,
    Dashed,
}

/// User-selectable chart settings.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub metric: ChartMetric,
    /// A series starts on the first day its metric exceeds this value.
    pub min_threshold: f64,
    /// Extra days added after the longest leading series.
    pub right_margin: usize,
    /// Slice `[start, end)` of regions ranked by latest metric value.
    pub range: (Option<usize>, Option<usize>),
    pub language: Language,
    pub scale_markers: bool,
    pub title_suffix: String,
    pub size: (u32, u32),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            metric: ChartMetric::Confirmed,
            min_threshold: 100.0,
            right_margin: 5,
            range: (None, None),
            language: Language::Russian,
            scale_markers: false,
            title_suffix: String::new(),
            size: (1600, 600),
        }
    }
}

/// One line of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    /// `(days since threshold, metric value)`
    pub points: Vec<(usize, f64)>,
    pub color: Option<RGBColor>,
    pub alpha: f64,
    pub style: LineStyle,
}

/// Everything the renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
    pub max_tick: usize,
    pub min_metric: f64,
}

/// Builds chart series from time lines.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Number of values from the first one above `threshold` to the end.
    pub fn days_above_threshold(values: &[f64], threshold: f64) -> usize {
        values
            .iter()
            .position(|&v| v > threshold)
            .map_or(0, |start| values.len() - start)
    }

    /// Values from the first one above `threshold`, indexed from 0, up to tick `window`.
    pub fn window_points(values: &[f64], threshold: f64, window: usize) -> Vec<(usize, f64)> {
        let Some(start) = values.iter().position(|&v| v > threshold) else {
            return Vec::new();
        };
        values[start..]
            .iter()
            .copied()
            .enumerate()
            .take(window + 1)
            .collect()
    }

    /// Regions ordered by latest metric value, largest first, then sliced by `range`.
    pub fn select_leaders<'a>(
        tls: &'a TimeLines,
        metric: ChartMetric,
        range: (Option<usize>, Option<usize>),
    ) -> Vec<(&'a RegionKey, &'a TimeLine)> {
        let latest = |tl: &TimeLine| tl.metric(metric).last().copied().unwrap_or(0.0);
        let mut ranked: Vec<_> = tls.iter().collect();
        ranked.sort_by(|a, b| latest(b.1).total_cmp(&latest(a.1)));

        let end = range.1.unwrap_or(ranked.len()).min(ranked.len());
        let start = range.0.unwrap_or(0).min(end);
        ranked.truncate(end);
        ranked.drain(..start);
        ranked
    }

    /// Legend text: region name and latest metric value.
    pub fn label(key: &RegionKey, latest: f64, language: Language) -> String {
        let (province, country) = key;
        let base = match language {
            Language::English if province.is_empty() => country.clone(),
            Language::English => province.clone(),
            Language::Russian => Self::russian_name(province)
                .or_else(|| Self::russian_country(country))
                .unwrap_or(country.as_str())
                .to_string(),
        };
        format!("{base} ({})", latest as i64)
    }

    fn russian_name(province: &str) -> Option<&'static str> {
        match province {
            MOSCOW_MERGED => Some("Москва+область"),
            MOSCOW_REFERENCE => Some("Москва+область (справ.)"),
            "SPb+LO" => Some("CПб+область"),
            other => to_russian(other),
        }
    }

    fn russian_country(country: &str) -> Option<&'static str> {
        if country == "Russia" {
            return Some("Россия");
        }
        REFERENCE_COUNTRIES
            .iter()
            .find(|r| r.label_en == country)
            .map(|r| r.label_ru)
    }

    fn style_of(key: &RegionKey) -> (Option<RGBColor>, f64, LineStyle) {
        let (province, country) = key;
        if let Some(reference) = REFERENCE_COUNTRIES.iter().find(|r| r.label_en == country) {
            return (Some(reference.color), reference.alpha, LineStyle::Dotted);
        }
        if province == MOSCOW_REFERENCE {
            return (None, 1.0, LineStyle::Dotted);
        }
        (None, 1.0, LineStyle::Solid)
    }

    /// Lay out the chart for preprocessed Russian time lines and reference country totals.
    pub fn build(
        tls: &TimeLines,
        references: &[(RegionKey, TimeLine)],
        options: &PlotOptions,
    ) -> Result<ChartSpec, ChartError> {
        let metric = options.metric;
        let threshold = options.min_threshold;

        let leaders = Self::select_leaders(tls, metric, options.range);
        let last_date = leaders
            .first()
            .and_then(|(_, tl)| tl.last_date())
            .ok_or(ChartError::NoData)?;

        let mut shown: Vec<(RegionKey, &TimeLine)> =
            leaders.iter().map(|(k, tl)| ((*k).clone(), *tl)).collect();
        shown.extend(references.iter().map(|(k, tl)| (k.clone(), tl)));

        let moscow = (MOSCOW_MERGED.to_string(), "Russia".to_string());
        if !leaders.iter().any(|(k, _)| **k == moscow) {
            if let Some(tl) = tls.get(&moscow) {
                shown.push(((MOSCOW_REFERENCE.to_string(), "Russia".to_string()), tl));
            }
        }

        let window = leaders
            .iter()
            .map(|(_, tl)| Self::days_above_threshold(&tl.metric(metric), threshold))
            .max()
            .unwrap_or(0)
            + options.right_margin;

        let mut series = Vec::new();
        let mut max_tick = 0;
        let mut min_metric = f64::INFINITY;

        for (key, tl) in &shown {
            if key.0.is_empty() && key.1 == "Russia" {
                continue;
            }
            let values = tl.metric(metric);
            let points = Self::window_points(&values, threshold, window);
            let Some(&(_, first)) = points.first() else {
                continue;
            };
            max_tick = max_tick.max(points.len());
            min_metric = min_metric.min(first);

            let latest = values.last().copied().unwrap_or(0.0);
            let (color, alpha, style) = Self::style_of(key);
            series.push(ChartSeries {
                label: Self::label(key, latest, options.language),
                points,
                color,
                alpha,
                style,
            });
        }

        if series.is_empty() {
            return Err(ChartError::NoData);
        }

        if options.scale_markers {
            for rate in GROWTH_RATES {
                series.push(Self::growth_curve(rate, min_metric, max_tick, options.language));
            }
        }

        let text = ChartText::new(metric, options, last_date);
        Ok(ChartSpec {
            title: text.title,
            x_label: text.x_label,
            y_label: text.y_label,
            series,
            max_tick,
            min_metric,
        })
    }

    /// `start * (1 + rate%)^x` for each tick.
    pub fn growth_curve(rate: u32, start: f64, ticks: usize, language: Language) -> ChartSeries {
        let factor = 1.0 + f64::from(rate) / 100.0;
        let label = match language {
            Language::Russian => format!("Прирост {rate}%"),
            Language::English => format!("{rate}% growth rate"),
        };
        ChartSeries {
            label,
            points: (0..ticks).map(|x| (x, start * factor.powi(x as i32))).collect(),
            color: Some(GROWTH_CURVE_COLOR),
            alpha: 0.5,
            style: LineStyle::Dashed,
        }
    }
}

struct ChartText {
    title: String,
    x_label: String,
    y_label: String,
}

impl ChartText {
    fn new(metric: ChartMetric, options: &PlotOptions, last_date: NaiveDate) -> Self {
        let date = last_date.format("%d.%m.%Y");
        let suffix = &options.title_suffix;
        let threshold = options.min_threshold;

        let (title, x_label, y_label) = match (metric, options.language) {
            (ChartMetric::Confirmed, Language::Russian) => (
                format!("Число подтвержденных случаев COVID19 в регионах России на {date}{suffix}"),
                format!("Количество дней с момента {threshold}-го подтвержденного случая"),
                "Подтвержденных случаев".to_string(),
            ),
            (ChartMetric::Confirmed, Language::English) => (
                format!("Confirmed COVID19 cases in regions of Russia, as of {date}{suffix}"),
                format!("Number of days since {threshold}th confirmed"),
                "Confirmed cases".to_string(),
            ),
            (ChartMetric::DailyCasesMa7, Language::Russian) => (
                format!("Скользящее среднее суточного числа заражений COVID19 в регионах России на {date} за семь дней{suffix}"),
                format!("Количество дней с момента превышения значения {threshold} заражений в сутки"),
                "Суточное число заражений, среднее за 7 дней".to_string(),
            ),
            (ChartMetric::DailyCasesMa7, Language::English) => (
                format!("Moving average daily confirmed COVID19 cases in regions of Russia, as of {date}, averaged for 7 days{suffix}"),
                format!("Number of days since above {threshold}"),
                "Daily confirmed case, 7-days moving average".to_string(),
            ),
        };

        Self {
            title,
            x_label,
            y_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    fn line(confirmed: &[i64]) -> TimeLine {
        let n = confirmed.len();
        TimeLine::new(
            (1..=n as u32).map(day).collect(),
            confirmed.to_vec(),
            vec![0; n],
            vec![0; n],
        )
        .unwrap()
    }

    fn key(p: &str, c: &str) -> RegionKey {
        (p.to_string(), c.to_string())
    }

    #[test]
    fn threshold_window() {
        let values = [50.0, 120.0, 90.0, 200.0, 300.0];
        assert_eq!(ChartPlotter::days_above_threshold(&values, 100.0), 4);
        assert_eq!(ChartPlotter::days_above_threshold(&values, 1000.0), 0);
        assert_eq!(
            ChartPlotter::window_points(&values, 100.0, 2),
            vec![(0, 120.0), (1, 90.0), (2, 200.0)]
        );
        assert!(ChartPlotter::window_points(&values, 500.0, 2).is_empty());
    }

    #[test]
    fn leaders_ranked_by_latest_value_and_sliced() {
        let mut tls = TimeLines::new();
        tls.insert(key("Tver oblast", "Russia"), line(&[1, 5]));
        tls.insert(key("Moscow+MO", "Russia"), line(&[100, 900]));
        tls.insert(key("SPb+LO", "Russia"), line(&[50, 300]));

        let all = ChartPlotter::select_leaders(&tls, ChartMetric::Confirmed, (None, None));
        let names: Vec<_> = all.iter().map(|(k, _)| k.0.as_str()).collect();
        assert_eq!(names, ["Moscow+MO", "SPb+LO", "Tver oblast"]);

        let tail = ChartPlotter::select_leaders(&tls, ChartMetric::Confirmed, (Some(1), Some(10)));
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].0 .0, "SPb+LO");
    }

    #[test]
    fn labels_in_both_languages() {
        let k = key("Moscow oblast", "Russia");
        assert_eq!(ChartPlotter::label(&k, 1234.7, Language::English), "Moscow oblast (1234)");
        assert_eq!(ChartPlotter::label(&k, 1234.7, Language::Russian), "Московская область (1234)");

        let italy = key("", "Italy (ref)");
        assert_eq!(ChartPlotter::label(&italy, 10.0, Language::English), "Italy (ref) (10)");
        assert_eq!(ChartPlotter::label(&italy, 10.0, Language::Russian), "Италия (справ.) (10)");
        assert_eq!(
            ChartPlotter::label(&key("SPb+LO", "Russia"), 3.0, Language::Russian),
            "CПб+область (3)"
        );
    }

    #[test]
    fn build_adds_references_and_moscow_reference() {
        let mut tls = TimeLines::new();
        tls.insert(key("Moscow+MO", "Russia"), line(&[150, 300, 600, 1200]));
        tls.insert(key("SPb+LO", "Russia"), line(&[120, 400, 800, 1600]));
        let references = vec![(key("", "Italy (ref)"), line(&[200, 400, 800, 1600]))];

        let options = PlotOptions {
            range: (None, Some(1)),
            language: Language::English,
            ..PlotOptions::default()
        };
        let spec = ChartPlotter::build(&tls, &references, &options).unwrap();

        let labels: Vec<_> = spec.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["SPb+LO (1600)", "Italy (ref) (1600)", "Moscow+MO (ref) (1200)"]);
        assert_eq!(spec.series[1].style, LineStyle::Dotted);
        assert_eq!(spec.series[1].alpha, 0.6);
        assert_eq!(spec.series[2].style, LineStyle::Dotted);
        assert_eq!(spec.max_tick, 4);
        assert_eq!(spec.min_metric, 120.0);
        assert_eq!(spec.title, "Confirmed COVID19 cases in regions of Russia, as of 04.04.2020");
        assert_eq!(spec.x_label, "Number of days since 100th confirmed");
    }

    #[test]
    fn growth_curves_follow_min_metric() {
        let curve = ChartPlotter::growth_curve(30, 100.0, 3, Language::English);
        assert_eq!(curve.label, "30% growth rate");
        assert_eq!(curve.points.len(), 3);
        assert!((curve.points[2].1 - 169.0).abs() < 1e-9);
        assert_eq!(curve.style, LineStyle::Dashed);
    }

    #[test]
    fn nothing_above_threshold_is_no_data() {
        let mut tls = TimeLines::new();
        tls.insert(key("Tver oblast", "Russia"), line(&[1, 2]));
        let err = ChartPlotter::build(&tls, &[], &PlotOptions::default()).unwrap_err();
        assert!(matches!(err, ChartError::NoData));
    }
}
