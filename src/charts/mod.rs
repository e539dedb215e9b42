//! Charts module - Time lines, series layout and PNG rendering

mod error;
pub mod monitoring;
mod plotter;
mod renderer;
mod timeline;

use crate::data::TRACKED_COUNTRY;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

pub use error::ChartError;
pub use monitoring::MonitoringSpec;
pub use plotter::{
    ChartPlotter, ChartSeries, ChartSpec, Language, LineStyle, PlotOptions, ReferenceCountry,
    PALETTE, REFERENCE_COUNTRIES,
};
pub use renderer::StaticChartRenderer;
pub use timeline::{
    country_total, load_corpus, merge, preprocess, timelines, ChartMetric, Corpus, RegionKey,
    TimeLine, TimeLines, MOVING_AVERAGE_DAYS,
};

/// Preprocessed time lines of every Russian region.
pub fn russian_timelines(corpus: &Corpus) -> Result<TimeLines, ChartError> {
    let mut tls = timelines(corpus, TRACKED_COUNTRY, "")?;
    preprocess(&mut tls)?;
    Ok(tls)
}

/// Country totals of the reference countries present in the corpus.
pub fn reference_timelines(corpus: &Corpus) -> Result<Vec<(RegionKey, TimeLine)>, ChartError> {
    let mut out = Vec::new();
    for reference in REFERENCE_COUNTRIES.iter() {
        let total = country_total(corpus, reference.country)?;
        if !total.is_empty() {
            out.push(((String::new(), reference.label_en.to_string()), total));
        }
    }
    Ok(out)
}

/// Lay out and render a chart of the snapshots under `root` to `out`.
pub fn render(root: &Path, options: &PlotOptions, out: &Path) -> Result<ChartSpec, ChartError> {
    let corpus = load_corpus(root)?;
    let tls = russian_timelines(&corpus)?;
    let references = reference_timelines(&corpus)?;
    let spec = ChartPlotter::build(&tls, &references, options)?;
    StaticChartRenderer::render_png(&spec, out, options.size)?;
    info!(file = %out.display(), series = spec.series.len(), "chart saved");
    Ok(spec)
}

/// Confirmed cases since the threshold.
pub fn plot(root: &Path, options: PlotOptions, out: &Path) -> Result<ChartSpec, ChartError> {
    render(
        root,
        &PlotOptions {
            metric: ChartMetric::Confirmed,
            ..options
        },
        out,
    )
}

/// Seven-day moving average of daily cases since the threshold.
pub fn plot_sliding(root: &Path, options: PlotOptions, out: &Path) -> Result<ChartSpec, ChartError> {
    render(
        root,
        &PlotOptions {
            metric: ChartMetric::DailyCasesMa7,
            ..options
        },
        out,
    )
}

/// Cut-off used by the monitoring chart when none is given.
pub fn default_monitoring_since() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_588_291_200, 0).unwrap_or_default()
}

/// Render the monitoring chart of the monitored region.
pub fn plot_monitoring(
    root: &Path,
    pending_dir: &Path,
    since: DateTime<Utc>,
    out: &Path,
) -> Result<MonitoringSpec, ChartError> {
    let (provider_name, region) = monitoring::MONITORED_REGION;
    let corpus = load_corpus(root)?;

    let available = monitoring::pending_measurements(pending_dir, provider_name, since)?;
    let included = monitoring::included_measurements(&corpus, region, since)?;
    let upstream = monitoring::upstream_updates(&corpus, since)?;
    info!(
        available = available.len(),
        included = included.len(),
        upstream = upstream.len(),
        "monitoring data collected"
    );

    let spec = MonitoringSpec::build(&available, &included, &upstream)?;
    StaticChartRenderer::render_monitoring_png(&spec, out, (1600, 600))?;
    info!(file = %out.display(), "monitoring chart saved");
    Ok(spec)
}
