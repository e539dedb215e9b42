//! Static Chart Renderer
//! Draws chart specs to PNG files with plotters.
//!
//! Layout:
//! 1. Title centered above the plot
//! 2. Days since threshold on x, logarithmic metric on y
//! 3. Legend in the upper left corner

use crate::charts::monitoring::MonitoringSpec;
use crate::charts::plotter::{ChartSpec, LineStyle, PALETTE};
use crate::charts::ChartError;
use plotters::prelude::*;
use std::path::Path;

const FONT: &str = "sans-serif";
const TITLE_SIZE: u32 = 22;
const LABEL_SIZE: u32 = 14;

const AVAILABLE_COLOR: RGBColor = RGBColor(52, 152, 219);
const INCLUDED_COLOR: RGBColor = RGBColor(231, 76, 60);
const UPSTREAM_COLOR: RGBColor = RGBColor(46, 204, 113);
const MIDNIGHT_COLOR: RGBColor = RGBColor(160, 160, 160);

fn render_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Render(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Value axis bounds covering every positive point, padded for the log scale.
    pub fn value_range(spec: &ChartSpec) -> (f64, f64) {
        let (lo, hi) = spec
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, v)| v))
            .filter(|&v| v > 0.0)
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !lo.is_finite() {
            return (1.0, 10.0);
        }
        (lo * 0.8, (hi * 1.5).max(lo * 2.0))
    }

    /// Render the threshold-aligned chart.
    pub fn render_png(spec: &ChartSpec, path: &Path, size: (u32, u32)) -> Result<(), ChartError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let (y_min, y_max) = Self::value_range(spec);
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, (FONT, TITLE_SIZE))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(0usize..spec.max_tick.max(1), (y_min..y_max).log_scale())
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_desc(&spec.x_label)
            .y_desc(&spec.y_label)
            .y_label_formatter(&|v| format!("{v:.0}"))
            .label_style((FONT, LABEL_SIZE))
            .light_line_style(BLACK.mix(0.05))
            .draw()
            .map_err(render_error)?;

        for (i, series) in spec.series.iter().enumerate() {
            let color = series.color.unwrap_or(PALETTE[i % PALETTE.len()]);
            let style = color.mix(series.alpha).stroke_width(2);
            let points: Vec<(usize, f64)> =
                series.points.iter().copied().filter(|&(_, v)| v > 0.0).collect();

            let anno = match series.style {
                LineStyle::Solid => chart.draw_series(LineSeries::new(points, style)),
                LineStyle::Dotted => chart.draw_series(DashedLineSeries::new(points, 2, 4, style)),
                LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(points, 8, 4, style)),
            }
            .map_err(render_error)?;

            anno.label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font((FONT, LABEL_SIZE))
            .draw()
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }

    /// Render the monitoring chart: provider polls against included snapshot values.
    pub fn render_monitoring_png(
        spec: &MonitoringSpec,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), ChartError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let values = spec.available.iter().chain(&spec.included).map(|&(_, v)| v);
        let y_min = values.clone().fold(f64::INFINITY, f64::min);
        let y_max = values.fold(f64::NEG_INFINITY, f64::max);
        if !y_min.is_finite() {
            return Err(ChartError::NoData);
        }
        let pad = ((y_max - y_min) * 0.05).max(1.0);
        let (y_lo, y_hi) = (y_min - pad, y_max + pad);

        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, (FONT, TITLE_SIZE))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..spec.max_hours().max(1.0) + 1.0, y_lo..y_hi)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_desc(format!("Hours since {} UTC", spec.origin.format("%Y-%m-%d %H:%M")))
            .y_desc("Confirmed cases")
            .label_style((FONT, LABEL_SIZE))
            .light_line_style(BLACK.mix(0.05))
            .draw()
            .map_err(render_error)?;

        let vertical = |x: f64| PathElement::new(vec![(x, y_lo), (x, y_hi)], MIDNIGHT_COLOR.mix(0.5));
        chart
            .draw_series(spec.midnights.iter().map(|&x| vertical(x)))
            .map_err(render_error)?;

        let upstream = UPSTREAM_COLOR.stroke_width(1);
        chart
            .draw_series(
                spec.upstream
                    .iter()
                    .map(|&x| PathElement::new(vec![(x, y_lo), (x, y_hi)], upstream)),
            )
            .map_err(render_error)?
            .label("Upstream updated")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], upstream));

        for (points, color, label) in [
            (&spec.available, AVAILABLE_COLOR, "Available data"),
            (&spec.included, INCLUDED_COLOR, "Included data"),
        ] {
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(render_error)?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
                .map_err(render_error)?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font((FONT, LABEL_SIZE))
            .draw()
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }
}
