// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{PathElement, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use std::ops::Range;
use std::path::Path;
use tracing::info;

use crate::constants::{
    LINE_WIDTH_LEGEND, LINE_WIDTH_PLOT, LINE_WIDTH_STAGE_MARKER, PLOT_HEIGHT, PLOT_WIDTH, SERIES_PALETTE,
};
use crate::error::{FlightDataError, Result};
use crate::font_config::{FONT_TUPLE_AXIS_LABEL, FONT_TUPLE_CHART_TITLE, FONT_TUPLE_LEGEND, FONT_TUPLE_MESSAGE};
use crate::types::SeriesPoints;

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Format Y-axis tick labels with "k" and "M" notation for large values
/// and two decimals for small fractional values.
pub fn format_y_tick(y: f64) -> String {
    if y.abs() >= 1_000_000.0 {
        format!("{:.1}M", y / 1_000_000.0)
    } else if y.abs() >= 1000.0 {
        format!("{:.0}k", y / 1000.0)
    } else if y.abs() < 10.0 && y.fract() != 0.0 {
        format!("{:.2}", y)
    } else {
        format!("{:.0}", y)
    }
}

/// Smallest and largest finite value, if any.
fn finite_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let finite: Array1<f64> = values.filter(|v| v.is_finite()).collect();
    let min = *finite.min().ok()?;
    let max = *finite.max().ok()?;
    Some((min, max))
}

fn render_error(e: impl std::fmt::Display) -> FlightDataError {
    FlightDataError::Render(e.to_string())
}

/// Image settings for saving a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub line_width: u32,
    pub marker_width: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: PLOT_WIDTH,
            height: PLOT_HEIGHT,
            line_width: LINE_WIDTH_PLOT,
            marker_width: LINE_WIDTH_STAGE_MARKER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub data: SeriesPoints,
    pub label: String,
    pub color: RGBColor,
}

/// Vertical line at a flight-stage timestamp.
#[derive(Debug, Clone)]
pub struct StageMarker {
    pub x: f64,
    pub label: String,
    pub color: RGBColor,
}

/// Drawing surface the session plots onto.
///
/// Calls accumulate into one figure, in call order, the way a plotting context does.
pub trait ChartRenderer {
    /// One line series: `y[i]` is drawn at x = `x.start + i`.
    fn draw_line(&mut self, x: Range<usize>, y: &[f64], label: &str);
    fn draw_vertical_marker(&mut self, x: f64, color: RGBColor, label: &str);
    fn set_title(&mut self, title: &str);
    fn set_axis_labels(&mut self, x_label: &str, y_label: &str);
    fn show_legend(&mut self);
    fn show_grid(&mut self, visible: bool);
}

/// Records chart calls and renders them to a PNG with plotters.
#[derive(Debug, Clone, Default)]
pub struct ChartCanvas {
    title: String,
    x_label: String,
    y_label: String,
    series: Vec<PlotSeries>,
    markers: Vec<StageMarker>,
    legend: bool,
    grid: bool,
}

impl ChartCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty figure.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn axis_labels(&self) -> (&str, &str) {
        (&self.x_label, &self.y_label)
    }

    pub fn series(&self) -> &[PlotSeries] {
        &self.series
    }

    pub fn markers(&self) -> &[StageMarker] {
        &self.markers
    }

    pub fn legend_visible(&self) -> bool {
        self.legend
    }

    pub fn grid_visible(&self) -> bool {
        self.grid
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.markers.is_empty()
    }

    /// Render the figure to `output_path` as a PNG.
    pub fn save_png(&self, output_path: &Path, config: &RenderConfig) -> Result<()> {
        let root_area = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
        root_area.fill(&WHITE).map_err(render_error)?;

        let has_points = self.series.iter().any(|s| !s.data.is_empty());
        if has_points || !self.markers.is_empty() {
            draw_canvas_chart(&root_area, self, config)?;
        } else {
            draw_unavailable_message(&root_area, &self.title, "No data points")?;
        }

        root_area.present().map_err(render_error)?;
        info!(path = %output_path.display(), series = self.series.len(), markers = self.markers.len(), "Chart saved");
        Ok(())
    }
}

impl ChartRenderer for ChartCanvas {
    fn draw_line(&mut self, x: Range<usize>, y: &[f64], label: &str) {
        let data = x.zip(y.iter()).map(|(i, &v)| (i as f64, v)).collect();
        let color = SERIES_PALETTE[self.series.len() % SERIES_PALETTE.len()];
        self.series.push(PlotSeries {
            data,
            label: label.to_string(),
            color,
        });
    }

    fn draw_vertical_marker(&mut self, x: f64, color: RGBColor, label: &str) {
        self.markers.push(StageMarker {
            x,
            label: label.to_string(),
            color,
        });
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_axis_labels(&mut self, x_label: &str, y_label: &str) {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
    }

    fn show_legend(&mut self) {
        self.legend = true;
    }

    fn show_grid(&mut self, visible: bool) {
        self.grid = visible;
    }
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(area: &DrawingArea<BitMapBackend, Shift>, title: &str, reason: &str) -> Result<()> {
    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let message = if title.is_empty() {
        format!("Data Unavailable: {reason}")
    } else {
        format!("{title} Data Unavailable: {reason}")
    };

    // Approximate character width relative to font size
    let estimated_text_width = (message.len() as f32 * FONT_TUPLE_MESSAGE.1 as f32 * 0.6) as i32;
    let center_x = width / 2 - estimated_text_width / 2;
    let center_y = height / 2 - FONT_TUPLE_MESSAGE.1 / 2;

    let text_style = FONT_TUPLE_MESSAGE.into_font().color(&RED);
    area.draw(&Text::new(message, (center_x, center_y), text_style))
        .map_err(render_error)?;
    Ok(())
}

fn draw_canvas_chart(
    area: &DrawingArea<BitMapBackend, Shift>,
    canvas: &ChartCanvas,
    config: &RenderConfig,
) -> Result<()> {
    let points = || canvas.series.iter().flat_map(|s| s.data.iter().copied());

    let x_range: Range<f64> = {
        let xs = points().map(|(x, _)| x).chain(canvas.markers.iter().map(|m| m.x));
        match finite_extent(xs) {
            Some((min, max)) if max - min > 1e-9 => min..max,
            Some((min, max)) => (min - 0.5)..(max + 0.5),
            None => 0.0..1.0,
        }
    };
    let y_range: Range<f64> = {
        let (min, max) = finite_extent(points().map(|(_, y)| y)).unwrap_or((0.0, 1.0));
        let (min, max) = calculate_range(min, max);
        min..max
    };

    let mut chart = ChartBuilder::on(area)
        .caption(&canvas.title, FONT_TUPLE_CHART_TITLE)
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(render_error)?;

    let y_formatter = |y: &f64| format_y_tick(*y);
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(canvas.x_label.as_str())
            .y_desc(canvas.y_label.as_str())
            .x_labels(20)
            .y_labels(10)
            .y_label_formatter(&y_formatter)
            .light_line_style(WHITE.mix(0.7))
            .label_style(FONT_TUPLE_AXIS_LABEL);
        if !canvas.grid {
            mesh.disable_mesh();
        }
        mesh.draw().map_err(render_error)?;
    }

    let mut legend_series_count = 0;

    // Markers first so the data line is drawn over them
    for marker in &canvas.markers {
        if !marker.x.is_finite() {
            continue; // skip malformed input
        }
        let color = marker.color;
        let series = chart
            .draw_series(LineSeries::new(
                vec![(marker.x, y_range.start), (marker.x, y_range.end)],
                color.stroke_width(config.marker_width),
            ))
            .map_err(render_error)?;
        if !marker.label.is_empty() {
            series.label(marker.label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
            });
            legend_series_count += 1;
        }
    }

    for s in &canvas.series {
        let color = s.color;
        let series = chart
            .draw_series(LineSeries::new(
                s.data.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite()),
                color.stroke_width(config.line_width),
            ))
            .map_err(render_error)?;
        if !s.label.is_empty() {
            series.label(s.label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
            });
            legend_series_count += 1;
        }
    }

    if canvas.legend && legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(FONT_TUPLE_LEGEND)
            .draw()
            .map_err(render_error)?;
    }

    Ok(())
}


// src/plot_framework.rs
