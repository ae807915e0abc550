//! # Performance Chart Rendering
//!
//! Renders a [`ScalingAnalysis`] as one image with three panels side by side:
//!
//! | Panel | Y axis | Reference |
//! |-------|--------|-----------|
//! | Execution Time | seconds, logarithmic | none |
//! | Speedup | `S = T1 / Tp` | ideal `S = p` over the union of thread counts |
//! | Efficiency | `E = S / p`, fixed `[0, 1.1]` | `E = 1` |
//!
//! Every problem size gets one line-and-marker series per panel, with legend
//! entries in the order the sizes first appear in the table.
//!
//! Each call owns its drawing surface: the backend is created for the output
//! path, presented, and dropped before the function returns, so concurrent
//! renders for different methods never share state.

use crate::error::ReportError;
use crate::metrics::ScalingAnalysis;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix of every chart file name
pub const CHART_FILE_SUFFIX: &str = "_performance_plots";

/// Output image encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ImageFormat {
    /// Raster image through the bitmap backend
    Png,
    /// Vector image through the SVG backend
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// Pick the format from a file extension, PNG for anything unknown
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
            _ => ImageFormat::Png,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Appearance of the three-panel figure
#[derive(Clone, Debug)]
pub struct ChartConfig {
    /// Full figure width in pixels, shared by the three panels
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub background: RGBColor,
    pub line_width: u32,
    pub marker_size: u32,
    pub show_grid: bool,
    /// Optional series colours, one per problem size
    pub series_colors: Option<Vec<RGBColor>>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: crate::defaults::CHART_WIDTH,
            height: crate::defaults::CHART_HEIGHT,
            format: ImageFormat::Png,
            background: WHITE,
            line_width: 2,
            marker_size: 4,
            show_grid: true,
            series_colors: None,
        }
    }
}

impl ChartConfig {
    /// Colour of the series at `index`, cycling through the default palette
    pub(crate) fn series_color(&self, index: usize) -> RGBColor {
        if let Some(ref colors) = self.series_colors {
            if index < colors.len() {
                return colors[index];
            }
        }

        let palette = [
            RGBColor(31, 119, 180),
            RGBColor(255, 127, 14),
            RGBColor(44, 160, 44),
            RGBColor(214, 39, 40),
            RGBColor(148, 103, 189),
            RGBColor(140, 86, 75),
            RGBColor(227, 119, 194),
            RGBColor(127, 127, 127),
            RGBColor(188, 189, 34),
            RGBColor(23, 190, 207),
        ];
        palette[index % palette.len()]
    }
}

/// `{dir}/{method}_performance_plots.{ext}`
pub fn chart_path(dir: &Path, method: &str, format: ImageFormat) -> PathBuf {
    dir.join(format!("{}{}.{}", method, CHART_FILE_SUFFIX, format.extension()))
}

/// Render the three-panel chart of one method to `output_path`
///
/// ## Errors
/// Returns [`ReportError::Render`] when drawing fails or the image cannot be
/// written, for example when the destination directory does not exist.
pub fn render_performance_chart(
    analysis: &ScalingAnalysis,
    output_path: &Path,
    config: &ChartConfig,
) -> Result<(), ReportError> {
    debug!(
        "Rendering {} groups for {} to {:?}",
        analysis.groups.len(),
        analysis.method,
        output_path
    );

    let size = (config.width, config.height);
    let result = match config.format {
        ImageFormat::Svg => draw_panels(SVGBackend::new(output_path, size), analysis, config),
        ImageFormat::Png => draw_panels(BitMapBackend::new(output_path, size), analysis, config),
    };

    result.map_err(|e| discard_partial_chart(&analysis.method, output_path, e))
}

/// Map a drawing failure to [`ReportError::Render`], removing whatever the
/// backend flushed to `output_path` before it was dropped
fn discard_partial_chart(method: &str, output_path: &Path, err: Box<dyn Error>) -> ReportError {
    match std::fs::remove_file(output_path) {
        Ok(()) => debug!("Removed partial chart {:?}", output_path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial chart {:?}: {}", output_path, e),
    }
    ReportError::render(method, output_path, err)
}

fn draw_panels<DB: DrawingBackend>(
    backend: DB,
    analysis: &ScalingAnalysis,
    config: &ChartConfig,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&config.background)?;

    let panels = root.split_evenly((1, 3));
    let x_range = thread_range(&analysis.ideal_threads);

    draw_time_panel(&panels[0], analysis, config, x_range.clone())?;
    draw_speedup_panel(&panels[1], analysis, config, x_range.clone())?;
    draw_efficiency_panel(&panels[2], analysis, config, x_range)?;

    root.present()?;
    Ok(())
}

fn draw_time_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &ScalingAnalysis,
    config: &ChartConfig,
    x_range: Range<f64>,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    // Log axis: only strictly positive times can be placed
    let times: Vec<f64> = analysis
        .groups
        .iter()
        .flat_map(|g| g.series.iter().map(|p| p.time_seconds))
        .filter(|t| t.is_finite() && *t > 0.0)
        .collect();
    let y_range = log_range(&times);

    let mut chart = ChartBuilder::on(area)
        .caption("Execution Time", ("sans-serif", 28).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range.log_scale())?;

    let thread_fmt = |x: &f64| format!("{:.0}", x);
    let time_fmt = |y: &f64| format!("{:.3}", y);
    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Threads")
        .y_desc("Time (s)")
        .x_label_formatter(&thread_fmt)
        .y_label_formatter(&time_fmt);
    if !config.show_grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let labels = analysis.legend_labels();
    for (k, group) in analysis.groups.iter().enumerate() {
        let color = config.series_color(k);
        let points = finite_points(
            &analysis.method,
            group.points,
            group
                .series
                .iter()
                .map(|p| (p.threads as f64, p.time_seconds))
                .filter(|(_, t)| *t > 0.0),
        );

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(config.line_width),
            ))?
            .label(labels[k].clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, config.marker_size, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&config.background.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

fn draw_speedup_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &ScalingAnalysis,
    config: &ChartConfig,
    x_range: Range<f64>,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let ideal: Vec<(f64, f64)> = analysis
        .ideal_threads
        .iter()
        .map(|&t| (t as f64, t as f64))
        .collect();

    let max_speedup = analysis
        .groups
        .iter()
        .flat_map(|g| g.series.iter().map(|p| p.speedup))
        .chain(ideal.iter().map(|&(_, s)| s))
        .filter(|s| s.is_finite())
        .fold(1.0_f64, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption("Speedup", ("sans-serif", 28).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..(max_speedup * 1.1))?;

    let thread_fmt = |x: &f64| format!("{:.0}", x);
    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Threads")
        .y_desc("S = T1 / Tp")
        .x_label_formatter(&thread_fmt);
    if !config.show_grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let labels = analysis.legend_labels();
    for (k, group) in analysis.groups.iter().enumerate() {
        let color = config.series_color(k);
        let points = finite_points(
            &analysis.method,
            group.points,
            group.series.iter().map(|p| (p.threads as f64, p.speedup)),
        );

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(config.line_width),
            ))?
            .label(labels[k].clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, config.marker_size, color.filled())),
        )?;
    }

    chart
        .draw_series(LineSeries::new(ideal, BLACK.stroke_width(1)))?
        .label("Ideal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&config.background.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

fn draw_efficiency_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &ScalingAnalysis,
    config: &ChartConfig,
    x_range: Range<f64>,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let (x_start, x_end) = (x_range.start, x_range.end);

    let mut chart = ChartBuilder::on(area)
        .caption("Efficiency", ("sans-serif", 28).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..1.1)?;

    let thread_fmt = |x: &f64| format!("{:.0}", x);
    let eff_fmt = |y: &f64| format!("{:.1}", y);
    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Threads")
        .y_desc("E = S / p")
        .x_label_formatter(&thread_fmt)
        .y_label_formatter(&eff_fmt);
    if !config.show_grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let labels = analysis.legend_labels();
    for (k, group) in analysis.groups.iter().enumerate() {
        let color = config.series_color(k);
        let points = finite_points(
            &analysis.method,
            group.points,
            group.series.iter().map(|p| (p.threads as f64, p.efficiency)),
        );

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(config.line_width),
            ))?
            .label(labels[k].clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, config.marker_size, color.filled())),
        )?;
    }

    chart
        .draw_series(LineSeries::new(
            vec![(x_start, 1.0), (x_end, 1.0)],
            BLACK.stroke_width(1),
        ))?
        .label("Ideal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(&config.background.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

/// Keep only drawable points, logging what was dropped
fn finite_points(
    method: &str,
    points: u64,
    series: impl Iterator<Item = (f64, f64)>,
) -> Vec<(f64, f64)> {
    let all: Vec<(f64, f64)> = series.collect();
    let kept: Vec<(f64, f64)> = all
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    if kept.len() < all.len() {
        warn!(
            "[{}] N={}: {} point(s) with non-finite or non-positive values not drawn",
            method,
            points,
            all.len() - kept.len()
        );
    }
    kept
}

/// X axis covering every thread count with a small margin
fn thread_range(threads: &[u32]) -> Range<f64> {
    let min = threads.iter().copied().min().unwrap_or(1) as f64;
    let max = threads.iter().copied().max().unwrap_or(1) as f64;

    if max > min {
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    } else {
        (min - 0.5)..(max + 0.5)
    }
}

/// Y range for a logarithmic axis, always strictly positive
fn log_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return 1e-3..1.0;
    }
    if max > min {
        (min / 1.25)..(max * 1.25)
    } else {
        (min * 0.5)..(max * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::analyze;
    use crate::table::read_table;

    fn grid_analysis() -> ScalingAnalysis {
        let table = read_table(
            "Grid",
            "Points,Threads,Time_Seconds\n1024,1,10.0\n1024,2,6.0\n1024,4,3.5\n2048,1,21.0\n2048,3,8.0\n"
                .as_bytes(),
        )
        .unwrap();
        analyze(&table).unwrap()
    }

    #[test]
    fn test_chart_path_naming() {
        let path = chart_path(Path::new("out"), "Monte-Carlo", ImageFormat::Png);
        assert_eq!(path, Path::new("out/Monte-Carlo_performance_plots.png"));

        let path = chart_path(Path::new("."), "Grid", ImageFormat::Svg);
        assert!(path.ends_with("Grid_performance_plots.svg"));
    }

    #[test]
    fn test_image_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a.svg")), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("a.SVG")), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("a.png")), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("a")), ImageFormat::Png);
    }

    #[test]
    fn test_series_color_palette_wraps() {
        let config = ChartConfig::default();
        assert_eq!(config.series_color(0), config.series_color(10));
        assert_ne!(config.series_color(0), config.series_color(1));

        let custom = ChartConfig {
            series_colors: Some(vec![RED]),
            ..ChartConfig::default()
        };
        assert_eq!(custom.series_color(0), RED);
        assert_eq!(custom.series_color(1), config.series_color(1));
    }

    #[test]
    fn test_thread_range_pads_axis() {
        let range = thread_range(&[1, 2, 3, 4]);
        assert!(range.start < 1.0 && range.end > 4.0);

        let single = thread_range(&[8]);
        assert_eq!(single, 7.5..8.5);
    }

    #[test]
    fn test_log_range_is_positive() {
        let range = log_range(&[0.5, 8.0]);
        assert!(range.start > 0.0 && range.start < 0.5);
        assert!(range.end > 8.0);

        assert_eq!(log_range(&[]), 1e-3..1.0);
        assert_eq!(log_range(&[2.0]), 1.0..4.0);
    }

    #[test]
    fn test_finite_points_drops_non_finite() {
        let kept = finite_points(
            "Grid",
            1024,
            vec![(1.0, 1.0), (2.0, f64::INFINITY), (4.0, f64::NAN)].into_iter(),
        );
        assert_eq!(kept, vec![(1.0, 1.0)]);
    }

    #[test]
    fn test_render_svg_chart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChartConfig {
            format: ImageFormat::Svg,
            ..ChartConfig::default()
        };
        let path = chart_path(dir.path(), "Grid", config.format);

        render_performance_chart(&grid_analysis(), &path, &config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_png_chart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChartConfig::default();
        let path = chart_path(dir.path(), "Grid", config.format);

        render_performance_chart(&grid_analysis(), &path, &config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_render_leaves_no_partial_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = chart_path(dir.path(), "Grid", ImageFormat::Svg);
        std::fs::write(&path, "<svg>").unwrap();

        let err = discard_partial_chart("Grid", &path, "drawing area too small".into());

        assert!(matches!(err, ReportError::Render { ref method, .. } if method == "Grid"));
        assert!(err.to_string().contains("drawing area too small"));
        assert!(!path.exists());
    }

    #[test]
    fn test_svg_legend_follows_source_order() {
        let table = read_table(
            "Grid",
            "Points,Threads,Time_Seconds\n4096,1,9.0\n1024,1,1.0\n4096,2,5.0\n1024,2,0.6\n"
                .as_bytes(),
        )
        .unwrap();
        let analysis = analyze(&table).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = ChartConfig {
            format: ImageFormat::Svg,
            ..ChartConfig::default()
        };
        let path = chart_path(dir.path(), "Grid", config.format);

        render_performance_chart(&analysis, &path, &config).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        let labels = analysis.legend_labels();
        assert_eq!(labels, vec!["N=4096", "N=1024"]);
        let first = svg.find(labels[0].as_str()).unwrap();
        let second = svg.find(labels[1].as_str()).unwrap();
        assert!(first < second);
        assert_eq!(svg.matches("N=4096").count(), 3);
    }

    #[test]
    fn test_render_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = chart_path(&dir.path().join("missing"), "Grid", ImageFormat::Png);

        let err = render_performance_chart(&grid_analysis(), &path, &ChartConfig::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::Render { .. }));
        assert!(!path.exists());
    }
}
