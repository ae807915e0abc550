//! Scatter images of computed point sets, e.g. the members of a Mandelbrot
//! grid run.

use crate::chart::ImageFormat;
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

/// Coordinates of a point set, kept as two parallel columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PointSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Read a point set from CSV; the first two columns are x and y
pub fn read_point_set<R: Read>(reader: R) -> Result<PointSet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().context("Failed to read CSV header")?;
    if headers.len() < 2 {
        return Err(anyhow!(
            "Point file needs at least two columns, found {}",
            headers.len()
        ));
    }

    let mut points = PointSet::default();
    for (i, record) in csv_reader.records().enumerate() {
        let row = i + 1;
        let record = record.with_context(|| format!("Failed to read row {}", row))?;
        let coord = |idx: usize| -> Result<f64> {
            let raw = record.get(idx).unwrap_or("");
            raw.parse::<f64>()
                .with_context(|| format!("Row {}: '{}' is not a number", row, raw))
        };
        points.x.push(coord(0)?);
        points.y.push(coord(1)?);
    }

    Ok(points)
}

pub fn load_point_set(path: &Path) -> Result<PointSet> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let points = read_point_set(file).with_context(|| format!("Failed to parse {:?}", path))?;
    debug!("Loaded {} points from {:?}", points.len(), path);
    Ok(points)
}

/// Window and look of a scatter image
#[derive(Clone, Debug)]
pub struct ScatterConfig {
    pub width: u32,
    pub height: u32,
    /// Caption prefix, the point count is appended
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            width: crate::defaults::SCATTER_WIDTH,
            height: crate::defaults::SCATTER_HEIGHT,
            title: "Mandelbrot Set".to_string(),
            x_range: -2.1..1.1,
            y_range: -1.5..1.5,
        }
    }
}

impl ScatterConfig {
    pub fn caption(&self, count: usize) -> String {
        format!("{} ({} points)", self.title, count)
    }

    /// Validate the window and the image size
    pub fn validate(&self) -> Result<()> {
        crate::utils::validate_dimensions(self.width, self.height)?;
        for (axis, range) in [("x", &self.x_range), ("y", &self.y_range)] {
            if !(range.start.is_finite() && range.end.is_finite() && range.start < range.end) {
                anyhow::bail!(
                    "Invalid {} range {}..{}: bounds must be finite and increasing",
                    axis,
                    range.start,
                    range.end
                );
            }
        }
        Ok(())
    }
}

/// Draw `points` as one-pixel black markers over a fixed window
///
/// Points outside the window are clipped. The encoding follows the
/// extension of `output_path`.
pub fn render_scatter(points: &PointSet, output_path: &Path, config: &ScatterConfig) -> Result<()> {
    config.validate()?;

    let size = (config.width, config.height);
    let result = match ImageFormat::from_path(output_path) {
        ImageFormat::Svg => draw_scatter(SVGBackend::new(output_path, size), points, config),
        ImageFormat::Png => draw_scatter(BitMapBackend::new(output_path, size), points, config),
    };
    result.map_err(|e| anyhow!("Failed to render scatter to {:?}: {}", output_path, e))?;

    info!("Scatter of {} points written to {:?}", points.len(), output_path);
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    backend: DB,
    points: &PointSet,
    config: &ScatterConfig,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(config.caption(points.len()), ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(config.x_range.clone(), config.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc("Re")
        .y_desc("Im")
        .light_line_style(&WHITE)
        .bold_line_style(&BLACK.mix(0.15))
        .draw()?;

    let (x_range, y_range) = (&config.x_range, &config.y_range);
    chart.draw_series(
        points
            .iter()
            .filter(|(x, y)| x_range.contains(x) && y_range.contains(y))
            .map(|p| Circle::new(p, 1, BLACK.mix(0.8).filled())),
    )?;

    root.present()?;
    Ok(())
}
