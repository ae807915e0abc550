//! # Utility Functions and Helper Module
//!
//! Small helpers shared by the report pipeline and the binary: human-readable
//! formatting, parameter validation and console tables.
//!
//! ## Usage Examples
//!
//! ```rust
//! use scaling_report::utils::*;
//! use std::time::Duration;
//!
//! # fn main() -> anyhow::Result<()> {
//! assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
//! assert_eq!(format_ratio(2.857142), "2.857");
//!
//! validate_dimensions(2000, 600)?;
//! # Ok(())
//! # }
//! ```

use crate::metrics::ScalingAnalysis;
use anyhow::Result;
use std::time::Duration;

/// Largest accepted image side in pixels
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// Format a duration with the most readable unit
///
/// ```rust
/// # use scaling_report::utils::format_duration;
/// # use std::time::Duration;
/// assert_eq!(format_duration(Duration::from_nanos(750)), "750ns");
/// assert_eq!(format_duration(Duration::from_micros(2500)), "2.50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ns = duration.as_nanos();

    if total_ns < 1_000 {
        format!("{}ns", total_ns)
    } else if total_ns < 1_000_000 {
        format!("{:.2}μs", total_ns as f64 / 1_000.0)
    } else if total_ns < 1_000_000_000 {
        format!("{:.2}ms", total_ns as f64 / 1_000_000.0)
    } else if total_ns < 60_000_000_000 {
        format!("{:.2}s", total_ns as f64 / 1_000_000_000.0)
    } else {
        let seconds = duration.as_secs();
        let minutes = seconds / 60;
        let remaining_seconds = seconds % 60;

        if minutes < 60 {
            format!("{}m {}s", minutes, remaining_seconds)
        } else {
            let hours = minutes / 60;
            let remaining_minutes = minutes % 60;
            format!("{}h {}m {}s", hours, remaining_minutes, remaining_seconds)
        }
    }
}

/// Three decimals for finite ratios, `inf`/`NaN` spelled out otherwise
pub fn format_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{:.3}", value)
    } else {
        format!("{}", value)
    }
}

/// Format seconds the way benchmark tables usually print them
///
/// Values that do not fit a [`Duration`] fall back to scientific notation.
pub fn format_seconds(seconds: f64) -> String {
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) => format_duration(duration),
        Err(_) if seconds.is_finite() => format!("{:.3e}s", seconds),
        Err(_) => format!("{}s", seconds),
    }
}

/// Validate an image size
///
/// Both sides must be non-zero and at most [`MAX_IMAGE_SIDE`] pixels.
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("Image size {}x{} must be non-zero", width, height);
    }
    if width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE {
        anyhow::bail!(
            "Image size {}x{} exceeds the {} pixel limit",
            width,
            height,
            MAX_IMAGE_SIDE
        );
    }
    Ok(())
}

/// Format a table row with fixed column widths
pub fn format_table_row(columns: &[&str], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, column) in columns.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(10);
        line.push_str(&format!(" {:width$} |", column, width = width));
    }
    line
}

/// Format a `+----+----+` separator matching [`format_table_row`]
pub fn format_table_separator(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for &width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    println!("{}", format_table_row(columns, widths));
}

pub fn print_table_separator(widths: &[usize]) {
    println!("{}", format_table_separator(widths));
}

const SCALING_TABLE_WIDTHS: [usize; 5] = [10, 8, 12, 9, 10];
const SCALING_TABLE_HEADER: [&str; 5] = ["Points", "Threads", "Time", "Speedup", "Efficiency"];

/// Cells of the derived metrics table, one row per derived point
pub fn scaling_table_rows(analysis: &ScalingAnalysis) -> Vec<[String; 5]> {
    analysis
        .groups
        .iter()
        .flat_map(|group| {
            group.series.iter().map(move |p| {
                [
                    group.points.to_string(),
                    p.threads.to_string(),
                    format_seconds(p.time_seconds),
                    format_ratio(p.speedup),
                    format_ratio(p.efficiency),
                ]
            })
        })
        .collect()
}

/// Render the derived metrics of one method as console table lines
pub fn scaling_table(analysis: &ScalingAnalysis) -> Vec<String> {
    let widths = SCALING_TABLE_WIDTHS;
    let mut lines = vec![
        format!("{} scaling", analysis.method),
        format_table_separator(&widths),
        format_table_row(&SCALING_TABLE_HEADER, &widths),
        format_table_separator(&widths),
    ];
    for cells in scaling_table_rows(analysis) {
        let columns: Vec<&str> = cells.iter().map(String::as_str).collect();
        lines.push(format_table_row(&columns, &widths));
    }
    lines.push(format_table_separator(&widths));
    lines
}

pub fn print_scaling_table(analysis: &ScalingAnalysis) {
    let widths = SCALING_TABLE_WIDTHS;
    println!("{} scaling", analysis.method);
    print_table_separator(&widths);
    print_table_row(&SCALING_TABLE_HEADER, &widths);
    print_table_separator(&widths);
    for cells in scaling_table_rows(analysis) {
        let columns: Vec<&str> = cells.iter().map(String::as_str).collect();
        print_table_row(&columns, &widths);
    }
    print_table_separator(&widths);
}
