use textplots::{Chart, Plot, Shape};

use crate::report::HoldingShare;

const PIE_BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 120,
            height: 30,
        }
    }
}

/// Index the finite points so they can sit on a numeric x axis.
fn indexed(points: &[(String, f64)]) -> Vec<(f32, f32)> {
    points
        .iter()
        .enumerate()
        .filter(|(_, (_, value))| value.is_finite())
        .map(|(idx, (_, value))| (idx as f32, *value as f32))
        .collect()
}

fn print_axis_legend(points: &[(String, f64)]) {
    let legend: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(idx, (label, _))| format!("{idx}={label}"))
        .collect();
    println!("x: {}", legend.join("  "));
}

/// Line chart of a per-quarter series.
pub fn render_line(title: &str, points: &[(String, f64)], size: ChartSize) {
    let samples = indexed(points);
    println!("{title}");
    if samples.len() < 2 {
        println!("(not enough data points to draw a trend)");
        return;
    }

    let max_x = (points.len() - 1) as f32;
    Chart::new(size.width.max(40), size.height.max(10), 0.0, max_x)
        .lineplot(&Shape::Lines(&samples))
        .display();
    print_axis_legend(points);
    println!();
}

/// Bar chart; the y range always includes zero so negative bars read correctly.
pub fn render_bars(title: &str, points: &[(String, f64)], size: ChartSize) {
    let samples = indexed(points);
    println!("{title}");
    if samples.is_empty() {
        println!("(no finite values to draw)");
        return;
    }

    let min_y = samples.iter().map(|(_, y)| *y).fold(0.0_f32, f32::min);
    let max_y = samples.iter().map(|(_, y)| *y).fold(0.0_f32, f32::max);
    let max_x = points.len().max(1) as f32;
    Chart::new_with_y_range(
        size.width.max(40),
        size.height.max(10),
        -0.5,
        max_x - 0.5,
        min_y,
        max_y.max(min_y + f32::EPSILON),
    )
    .lineplot(&Shape::Bars(&samples))
    .display();
    print_axis_legend(points);
    println!();
}

/// Text rendering of each institution's slice of the combined holding.
pub fn pie_breakdown(shares: &[HoldingShare]) -> String {
    let name_width = shares
        .iter()
        .map(|share| share.owner_name.chars().count())
        .max()
        .unwrap_or(0);

    shares
        .iter()
        .map(|share| {
            let filled = (share.fraction * PIE_BAR_WIDTH as f64).round() as usize;
            format!(
                "{:<name_width$} | {:<bar_width$} | {:>6.2}%",
                share.owner_name,
                "█".repeat(filled.min(PIE_BAR_WIDTH)),
                share.fraction * 100.0,
                bar_width = PIE_BAR_WIDTH,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
