//! SVG line-chart assembly.
//!
//! The chart is written directly into a string buffer: axes, dashed grid,
//! one polyline per series with point markers and optional ±1σ error bars,
//! a legend, and title/caption text. The x-axis carries one tick per core
//! count; the y-axis starts at zero.

use std::fmt::Write as _;

use super::ChartSpec;
use crate::sweep::{Series, SweepResults};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 180.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 70.0;

const PALETTE: [&str; 6] = [
    "#1f77b4", "#2ca02c", "#d62728", "#9467bd", "#ff7f0e", "#8c564b",
];

const Y_TICKS: usize = 5;

struct Scale {
    x_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Scale {
    fn x(&self, value: f64) -> f64 {
        let span = (self.x_max - self.x_min).max(1.0);
        MARGIN_LEFT + (value - self.x_min) / span * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn y(&self, value: f64) -> f64 {
        let bottom = HEIGHT - MARGIN_BOTTOM;
        bottom - value / self.y_max * (bottom - MARGIN_TOP)
    }
}

fn fit_scale(results: &SweepResults, error_bars: bool) -> Scale {
    let cores = &results.config.cores;
    let x_min = f64::from(*cores.first().unwrap_or(&0));
    let x_max = f64::from(*cores.last().unwrap_or(&1));

    let mut y_max = 0.0f64;
    for series in &results.series {
        for point in &series.points {
            let top = if error_bars {
                point.result.mean + point.result.std_dev
            } else {
                point.result.mean
            };
            y_max = y_max.max(top);
        }
    }
    Scale {
        x_min,
        x_max,
        // Headroom above the tallest point; degenerate all-zero data still
        // gets a drawable axis.
        y_max: if y_max > 0.0 { y_max * 1.1 } else { 1.0 },
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn fmt_tick(value: f64) -> String {
    if value >= 100.0 || value == 0.0 {
        format!("{value:.0}")
    } else if value >= 1.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

pub(super) fn render(results: &SweepResults, spec: &ChartSpec, caption: &str) -> String {
    let scale = fit_scale(results, spec.error_bars);
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;
    let plot_center_x = (MARGIN_LEFT + plot_right) / 2.0;

    let mut buffer = String::with_capacity(16 * 1024);

    writeln!(
        &mut buffer,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" \
         font-family=\"Helvetica, Arial, sans-serif\">"
    )
    .ok();
    writeln!(
        &mut buffer,
        "  <rect x=\"0\" y=\"0\" width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#ffffff\"/>"
    )
    .ok();

    // Title and caption
    writeln!(
        &mut buffer,
        "  <text x=\"{plot_center_x}\" y=\"30\" text-anchor=\"middle\" font-size=\"18\" \
         fill=\"#1f2933\">{}</text>",
        xml_escape(&spec.title)
    )
    .ok();
    writeln!(
        &mut buffer,
        "  <text x=\"{plot_center_x}\" y=\"52\" text-anchor=\"middle\" font-size=\"12\" \
         font-style=\"italic\" fill=\"#6b7280\">{}</text>",
        xml_escape(caption)
    )
    .ok();

    // Dashed grid: vertical per core count, horizontal per y tick.
    for &cores in &results.config.cores {
        let x = scale.x(f64::from(cores));
        writeln!(
            &mut buffer,
            "  <line x1=\"{x:.1}\" y1=\"{MARGIN_TOP}\" x2=\"{x:.1}\" y2=\"{plot_bottom}\" \
             stroke=\"#d1d5db\" stroke-width=\"0.5\" stroke-dasharray=\"4 3\"/>"
        )
        .ok();
    }
    for step in 0..=Y_TICKS {
        let value = scale.y_max * step as f64 / Y_TICKS as f64;
        let y = scale.y(value);
        writeln!(
            &mut buffer,
            "  <line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{plot_right}\" y2=\"{y:.1}\" \
             stroke=\"#d1d5db\" stroke-width=\"0.5\" stroke-dasharray=\"4 3\"/>"
        )
        .ok();
        writeln!(
            &mut buffer,
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\" \
             fill=\"#374151\">{}</text>",
            MARGIN_LEFT - 8.0,
            y + 4.0,
            fmt_tick(value)
        )
        .ok();
    }

    // Axes
    writeln!(
        &mut buffer,
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" \
         y2=\"{plot_bottom}\" stroke=\"#111827\" stroke-width=\"1\"/>"
    )
    .ok();
    writeln!(
        &mut buffer,
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{plot_bottom}\" x2=\"{plot_right}\" \
         y2=\"{plot_bottom}\" stroke=\"#111827\" stroke-width=\"1\"/>"
    )
    .ok();

    // X tick labels, one per swept core count.
    for &cores in &results.config.cores {
        let x = scale.x(f64::from(cores));
        writeln!(
            &mut buffer,
            "  <text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\" \
             fill=\"#374151\">{cores}</text>",
            plot_bottom + 18.0
        )
        .ok();
    }

    // Axis labels
    writeln!(
        &mut buffer,
        "  <text x=\"{plot_center_x}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\" \
         fill=\"#1f2933\">Number of Cores</text>",
        HEIGHT - 18.0
    )
    .ok();
    let y_label_y = (MARGIN_TOP + plot_bottom) / 2.0;
    writeln!(
        &mut buffer,
        "  <text x=\"24\" y=\"{y_label_y:.1}\" text-anchor=\"middle\" font-size=\"13\" \
         fill=\"#1f2933\" transform=\"rotate(-90 24 {y_label_y:.1})\">{}</text>",
        xml_escape(&spec.y_label)
    )
    .ok();

    // Series
    for (index, series) in results.series.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        render_series(&mut buffer, series, color, &scale, spec.error_bars);
    }

    // Legend
    let legend_x = plot_right + 16.0;
    for (index, series) in results.series.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let y = MARGIN_TOP + 10.0 + index as f64 * 22.0;
        writeln!(
            &mut buffer,
            "  <line x1=\"{legend_x}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" \
             stroke=\"{color}\" stroke-width=\"2\"/>",
            legend_x + 24.0
        )
        .ok();
        writeln!(
            &mut buffer,
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"#1f2933\">{}</text>",
            legend_x + 30.0,
            y + 4.0,
            xml_escape(&series.label)
        )
        .ok();
    }

    writeln!(&mut buffer, "</svg>").ok();
    buffer
}

fn render_series(buffer: &mut String, series: &Series, color: &str, scale: &Scale, bars: bool) {
    if bars {
        for point in &series.points {
            let sd = point.result.std_dev;
            if sd <= 0.0 {
                continue;
            }
            let x = scale.x(f64::from(point.cores));
            let y_low = scale.y((point.result.mean - sd).max(0.0));
            let y_high = scale.y(point.result.mean + sd);
            writeln!(
                buffer,
                "  <line class=\"errbar\" x1=\"{x:.1}\" y1=\"{y_low:.1}\" x2=\"{x:.1}\" \
                 y2=\"{y_high:.1}\" stroke=\"{color}\" stroke-width=\"1\"/>"
            )
            .ok();
            for cap_y in [y_low, y_high] {
                writeln!(
                    buffer,
                    "  <line class=\"errbar\" x1=\"{:.1}\" y1=\"{cap_y:.1}\" x2=\"{:.1}\" \
                     y2=\"{cap_y:.1}\" stroke=\"{color}\" stroke-width=\"1\"/>",
                    x - 4.0,
                    x + 4.0
                )
                .ok();
            }
        }
    }

    let mut points_attr = String::new();
    for point in &series.points {
        let x = scale.x(f64::from(point.cores));
        let y = scale.y(point.result.mean);
        write!(points_attr, "{x:.1},{y:.1} ").ok();
    }
    writeln!(
        buffer,
        "  <polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>",
        points_attr.trim_end()
    )
    .ok();

    for point in &series.points {
        let x = scale.x(f64::from(point.cores));
        let y = scale.y(point.result.mean);
        writeln!(
            buffer,
            "  <circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"3.5\" fill=\"{color}\"/>"
        )
        .ok();
    }
}
