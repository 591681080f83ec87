//! Chart rendering: one comparison chart per category, to **SVG** or
//! **PNG**, in the shape of the source dashboard (current-year line with
//! markers, single historical year as its own line, multi-year band as
//! avg/min/max lines).

use crate::stats::{CategoryComparison, Comparison, HistoricalSeries};
use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};
use std::sync::Once;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One-time registration for a fallback "sans-serif" font when using the
/// `ab_glyph` text path. Required because `ab_glyph` doesn't discover OS
/// fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../assets/DejaVuSans.ttf"),
        );
    });
}

/// Render the comparison chart for a single category.
///
/// Backend is chosen by extension: `.svg` renders with the SVG backend,
/// anything else with the bitmap backend (PNG).
pub fn plot_category<P: AsRef<Path>>(
    cat: &CategoryComparison,
    current_year: i32,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    ensure_fonts_registered();

    if cat.current.is_empty() {
        return Err(anyhow!("no data to plot for category {:?}", cat.category));
    }

    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    let mut values: Vec<f64> = cat.current.iter().map(|p| p.mean).collect();
    match &cat.historical {
        HistoricalSeries::SingleYear { points, .. } => {
            values.extend(points.iter().map(|p| p.mean));
        }
        HistoricalSeries::Band(points) => {
            values.extend(points.iter().flat_map(|p| [p.min, p.mean, p.max]));
        }
    }
    let (mut min_val, mut max_val) = (
        values.iter().cloned().fold(f64::INFINITY, f64::min),
        values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    if (max_val - min_val).abs() < f64::EPSILON {
        min_val -= 1.0;
        max_val += 1.0;
    }

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, cat, current_year, min_val, max_val)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, cat, current_year, min_val, max_val)?;
    }

    Ok(())
}

/// Render one chart per reported category into `dir`, named after the
/// category. Returns the paths written.
pub fn plot_all<P: AsRef<Path>>(
    comparison: &Comparison,
    dir: P,
    width: u32,
    height: u32,
    ext: &str,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for cat in &comparison.categories {
        let stem: String = cat
            .category
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let path = dir.join(format!("{}.{}", stem, ext));
        plot_category(cat, comparison.current_year, &path, width, height)?;
        written.push(path);
    }
    Ok(written)
}

/// Helper that draws to any Plotters backend.
fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    cat: &CategoryComparison,
    current_year: i32,
    min_val: f64,
    max_val: f64,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(format!("Category: {}", cat.category), ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(0.5f64..13.0f64, min_val..max_val)
        .map_err(|e| anyhow!("{:?}", e))?;

    // Ticks sit on the whole months; half-month points land in between.
    let x_label_fmt = |v: &f64| {
        let month = v.round();
        if (v - month).abs() < 1e-6 && (1.0..=12.0).contains(&month) {
            MONTHS[month as usize - 1].to_string()
        } else {
            String::new()
        }
    };
    let y_label_fmt = |v: &f64| format!("{:.0}", v);

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Sample Avg Value")
        .x_labels(12)
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let current: Vec<(f64, f64)> = cat
        .current
        .iter()
        .map(|p| (p.bucket.axis_pos(), p.mean))
        .collect();
    let current_color = BLUE.to_rgba();
    chart
        .draw_series(LineSeries::new(
            current.clone(),
            ShapeStyle {
                color: current_color,
                filled: false,
                stroke_width: 2,
            },
        ))
        .map_err(|e| anyhow!("{:?}", e))?
        .label(format!("{} Current", current_year))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], current_color));
    chart
        .draw_series(
            current
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, current_color.filled())),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    match &cat.historical {
        HistoricalSeries::SingleYear { year, points } => {
            let series: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (p.bucket.axis_pos(), p.mean))
                .collect();
            if !series.is_empty() {
                let color = MAGENTA.to_rgba();
                chart
                    .draw_series(LineSeries::new(series, color.stroke_width(2)))
                    .map_err(|e| anyhow!("{:?}", e))?
                    .label(year.to_string())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color));
            }
        }
        HistoricalSeries::Band(points) => {
            if !points.is_empty() {
                let bands: [(&str, RGBAColor, fn(&crate::stats::BandPoint) -> f64); 3] = [
                    ("Hist Avg", RGBColor(255, 140, 0).to_rgba(), |p| p.mean),
                    ("Hist Min", RED.to_rgba(), |p| p.min),
                    ("Hist Max", GREEN.to_rgba(), |p| p.max),
                ];
                for (label, color, pick) in bands {
                    let series: Vec<(f64, f64)> = points
                        .iter()
                        .map(|p| (p.bucket.axis_pos(), pick(p)))
                        .collect();
                    chart
                        .draw_series(LineSeries::new(series, color.stroke_width(1)))
                        .map_err(|e| anyhow!("{:?}", e))?
                        .label(label)
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color));
                }
            }
        }
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
