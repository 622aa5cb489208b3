use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoint, PlotPoints,
    Points, Polygon, Text,
};

use crate::charts::{CategoryBoxes, MapPoint, ScatterPoint};
use crate::color::{ColorMap, ColorScale};
use crate::data::aggregate::{AggregateResult, GroupRow, PivotMatrix};
use crate::data::model::CellValue;
use crate::data::stats::{CorrelationMatrix, HistogramBin};

const TITLE_COLOR: Color32 = Color32::from_rgb(0x4B, 0x00, 0x82);
const HISTOGRAM_COLOR: Color32 = Color32::from_rgb(0x2E, 0x8B, 0x57);
/// Number of colour buckets used for continuously coloured point clouds.
const COLOR_BUCKETS: usize = 16;

// ---------------------------------------------------------------------------
// Section chrome
// ---------------------------------------------------------------------------

/// Titled section that renders `body` on success or the validation error.
pub fn section<T>(
    ui: &mut Ui,
    title: &str,
    payload: &AggregateResult<T>,
    body: impl FnOnce(&mut Ui, &T),
) {
    ui.add_space(8.0);
    ui.heading(RichText::new(title).color(TITLE_COLOR));
    match payload {
        Ok(data) => body(ui, data),
        Err(e) => {
            ui.label(RichText::new(format!("Chart unavailable: {e}")).color(Color32::RED));
        }
    }
    ui.separator();
}

/// Axis formatter showing `labels[i]` at integer position `i`.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

/// Corners of the unit square centred on `(x, y)`.
fn cell_corners(x: f64, y: f64) -> Vec<[f64; 2]> {
    vec![
        [x - 0.5, y - 0.5],
        [x + 0.5, y - 0.5],
        [x + 0.5, y + 0.5],
        [x - 0.5, y + 0.5],
    ]
}

// ---------------------------------------------------------------------------
// Heatmaps
// ---------------------------------------------------------------------------

/// Draw a matrix as coloured cells; row 0 at the top, missing cells blank.
#[allow(clippy::too_many_arguments)]
fn matrix_plot(
    ui: &mut Ui,
    id: &str,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    cells: &[Vec<Option<f64>>],
    range: (f64, f64),
    scale: ColorScale,
    annotate: bool,
    height: f32,
) {
    let n_rows = row_labels.len();
    // Rows are drawn top-down, so the y axis labels are reversed.
    let y_labels: Vec<String> = row_labels.into_iter().rev().collect();

    Plot::new(id)
        .height(height)
        .x_axis_formatter(category_axis(col_labels))
        .y_axis_formatter(category_axis(y_labels))
        .show_grid(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (r, row) in cells.iter().enumerate() {
                let y = (n_rows - 1 - r) as f64;
                for (c, cell) in row.iter().enumerate() {
                    let Some(v) = cell else { continue };
                    let x = c as f64;
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(cell_corners(x, y)))
                            .fill_color(scale.map(*v, range.0, range.1))
                            .stroke(Stroke::new(0.5, Color32::from_gray(60))),
                    );
                    if annotate {
                        plot_ui.text(
                            Text::new(PlotPoint::new(x, y), format!("{v:.2}"))
                                .color(Color32::BLACK),
                        );
                    }
                }
            }
        });
}

/// Average sale price by year (rows) and month (columns).
pub fn price_heatmap(ui: &mut Ui, matrix: &PivotMatrix, height: f32) {
    let Some(range) = matrix.value_range() else {
        ui.label("No sales to show.");
        return;
    };
    ui.label(format!(
        "{} × {}, colour = mean {}  ({:.0} – {:.0})",
        matrix.row_key, matrix.column_key, matrix.value_field, range.0, range.1
    ));
    matrix_plot(
        ui,
        "price_heatmap",
        matrix.rows.iter().map(|v| v.to_string()).collect(),
        matrix.columns.iter().map(|v| v.to_string()).collect(),
        &matrix.cells,
        range,
        ColorScale::Spectral,
        false,
        height,
    );
}

/// Feature correlation heatmap with coefficients printed in the cells.
pub fn correlation_heatmap(ui: &mut Ui, corr: &CorrelationMatrix, height: f32) {
    matrix_plot(
        ui,
        "correlation_heatmap",
        corr.columns.clone(),
        corr.columns.clone(),
        &corr.values,
        (-1.0, 1.0),
        ColorScale::Spectral,
        corr.columns.len() <= 16,
        height.max(corr.columns.len() as f32 * 24.0),
    );
}

// ---------------------------------------------------------------------------
// Point clouds
// ---------------------------------------------------------------------------

fn bucket_of(value: f64, min: f64, max: f64) -> usize {
    if max <= min {
        return 0;
    }
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    ((t * COLOR_BUCKETS as f64) as usize).min(COLOR_BUCKETS - 1)
}

fn bucket_color(bucket: usize, scale: ColorScale) -> Color32 {
    scale.sample((bucket as f64 + 0.5) / COLOR_BUCKETS as f64)
}

/// Living area vs sale price, coloured by sale price.
pub fn living_area_scatter(ui: &mut Ui, points: &[ScatterPoint], height: f32) {
    let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.y), hi.max(p.y))
    });

    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); COLOR_BUCKETS];
    for p in points {
        buckets[bucket_of(p.y, min, max)].push([p.x, p.y]);
    }

    ui.label(format!("{} houses", points.len()));
    Plot::new("living_area_scatter")
        .height(height)
        .x_axis_label("Living Area (sqft)")
        .y_axis_label("Sale Price")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, series) in buckets.into_iter().enumerate() {
                if series.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(series)
                        .color(bucket_color(i, ColorScale::Spectral))
                        .radius(2.5),
                );
            }
        });
}

/// Sales at their neighbourhood coordinates; size and colour by price.
pub fn neighborhood_map(ui: &mut Ui, points: &[MapPoint], height: f32) {
    let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.sale_price), hi.max(p.sale_price))
    });

    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); COLOR_BUCKETS];
    for p in points {
        buckets[bucket_of(p.sale_price, min, max)].push([p.longitude, p.latitude]);
    }

    Plot::new("neighborhood_map")
        .height(height)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.35)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, series) in buckets.into_iter().enumerate() {
                if series.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(series)
                        .color(bucket_color(i, ColorScale::Viridis))
                        .radius(3.0 + i as f32 * 0.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

/// One box per category, outliers drawn as points.
pub fn category_boxplot(ui: &mut Ui, id: &str, data: &CategoryBoxes, y_label: &str, height: f32) {
    let labels: Vec<String> = data.boxes.iter().map(|(cat, _)| cat.to_string()).collect();
    let colors = ColorMap::new(&data.boxes.iter().map(|(cat, _)| cat.clone()).collect());

    let elems: Vec<BoxElem> = data
        .boxes
        .iter()
        .enumerate()
        .map(|(i, (cat, s))| {
            let color = colors.color_for(cat);
            BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(format!("{cat} (n={})", s.count))
            .fill(color.linear_multiply(0.35))
            .stroke(Stroke::new(1.5, color))
            .box_width(0.6)
        })
        .collect();

    let outliers: Vec<[f64; 2]> = data
        .boxes
        .iter()
        .enumerate()
        .flat_map(|(i, (_, s))| s.outliers.iter().map(move |&v| [i as f64, v]))
        .collect();

    Plot::new(id)
        .height(height)
        .x_axis_label(data.category.as_str())
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems));
            if !outliers.is_empty() {
                plot_ui.points(Points::new(outliers).color(Color32::DARK_GRAY).radius(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Horizontal bars, first row at the top.
pub fn ranking_bars(ui: &mut Ui, id: &str, rows: &[GroupRow], x_label: &str, height: f32) {
    let n = rows.len();
    let defined: Vec<f64> = rows.iter().filter_map(|r| r.value).collect();
    let min = defined.iter().copied().fold(f64::INFINITY, f64::min);
    let max = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let labels: Vec<String> = rows
        .iter()
        .rev()
        .map(|r| {
            r.key
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .collect();

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let v = r.value?;
            Some(
                Bar::new((n - 1 - i) as f64, v)
                    .name(&labels[n - 1 - i])
                    .fill(ColorScale::Spectral.map(v, min, max))
                    .width(0.8),
            )
        })
        .collect();

    Plot::new(id)
        .height(height.max(n as f32 * 16.0))
        .x_axis_label(x_label)
        .y_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Histogram bars spanning each bin.
pub fn histogram(ui: &mut Ui, id: &str, bins: &[HistogramBin], x_label: &str, height: f32) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .fill(HISTOGRAM_COLOR)
                .name(format!("{:.0} – {:.0}", b.start, b.end))
        })
        .collect();

    Plot::new(id)
        .height(height)
        .x_axis_label(x_label)
        .y_axis_label("Number of Properties")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(HISTOGRAM_COLOR));
        });
}

/// Vertical count bars with a legend, one per category.
pub fn count_bars(ui: &mut Ui, id: &str, rows: &[GroupRow], height: f32) {
    let keys: Vec<CellValue> = rows.iter().filter_map(|r| r.key.first().cloned()).collect();
    let colors = ColorMap::new(&keys.into_iter().collect());
    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, row) in rows.iter().enumerate() {
                let color = row
                    .key
                    .first()
                    .map_or(Color32::GRAY, |k| colors.color_for(k));
                let label = row
                    .key
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(" / ");
                let bar = Bar::new(i as f64, row.value.unwrap_or(0.0)).width(0.6);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(color));
            }
        });
}
