use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::charts::CATEGORY_BOXPLOTS;
use crate::data::aggregate::GroupRow;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – every chart, top to bottom
// ---------------------------------------------------------------------------

/// Render the scrollable chart column.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(charts) = &state.charts else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore sales  (File → Open…)");
        });
        return;
    };
    let h = state.config.chart_height;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            plot::section(ui, "SalePrice Over Time (Year vs. Month)", &charts.heatmap, |ui, m| {
                plot::price_heatmap(ui, m, h)
            });

            plot::section(ui, "Living Area vs. SalePrice", &charts.scatter, |ui, pts| {
                plot::living_area_scatter(ui, pts, h)
            });

            plot::section(ui, "Overall Quality vs. SalePrice", &charts.quality, |ui, boxes| {
                if let Some(year) = state.filter.max_year_built {
                    ui.label(format!("Houses built in or before {year}"));
                }
                plot::category_boxplot(ui, "quality_boxplot", boxes, "Sale Price", h)
            });

            plot::section(ui, "Average SalePrice by Neighborhood", &charts.ranking, |ui, rows| {
                plot::ranking_bars(ui, "neighborhood_bar_chart", rows, "Average SalePrice", h);
                ui.collapsing("Table", |ui: &mut Ui| ranking_table(ui, rows));
            });

            for ((column, result), (_, label)) in charts.categories.iter().zip(CATEGORY_BOXPLOTS) {
                let title = format!("SalePrice Distribution by {label}");
                plot::section(ui, &title, result, |ui, boxes| {
                    plot::category_boxplot(ui, &format!("{column}_boxplot"), boxes, "Sale Price", h)
                });
            }

            plot::section(ui, "Price Impact of Renovations", &charts.renovation, |ui, boxes| {
                plot::category_boxplot(ui, "renovation_boxplot", boxes, "Sale Price", h)
            });

            plot::section(ui, "Neighborhood Map", &charts.map, |ui, pts| {
                plot::neighborhood_map(ui, pts, h)
            });

            plot::section(ui, "Correlation Heatmap", &charts.correlation, |ui, corr| {
                plot::correlation_heatmap(ui, corr, h)
            });

            plot::section(ui, "Number of Properties Built Per Year", &charts.year_built, |ui, bins| {
                plot::histogram(ui, "year_built_histogram", bins, "Year Built", h)
            });

            plot::section(ui, "Lot Frontage Availability", &charts.lot_frontage, |ui, rows| {
                plot::count_bars(ui, "lot_frontage_counts", rows, h * 0.6)
            });
        });
}

/// Neighbourhood, mean price and sale count, in ranking order.
fn ranking_table(ui: &mut Ui, rows: &[GroupRow]) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Neighborhood");
            });
            header.col(|ui| {
                ui.strong("Average SalePrice");
            });
            header.col(|ui| {
                ui.strong("Sales");
            });
        })
        .body(|mut body| {
            for row in rows {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(row.key.first().map(|k| k.to_string()).unwrap_or_default());
                    });
                    table_row.col(|ui| {
                        ui.label(row.value.map_or("-".to_string(), |v| format!("{v:.0}")));
                    });
                    table_row.col(|ui| {
                        ui.label(row.count.to_string());
                    });
                });
            }
        });
}
