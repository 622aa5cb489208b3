use std::path::Path;

use crate::charts::{self, CategoryBoxes, MapPoint, ScatterPoint, CATEGORY_BOXPLOTS};
use crate::config::DashboardConfig;
use crate::data::aggregate::{AggregateResult, GroupRow, PivotMatrix};
use crate::data::derive::derive_columns;
use crate::data::filter::{year_built_range, DashboardFilter};
use crate::data::model::Dataset;
use crate::data::stats::{CorrelationMatrix, HistogramBin};

// ---------------------------------------------------------------------------
// Cached chart payloads
// ---------------------------------------------------------------------------

/// Everything the central panel draws. Charts that do not depend on a
/// filter are computed once per dataset; the others on filter change.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub heatmap: AggregateResult<PivotMatrix>,
    pub scatter: AggregateResult<Vec<ScatterPoint>>,
    pub quality: AggregateResult<CategoryBoxes>,
    pub ranking: AggregateResult<Vec<GroupRow>>,
    pub categories: Vec<(&'static str, AggregateResult<CategoryBoxes>)>,
    pub renovation: AggregateResult<CategoryBoxes>,
    pub map: AggregateResult<Vec<MapPoint>>,
    pub correlation: AggregateResult<CorrelationMatrix>,
    pub year_built: AggregateResult<Vec<HistogramBin>>,
    pub lot_frontage: AggregateResult<Vec<GroupRow>>,
}

impl ChartData {
    fn compute(dataset: &Dataset, filter: &DashboardFilter, histogram_bins: usize) -> Self {
        ChartData {
            heatmap: charts::price_heatmap(dataset),
            scatter: charts::living_area_scatter(dataset, &filter.neighborhoods),
            quality: charts::quality_boxplot(dataset, filter.max_year_built),
            ranking: charts::neighborhood_ranking(dataset),
            categories: CATEGORY_BOXPLOTS
                .iter()
                .map(|&(column, _)| (column, charts::category_boxplot(dataset, column)))
                .collect(),
            renovation: charts::renovation_boxplot(dataset),
            map: charts::neighborhood_map(dataset),
            correlation: charts::correlation_heatmap(dataset),
            year_built: charts::year_built_histogram(dataset, histogram_bins),
            lot_frontage: charts::lot_frontage_counts(dataset),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset with derived columns (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current widget selections.
    pub filter: DashboardFilter,

    /// Bounds of the year slider.
    pub year_range: Option<(i64, i64)>,

    /// Payloads for the current dataset and filter.
    pub charts: Option<ChartData>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            filter: DashboardFilter::default(),
            year_range: None,
            charts: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset: derive columns, reset filters, compute
    /// every chart.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let dataset = derive_columns(&dataset);
        self.year_range = year_built_range(&dataset);
        self.filter = DashboardFilter {
            neighborhoods: Default::default(),
            max_year_built: self.year_range.map(|(_, hi)| hi),
        };
        self.charts = Some(ChartData::compute(
            &dataset,
            &self.filter,
            self.config.histogram_bins,
        ));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Load `path` and ingest it, reporting failures in the status line.
    pub fn open(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records with columns {:?}",
                    dataset.len(),
                    dataset.column_names
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the filter-dependent charts after a widget change.
    pub fn refilter(&mut self) {
        let (Some(ds), Some(cached)) = (&self.dataset, &mut self.charts) else {
            return;
        };
        log::debug!("refilter: {:?}", self.filter);
        cached.scatter = charts::living_area_scatter(ds, &self.filter.neighborhoods);
        cached.quality = charts::quality_boxplot(ds, self.filter.max_year_built);
    }

    /// Toggle a neighbourhood in the scatter-plot multi-select.
    pub fn toggle_neighborhood(&mut self, code: &str) {
        self.filter.toggle_neighborhood(code);
        self.refilter();
    }

    /// Clear the neighbourhood multi-select (show all).
    pub fn clear_neighborhoods(&mut self) {
        self.filter.neighborhoods.clear();
        self.refilter();
    }

    /// Move the "built in or before" slider.
    pub fn set_max_year_built(&mut self, year: i64) {
        if self.filter.max_year_built != Some(year) {
            self.filter.max_year_built = Some(year);
            self.refilter();
        }
    }
}
