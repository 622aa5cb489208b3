//! One request/response function per dashboard chart.
//!
//! Each function borrows the loaded [`Dataset`], applies the current filter
//! values, and returns a plain payload the UI can draw. None of them keep
//! state between calls.

use std::collections::BTreeSet;

use crate::data::aggregate::{
    aggregate, aggregate_rows, require_column, require_numeric, AggregateError, AggregateResult,
    AggregationSpec, GroupRow, PivotMatrix,
};
use crate::data::derive::{LATITUDE, LONGITUDE, LOT_FRONTAGE_AVAILABLE, RENOVATED};
use crate::data::filter::{filtered_indices, DashboardFilter};
use crate::data::model::{CellValue, Dataset};
use crate::data::stats::{
    box_summaries_by, correlation_matrix, histogram, BoxSummary, CorrelationMatrix, HistogramBin,
};

pub const SALE_PRICE: &str = "SalePrice";
pub const LIVING_AREA: &str = "GrLivArea";
pub const NEIGHBORHOOD: &str = "Neighborhood";
pub const YEAR_BUILT: &str = "YearBuilt";
pub const OVERALL_QUAL: &str = "OverallQual";
pub const YEAR_SOLD: &str = "YrSold";
pub const MONTH_SOLD: &str = "MoSold";

/// Categorical columns that get their own sale-price box plot.
pub const CATEGORY_BOXPLOTS: &[(&str, &str)] = &[
    ("GarageType", "Garage Type"),
    ("BldgType", "Building Type"),
    ("HouseStyle", "House Style"),
];

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// A labelled box per category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBoxes {
    pub category: String,
    pub boxes: Vec<(CellValue, BoxSummary)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub sale_price: f64,
    pub neighborhood: String,
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Average sale price by year (rows) and month (columns) sold.
pub fn price_heatmap(dataset: &Dataset) -> AggregateResult<PivotMatrix> {
    let spec = AggregationSpec::mean(SALE_PRICE).pivot(YEAR_SOLD, MONTH_SOLD);
    aggregate(dataset, &spec)?
        .into_matrix()
        .ok_or(AggregateError::EmptyInput)
}

/// Living area against sale price, restricted to the selected
/// neighbourhoods (all when none is selected).
pub fn living_area_scatter(
    dataset: &Dataset,
    neighborhoods: &BTreeSet<String>,
) -> AggregateResult<Vec<ScatterPoint>> {
    require_numeric(dataset, LIVING_AREA)?;
    require_numeric(dataset, SALE_PRICE)?;
    let filter = DashboardFilter {
        neighborhoods: neighborhoods.clone(),
        max_year_built: None,
    };
    if !filter.neighborhoods.is_empty() {
        require_column(dataset, NEIGHBORHOOD)?;
    }

    Ok(filtered_indices(dataset, &filter)
        .into_iter()
        .filter_map(|i| {
            let rec = &dataset.records[i];
            Some(ScatterPoint {
                x: rec.get(LIVING_AREA).as_f64()?,
                y: rec.get(SALE_PRICE).as_f64()?,
            })
        })
        .collect())
}

/// Sale price per overall-quality grade for houses built in or before
/// `max_year_built`.
pub fn quality_boxplot(
    dataset: &Dataset,
    max_year_built: Option<i64>,
) -> AggregateResult<CategoryBoxes> {
    if max_year_built.is_some() {
        require_column(dataset, YEAR_BUILT)?;
    }
    let filter = DashboardFilter {
        max_year_built,
        ..DashboardFilter::default()
    };
    let rows = filtered_indices(dataset, &filter);
    Ok(CategoryBoxes {
        category: OVERALL_QUAL.to_string(),
        boxes: box_summaries_by(dataset, &rows, OVERALL_QUAL, SALE_PRICE)?,
    })
}

/// Mean sale price per neighbourhood, most expensive first.
pub fn neighborhood_ranking(dataset: &Dataset) -> AggregateResult<Vec<GroupRow>> {
    let spec = AggregationSpec::mean(SALE_PRICE).group_by([NEIGHBORHOOD]);
    let table = aggregate(dataset, &spec)?
        .into_table()
        .ok_or(AggregateError::EmptyInput)?;
    Ok(table.sorted_by_value_desc())
}

/// Sale price distribution per value of a categorical column.
pub fn category_boxplot(dataset: &Dataset, column: &str) -> AggregateResult<CategoryBoxes> {
    let rows: Vec<usize> = (0..dataset.len()).collect();
    Ok(CategoryBoxes {
        category: column.to_string(),
        boxes: box_summaries_by(dataset, &rows, column, SALE_PRICE)?,
    })
}

/// Sale price of renovated against never-remodelled houses.
pub fn renovation_boxplot(dataset: &Dataset) -> AggregateResult<CategoryBoxes> {
    category_boxplot(dataset, RENOVATED)
}

/// Sales placed at their neighbourhood's coordinates.
pub fn neighborhood_map(dataset: &Dataset) -> AggregateResult<Vec<MapPoint>> {
    if dataset.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    require_numeric(dataset, LATITUDE)?;
    require_numeric(dataset, LONGITUDE)?;
    require_numeric(dataset, SALE_PRICE)?;

    Ok(dataset
        .records
        .iter()
        .filter_map(|rec| {
            Some(MapPoint {
                latitude: rec.get(LATITUDE).as_f64()?,
                longitude: rec.get(LONGITUDE).as_f64()?,
                sale_price: rec.get(SALE_PRICE).as_f64()?,
                neighborhood: rec.get(NEIGHBORHOOD).to_string(),
            })
        })
        .collect())
}

/// Pearson correlation between all numeric columns.
pub fn correlation_heatmap(dataset: &Dataset) -> AggregateResult<CorrelationMatrix> {
    correlation_matrix(dataset)
}

/// Number of properties built per year, in `bins` equal-width bins.
pub fn year_built_histogram(dataset: &Dataset, bins: usize) -> AggregateResult<Vec<HistogramBin>> {
    if dataset.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    require_numeric(dataset, YEAR_BUILT)?;
    let years: Vec<f64> = dataset
        .records
        .iter()
        .filter_map(|r| r.get(YEAR_BUILT).as_f64())
        .collect();
    Ok(histogram(&years, bins))
}

/// How many sales report a lot frontage.
pub fn lot_frontage_counts(dataset: &Dataset) -> AggregateResult<Vec<GroupRow>> {
    let spec = AggregationSpec::count(LOT_FRONTAGE_AVAILABLE).group_by([LOT_FRONTAGE_AVAILABLE]);
    let rows: Vec<usize> = (0..dataset.len()).collect();
    Ok(aggregate_rows(dataset, &rows, &spec)?
        .into_table()
        .map(|t| t.rows)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::derive_columns;
    use crate::data::model::Record;

    #[allow(clippy::too_many_arguments)]
    fn sale(
        hood: &str,
        price: i64,
        area: i64,
        qual: i64,
        built: i64,
        remod: i64,
        sold: (i64, i64),
        garage: Option<&str>,
    ) -> Record {
        [
            (NEIGHBORHOOD, CellValue::from(hood)),
            (SALE_PRICE, price.into()),
            (LIVING_AREA, area.into()),
            (OVERALL_QUAL, qual.into()),
            (YEAR_BUILT, built.into()),
            ("YearRemodAdd", remod.into()),
            (YEAR_SOLD, sold.0.into()),
            (MONTH_SOLD, sold.1.into()),
            ("GarageType", garage.map_or(CellValue::Null, CellValue::from)),
            ("LotFrontage", if area > 1500 { CellValue::Integer(60) } else { CellValue::Null }),
        ]
        .into_iter()
        .collect()
    }

    fn houses() -> Dataset {
        derive_columns(&Dataset::from_records(vec![
            sale("CollgCr", 200_000, 1700, 7, 2003, 2003, (2008, 2), Some("Attchd")),
            sale("CollgCr", 220_000, 1800, 7, 2001, 2002, (2008, 2), Some("Attchd")),
            sale("OldTown", 120_000, 1200, 5, 1915, 1970, (2006, 5), Some("Detchd")),
            sale("NoRidge", 350_000, 2500, 9, 1995, 1995, (2007, 12), None),
        ]))
    }

    #[test]
    fn heatmap_pivots_year_by_month() {
        let m = price_heatmap(&houses()).unwrap();
        assert_eq!(m.rows.len(), 3);
        assert_eq!(m.columns.len(), 3);
        assert_eq!(
            m.cell(&CellValue::Integer(2008), &CellValue::Integer(2)),
            Some(210_000.0)
        );
        assert_eq!(m.cell(&CellValue::Integer(2008), &CellValue::Integer(5)), None);
    }

    #[test]
    fn scatter_respects_neighborhood_selection() {
        let ds = houses();
        assert_eq!(living_area_scatter(&ds, &BTreeSet::new()).unwrap().len(), 4);
        let selected = BTreeSet::from(["OldTown".to_string()]);
        let only = living_area_scatter(&ds, &selected).unwrap();
        assert_eq!(only, vec![ScatterPoint { x: 1200.0, y: 120_000.0 }]);
    }

    #[test]
    fn quality_boxes_respect_year_slider() {
        let ds = houses();
        let all = quality_boxplot(&ds, None).unwrap();
        assert_eq!(all.boxes.len(), 3);
        let old = quality_boxplot(&ds, Some(1999)).unwrap();
        let grades: Vec<CellValue> = old.boxes.iter().map(|b| b.0.clone()).collect();
        assert_eq!(grades, vec![CellValue::Integer(5), CellValue::Integer(9)]);
        assert_eq!(
            quality_boxplot(&ds, Some(1800)).unwrap_err(),
            AggregateError::EmptyInput
        );
    }

    #[test]
    fn ranking_is_descending() {
        let ranking = neighborhood_ranking(&houses()).unwrap();
        let order: Vec<String> = ranking.iter().map(|r| r.key[0].to_string()).collect();
        assert_eq!(order, vec!["NoRidge", "CollgCr", "OldTown"]);
        assert_eq!(ranking[1].value, Some(210_000.0));
    }

    #[test]
    fn category_boxes_skip_null_categories() {
        let garage = category_boxplot(&houses(), "GarageType").unwrap();
        assert_eq!(garage.boxes.len(), 2);
        assert_eq!(
            category_boxplot(&houses(), "HouseStyle").unwrap_err(),
            AggregateError::InvalidField("HouseStyle".into())
        );
    }

    #[test]
    fn renovation_boxes_split_on_remodel() {
        let boxes = renovation_boxplot(&houses()).unwrap().boxes;
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].0, CellValue::Bool(false));
        assert_eq!(boxes[0].1.count, 2);
    }

    #[test]
    fn map_points_carry_coordinates() {
        let points = neighborhood_map(&houses()).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[2].neighborhood, "OldTown");
        assert_eq!(points[2].latitude, 42.016);
    }

    #[test]
    fn correlation_covers_numeric_columns_only() {
        let corr = correlation_heatmap(&houses()).unwrap();
        assert!(corr.columns.iter().any(|c| c == SALE_PRICE));
        assert!(!corr.columns.iter().any(|c| c == NEIGHBORHOOD));
        assert!(corr.get(SALE_PRICE, LIVING_AREA).unwrap() > 0.9);
    }

    #[test]
    fn histogram_counts_every_house() {
        let bins = year_built_histogram(&houses(), 30).unwrap();
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn lot_frontage_availability() {
        let counts = lot_frontage_counts(&houses()).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].key, vec![CellValue::from("Available")]);
        assert_eq!(counts[0].value, Some(3.0));
        assert_eq!(counts[1].value, Some(1.0));
    }
}
