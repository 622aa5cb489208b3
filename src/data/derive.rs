//! Columns computed once after loading.

use super::model::{CellValue, Dataset};

pub const LOT_FRONTAGE_AVAILABLE: &str = "LotFrontageAvailable";
pub const RENOVATED: &str = "Renovated";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

/// Approximate (latitude, longitude) per Ames neighbourhood code.
///
/// Mock coordinates for the map view; one entry per code.
pub const NEIGHBORHOOD_COORDINATES: &[(&str, f64, f64)] = &[
    ("Blmngtn", 42.062, -93.690),
    ("Blueste", 42.065, -93.700),
    ("BrkSide", 42.012, -93.620),
    ("ClearCr", 42.045, -93.670),
    ("CollgCr", 42.025, -93.655),
    ("Crawfor", 42.022, -93.670),
    ("Edwards", 42.017, -93.640),
    ("Gilbert", 42.080, -93.750),
    ("IDOTRR", 42.007, -93.610),
    ("MeadowV", 42.010, -93.600),
    ("Mitchel", 42.018, -93.685),
    ("NAmes", 42.053, -93.675),
    ("NoRidge", 42.050, -93.635),
    ("NPkVill", 42.036, -93.665),
    ("NridgHt", 42.054, -93.640),
    ("NWAmes", 42.040, -93.680),
    ("OldTown", 42.016, -93.630),
    ("SWISU", 42.013, -93.620),
    ("Sawyer", 42.025, -93.625),
    ("SawyerW", 42.028, -93.645),
    ("Somerst", 42.031, -93.645),
    ("StoneBr", 42.055, -93.630),
    ("Timber", 42.042, -93.690),
    ("Veenker", 42.030, -93.650),
];

pub fn neighborhood_coordinates(code: &str) -> Option<(f64, f64)> {
    NEIGHBORHOOD_COORDINATES
        .iter()
        .find(|(name, _, _)| *name == code)
        .map(|&(_, lat, lon)| (lat, lon))
}

/// Add `LotFrontageAvailable`, `Renovated`, `Latitude` and `Longitude`.
///
/// Returns a new dataset; the input is left as loaded. A missing source
/// column only yields nulls in the columns that depend on it.
pub fn derive_columns(dataset: &Dataset) -> Dataset {
    let has_frontage = dataset.has_column("LotFrontage");
    let frontage: Vec<CellValue> = dataset
        .records
        .iter()
        .map(|r| {
            if !has_frontage {
                CellValue::Null
            } else if r.get("LotFrontage").is_null() {
                "Missing".into()
            } else {
                "Available".into()
            }
        })
        .collect();

    let renovated: Vec<CellValue> = dataset
        .records
        .iter()
        .map(|r| match (r.get("YearBuilt"), r.get("YearRemodAdd")) {
            (built, remod) if built.is_null() || remod.is_null() => CellValue::Null,
            (built, remod) => CellValue::Bool(built != remod),
        })
        .collect();

    let coords: Vec<Option<(f64, f64)>> = dataset
        .records
        .iter()
        .map(|r| r.get("Neighborhood").as_str().and_then(neighborhood_coordinates))
        .collect();
    let latitude = coords
        .iter()
        .map(|c| c.map_or(CellValue::Null, |(lat, _)| CellValue::Float(lat)))
        .collect();
    let longitude = coords
        .iter()
        .map(|c| c.map_or(CellValue::Null, |(_, lon)| CellValue::Float(lon)))
        .collect();

    let unmapped = coords.iter().filter(|c| c.is_none()).count();
    if unmapped > 0 {
        log::warn!("{unmapped} records have no known neighborhood coordinates");
    }

    dataset
        .with_column(LOT_FRONTAGE_AVAILABLE, frontage)
        .with_column(RENOVATED, renovated)
        .with_column(LATITUDE, latitude)
        .with_column(LONGITUDE, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn house(hood: &str, built: i64, remod: i64, frontage: CellValue) -> Record {
        [
            ("Neighborhood", CellValue::from(hood)),
            ("YearBuilt", built.into()),
            ("YearRemodAdd", remod.into()),
            ("LotFrontage", frontage),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn derived_columns_follow_source_values() {
        let ds = Dataset::from_records(vec![
            house("CollgCr", 2003, 2003, CellValue::Integer(65)),
            house("OldTown", 1915, 1970, CellValue::Null),
            house("Nowhere", 2000, 2001, CellValue::Float(70.0)),
        ]);
        let out = derive_columns(&ds);

        assert_eq!(out.records[0].get(RENOVATED), &CellValue::Bool(false));
        assert_eq!(out.records[1].get(RENOVATED), &CellValue::Bool(true));
        assert_eq!(out.records[0].get(LOT_FRONTAGE_AVAILABLE), &CellValue::from("Available"));
        assert_eq!(out.records[1].get(LOT_FRONTAGE_AVAILABLE), &CellValue::from("Missing"));
        assert_eq!(out.records[0].get(LATITUDE), &CellValue::Float(42.025));
        assert_eq!(out.records[0].get(LONGITUDE), &CellValue::Float(-93.655));
        assert_eq!(out.records[2].get(LATITUDE), &CellValue::Null);

        // The source dataset is not touched.
        assert!(!ds.has_column(RENOVATED));
        assert_eq!(out.len(), ds.len());
    }

    #[test]
    fn coordinate_table_has_unique_codes() {
        let mut codes: Vec<&str> = NEIGHBORHOOD_COORDINATES.iter().map(|c| c.0).collect();
        let n = codes.len();
        codes.sort_unstable_by_key(|c| c.to_ascii_lowercase());
        codes.dedup_by_key(|c| c.to_ascii_lowercase());
        assert_eq!(codes.len(), n);
        assert_eq!(neighborhood_coordinates("Names"), None);
    }

    #[test]
    fn missing_source_columns_yield_nulls() {
        let ds = Dataset::from_records(vec![[("SalePrice", 1i64)].into_iter().collect()]);
        let out = derive_columns(&ds);
        assert_eq!(out.records[0].get(LOT_FRONTAGE_AVAILABLE), &CellValue::Null);
        assert_eq!(out.records[0].get(RENOVATED), &CellValue::Null);
        assert!(out.has_column(LATITUDE));
    }
}
