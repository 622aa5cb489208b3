use std::collections::BTreeSet;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Dashboard filter: neighbourhood multi-select + "built in or before" slider
// ---------------------------------------------------------------------------

/// The interactive selections the charts react to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    /// Selected neighbourhood codes. Empty means "no filter" (show all).
    pub neighborhoods: BTreeSet<String>,
    /// Keep houses with `YearBuilt <= max_year_built`.
    pub max_year_built: Option<i64>,
}

impl DashboardFilter {
    /// Neighbourhood constraint only.
    pub fn neighborhoods<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DashboardFilter {
            neighborhoods: codes.into_iter().map(Into::into).collect(),
            max_year_built: None,
        }
    }

    /// Year constraint only.
    pub fn built_by(year: i64) -> Self {
        DashboardFilter {
            neighborhoods: BTreeSet::new(),
            max_year_built: Some(year),
        }
    }

    /// Toggle one neighbourhood in the multi-select.
    pub fn toggle_neighborhood(&mut self, code: &str) {
        if !self.neighborhoods.remove(code) {
            self.neighborhoods.insert(code.to_string());
        }
    }
}

/// Return indices of records that pass all active constraints, in source
/// order.
///
/// A record passes when:
/// * no neighbourhood is selected, or its `Neighborhood` is one of them;
/// * no year is set, or its `YearBuilt` is known and `<=` the year.
pub fn filtered_indices(dataset: &Dataset, filter: &DashboardFilter) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            if !filter.neighborhoods.is_empty() {
                match rec.get("Neighborhood").as_str() {
                    Some(code) if filter.neighborhoods.contains(code) => {}
                    _ => return false,
                }
            }
            if let Some(max_year) = filter.max_year_built {
                match rec.get("YearBuilt").as_i64() {
                    Some(year) if year <= max_year => {}
                    _ => return false,
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

/// Oldest and newest `YearBuilt`, the bounds of the year slider.
pub fn year_built_range(dataset: &Dataset) -> Option<(i64, i64)> {
    dataset
        .records
        .iter()
        .filter_map(|r| r.get("YearBuilt").as_i64())
        .fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
}
