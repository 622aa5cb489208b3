use super::aggregate::{require_column, require_numeric, AggregateError, AggregateResult};
use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pearson correlation between every pair of numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Numeric columns in source order; labels both axes.
    pub columns: Vec<String>,
    /// `values[i][j]` is `None` when fewer than two complete pairs exist or
    /// one side has zero variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Correlation over all numeric columns using pairwise-complete observations,
/// like `DataFrame.corr()`.
pub fn correlation_matrix(dataset: &Dataset) -> AggregateResult<CorrelationMatrix> {
    if dataset.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    let columns: Vec<String> = dataset
        .numeric_columns()
        .into_iter()
        .map(String::from)
        .collect();

    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|col| dataset.records.iter().map(|r| r.get(col).as_f64()).collect())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    log::debug!("correlation matrix over {n} numeric columns");
    Ok(CorrelationMatrix { columns, values })
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Box-plot summaries
// ---------------------------------------------------------------------------

/// Five-number summary plus outliers, Tukey style.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Values beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
    pub count: usize,
}

/// Quartiles by linear interpolation; whiskers stop at the furthest value
/// within 1.5 × IQR of the box.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= lo_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= hi_fence)
        .unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lower_whisker || v > upper_whisker)
        .collect();

    Some(BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
        count: sorted.len(),
    })
}

/// `q`-quantile of an ascending, non-empty slice (linear interpolation).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// One box per distinct value of `category` among `rows`, ascending.
/// Categories whose rows carry no numeric `value` are omitted.
pub fn box_summaries_by(
    dataset: &Dataset,
    rows: &[usize],
    category: &str,
    value: &str,
) -> AggregateResult<Vec<(CellValue, BoxSummary)>> {
    if rows.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    require_column(dataset, category)?;
    require_numeric(dataset, value)?;

    let mut groups: std::collections::BTreeMap<CellValue, Vec<f64>> = Default::default();
    for rec in rows.iter().filter_map(|&i| dataset.records.get(i)) {
        let cat = rec.get(category);
        if cat.is_null() {
            continue;
        }
        let entry = groups.entry(cat.clone()).or_default();
        if let Some(v) = rec.get(value).as_f64() {
            entry.push(v);
        }
    }

    Ok(groups
        .into_iter()
        .filter_map(|(cat, vals)| box_summary(&vals).map(|s| (cat, s)))
        .collect())
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub start: f64,
    /// Exclusive upper edge (inclusive for the last bin).
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram across `[min, max]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: if i + 1 == bins { max } else { min + (i + 1) as f64 * width },
            count,
        })
        .collect()
}
