//! Group-by aggregation and pivot-to-matrix over a [`Dataset`].
//!
//! ```text
//!  Dataset ──(rows)──► partition by group keys ──► mean / count per partition
//!                                                   │
//!                       reshape requested? ─────────┤
//!                                                   ▼
//!                        GroupedTable  or  PivotMatrix (missing cells = None)
//! ```
//!
//! Records whose group key is null are dropped and null values are skipped,
//! matching `pandas.DataFrame.groupby(...)[col].mean()` / `.count()`.

use std::collections::BTreeMap;

use thiserror::Error;

use super::model::{CellValue, ColumnKind, Dataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Argument-validation failures. Nothing else can go wrong in an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// A named column does not exist in the dataset.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// The dataset (or the selected rows) contains no records.
    #[error("no records to aggregate")]
    EmptyInput,

    /// A numeric statistic was requested over a non-numeric column.
    #[error("field '{field}' is {kind}, expected numeric")]
    TypeMismatch { field: String, kind: ColumnKind },
}

pub type AggregateResult<T> = Result<T, AggregateError>;

// ---------------------------------------------------------------------------
// Specification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Mean,
    /// Number of non-null values.
    Count,
}

/// Row and column axes of a pivot matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reshape {
    pub row_key: String,
    pub column_key: String,
}

/// What to aggregate and how.
///
/// ```ignore
/// let by_hood = AggregationSpec::mean("SalePrice").group_by(["Neighborhood"]);
/// let heatmap = AggregationSpec::mean("SalePrice").pivot("YrSold", "MoSold");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSpec {
    group_keys: Vec<String>,
    value_field: String,
    function: AggregateFn,
    reshape: Option<Reshape>,
}

impl AggregationSpec {
    pub fn new(value_field: &str, function: AggregateFn) -> Self {
        AggregationSpec {
            group_keys: Vec::new(),
            value_field: value_field.to_string(),
            function,
            reshape: None,
        }
    }

    pub fn mean(value_field: &str) -> Self {
        Self::new(value_field, AggregateFn::Mean)
    }

    pub fn count(value_field: &str) -> Self {
        Self::new(value_field, AggregateFn::Count)
    }

    /// Partition by `keys` (flat table output). Clears any reshape.
    pub fn group_by<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_keys = keys.into_iter().map(Into::into).collect();
        self.reshape = None;
        self
    }

    /// Partition by `(row_key, column_key)` and reshape into a matrix.
    pub fn pivot(mut self, row_key: &str, column_key: &str) -> Self {
        self.group_keys = vec![row_key.to_string(), column_key.to_string()];
        self.reshape = Some(Reshape {
            row_key: row_key.to_string(),
            column_key: column_key.to_string(),
        });
        self
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One partition of a flat aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// One value per group key, in key order.
    pub key: Vec<CellValue>,
    /// The aggregate; `None` when a mean had nothing to average.
    pub value: Option<f64>,
    /// Number of non-null values that contributed.
    pub count: usize,
}

/// Flat aggregation output, rows in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedTable {
    pub keys: Vec<String>,
    pub value_field: String,
    pub function: AggregateFn,
    pub rows: Vec<GroupRow>,
}

impl GroupedTable {
    /// Aggregate for an exact key combination.
    pub fn get(&self, key: &[CellValue]) -> Option<f64> {
        self.rows
            .binary_search_by(|row| row.key.as_slice().cmp(key))
            .ok()
            .and_then(|i| self.rows[i].value)
    }

    /// Rows ordered by value descending; ties by key, missing values last.
    pub fn sorted_by_value_desc(&self) -> Vec<GroupRow> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| match (a.value, b.value) {
            (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.key.cmp(&b.key)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.key.cmp(&b.key),
        });
        rows
    }
}

/// Two-axis aggregation output. `cells[r][c]` is `None` when no record
/// matched `row_key = rows[r]` and `column_key = columns[c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    pub row_key: String,
    pub column_key: String,
    pub value_field: String,
    pub function: AggregateFn,
    pub rows: Vec<CellValue>,
    pub columns: Vec<CellValue>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotMatrix {
    pub fn cell(&self, row: &CellValue, column: &CellValue) -> Option<f64> {
        let r = self.rows.binary_search(row).ok()?;
        let c = self.columns.binary_search(column).ok()?;
        self.cells[r][c]
    }

    /// Smallest and largest defined cell, for colour scaling.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregationResult {
    Table(GroupedTable),
    Matrix(PivotMatrix),
}

impl AggregationResult {
    pub fn into_table(self) -> Option<GroupedTable> {
        match self {
            AggregationResult::Table(t) => Some(t),
            AggregationResult::Matrix(_) => None,
        }
    }

    pub fn into_matrix(self) -> Option<PivotMatrix> {
        match self {
            AggregationResult::Matrix(m) => Some(m),
            AggregationResult::Table(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate the whole dataset.
pub fn aggregate(dataset: &Dataset, spec: &AggregationSpec) -> AggregateResult<AggregationResult> {
    let rows: Vec<usize> = (0..dataset.len()).collect();
    aggregate_rows(dataset, &rows, spec)
}

/// Aggregate only the records at `rows` (e.g. the output of a filter).
pub fn aggregate_rows(
    dataset: &Dataset,
    rows: &[usize],
    spec: &AggregationSpec,
) -> AggregateResult<AggregationResult> {
    if rows.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    for key in &spec.group_keys {
        require_column(dataset, key)?;
    }
    if spec.function == AggregateFn::Mean {
        require_numeric(dataset, &spec.value_field)?;
    } else {
        require_column(dataset, &spec.value_field)?;
    }

    let partitions = partition(dataset, rows, spec);

    match &spec.reshape {
        None => {
            let rows = partitions
                .into_iter()
                .map(|(key, acc)| GroupRow {
                    key,
                    value: acc.finish(spec.function),
                    count: acc.count,
                })
                .collect();
            Ok(AggregationResult::Table(GroupedTable {
                keys: spec.group_keys.clone(),
                value_field: spec.value_field.clone(),
                function: spec.function,
                rows,
            }))
        }
        Some(reshape) => Ok(AggregationResult::Matrix(reshape_partitions(
            reshape,
            spec,
            partitions,
        ))),
    }
}

/// Fail with `InvalidField` unless `column` exists.
pub(crate) fn require_column(dataset: &Dataset, column: &str) -> AggregateResult<ColumnKind> {
    dataset
        .column_kind(column)
        .ok_or_else(|| AggregateError::InvalidField(column.to_string()))
}

/// Fail unless `column` exists and is numeric. An all-null column counts as
/// numeric: its mean is simply missing.
pub(crate) fn require_numeric(dataset: &Dataset, column: &str) -> AggregateResult<()> {
    match require_column(dataset, column)? {
        ColumnKind::Numeric | ColumnKind::Empty => Ok(()),
        kind => Err(AggregateError::TypeMismatch {
            field: column.to_string(),
            kind,
        }),
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn finish(&self, function: AggregateFn) -> Option<f64> {
        match function {
            AggregateFn::Count => Some(self.count as f64),
            AggregateFn::Mean if self.count == 0 => None,
            AggregateFn::Mean => Some(self.sum / self.count as f64),
        }
    }
}

/// Partition `rows` by group key. The `BTreeMap` yields keys ascending.
fn partition(
    dataset: &Dataset,
    rows: &[usize],
    spec: &AggregationSpec,
) -> BTreeMap<Vec<CellValue>, Accumulator> {
    let mut groups: BTreeMap<Vec<CellValue>, Accumulator> = BTreeMap::new();

    'records: for &idx in rows {
        let Some(record) = dataset.records.get(idx) else {
            continue;
        };
        let mut key = Vec::with_capacity(spec.group_keys.len());
        for col in &spec.group_keys {
            let val = record.get(col);
            if val.is_null() {
                continue 'records;
            }
            key.push(val.clone());
        }

        let acc = groups.entry(key).or_default();
        let val = record.get(&spec.value_field);
        if val.is_null() {
            continue;
        }
        acc.count += 1;
        if let Some(v) = val.as_f64() {
            acc.sum += v;
        }
    }
    groups
}

fn reshape_partitions(
    reshape: &Reshape,
    spec: &AggregationSpec,
    partitions: BTreeMap<Vec<CellValue>, Accumulator>,
) -> PivotMatrix {
    let mut row_labels: Vec<CellValue> = partitions.keys().map(|k| k[0].clone()).collect();
    row_labels.dedup();
    let mut col_labels: Vec<CellValue> = partitions.keys().map(|k| k[1].clone()).collect();
    col_labels.sort();
    col_labels.dedup();

    let mut cells = vec![vec![None; col_labels.len()]; row_labels.len()];
    for (key, acc) in &partitions {
        // Both label vectors were built from these keys.
        if let (Ok(r), Ok(c)) = (
            row_labels.binary_search(&key[0]),
            col_labels.binary_search(&key[1]),
        ) {
            cells[r][c] = acc.finish(spec.function);
        }
    }

    PivotMatrix {
        row_key: reshape.row_key.clone(),
        column_key: reshape.column_key.clone(),
        value_field: spec.value_field.clone(),
        function: spec.function,
        rows: row_labels,
        columns: col_labels,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn sale(hood: &str, price: f64) -> Record {
        [
            ("Neighborhood", CellValue::from(hood)),
            ("SalePrice", CellValue::from(price)),
        ]
        .into_iter()
        .collect()
    }

    fn sold(year: i64, month: i64, price: i64) -> Record {
        [
            ("YrSold", CellValue::Integer(year)),
            ("MoSold", CellValue::Integer(month)),
            ("SalePrice", CellValue::Integer(price)),
        ]
        .into_iter()
        .collect()
    }

    fn three_sales() -> Dataset {
        Dataset::from_records(vec![sale("A", 100.0), sale("A", 200.0), sale("B", 300.0)])
    }

    fn table(result: AggregationResult) -> GroupedTable {
        result.into_table().expect("flat table")
    }

    #[test]
    fn mean_by_neighborhood() {
        let spec = AggregationSpec::mean("SalePrice").group_by(["Neighborhood"]);
        let t = table(aggregate(&three_sales(), &spec).unwrap());
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.get(&["A".into()]), Some(150.0));
        assert_eq!(t.get(&["B".into()]), Some(300.0));
        assert_eq!(t.rows[0].key, vec![CellValue::from("A")]);
        assert_eq!(t.rows[0].count, 2);
    }

    #[test]
    fn output_is_in_ascending_key_order_regardless_of_input_order() {
        let ds = Dataset::from_records(vec![
            sale("C", 1.0),
            sale("A", 2.0),
            sale("B", 3.0),
            sale("A", 4.0),
        ]);
        let spec = AggregationSpec::count("SalePrice").group_by(["Neighborhood"]);
        let t = table(aggregate(&ds, &spec).unwrap());
        let keys: Vec<String> = t.rows.iter().map(|r| r.key[0].to_string()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(t.get(&["A".into()]), Some(2.0));
    }

    #[test]
    fn weighted_partition_means_equal_overall_mean() {
        let ds = Dataset::from_records(vec![
            sale("A", 120.0),
            sale("B", 80.0),
            sale("A", 310.5),
            sale("C", 42.0),
            sale("B", 99.0),
            sale("C", 7.25),
            sale("C", 1000.0),
        ]);
        let grouped = table(
            aggregate(&ds, &AggregationSpec::mean("SalePrice").group_by(["Neighborhood"])).unwrap(),
        );
        let overall = table(aggregate(&ds, &AggregationSpec::mean("SalePrice")).unwrap());

        let total: usize = grouped.rows.iter().map(|r| r.count).sum();
        let weighted: f64 = grouped
            .rows
            .iter()
            .map(|r| r.value.unwrap() * r.count as f64)
            .sum::<f64>()
            / total as f64;

        assert_eq!(overall.rows.len(), 1);
        assert!(overall.rows[0].key.is_empty());
        assert!((weighted - overall.rows[0].value.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let ds = three_sales();
        let spec = AggregationSpec::mean("SalePrice").group_by(["Neighborhood"]);
        assert_eq!(aggregate(&ds, &spec), aggregate(&ds, &spec));
    }

    #[test]
    fn single_record_gives_single_partition() {
        let ds = Dataset::from_records(vec![sale("A", 123.0)]);
        let spec = AggregationSpec::mean("SalePrice").group_by(["Neighborhood"]);
        let t = table(aggregate(&ds, &spec).unwrap());
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].value, Some(123.0));
    }

    #[test]
    fn pivot_marks_absent_pairs_missing() {
        let ds = Dataset::from_records(vec![
            sold(2006, 1, 100),
            sold(2006, 1, 300),
            sold(2006, 2, 50),
            sold(2007, 3, 70),
        ]);
        let spec = AggregationSpec::mean("SalePrice").pivot("YrSold", "MoSold");
        let m = aggregate(&ds, &spec).unwrap().into_matrix().expect("matrix");

        assert_eq!(m.rows, vec![CellValue::Integer(2006), CellValue::Integer(2007)]);
        assert_eq!(
            m.columns,
            vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)]
        );
        assert_eq!(m.cells[0], vec![Some(200.0), Some(50.0), None]);
        assert_eq!(m.cells[1], vec![None, None, Some(70.0)]);
        assert_eq!(m.value_range(), Some((50.0, 200.0)));

        // Every pair present in the data is a defined cell.
        for rec in &ds.records {
            assert!(m.cell(rec.get("YrSold"), rec.get("MoSold")).is_some());
        }
    }

    #[test]
    fn count_pivot_never_fills_zero() {
        let ds = Dataset::from_records(vec![sold(2006, 1, 1), sold(2007, 2, 1)]);
        let spec = AggregationSpec::count("SalePrice").pivot("YrSold", "MoSold");
        let m = aggregate(&ds, &spec).unwrap().into_matrix().unwrap();
        assert_eq!(m.cells, vec![vec![Some(1.0), None], vec![None, Some(1.0)]]);
    }

    #[test]
    fn null_keys_are_dropped_and_null_values_skipped() {
        let mut missing_hood = sale("A", 500.0);
        missing_hood.fields.insert("Neighborhood".into(), CellValue::Null);
        let mut missing_price = sale("A", 0.0);
        missing_price.fields.insert("SalePrice".into(), CellValue::Null);

        let ds = Dataset::from_records(vec![sale("A", 10.0), missing_hood, missing_price]);
        let t = table(
            aggregate(&ds, &AggregationSpec::mean("SalePrice").group_by(["Neighborhood"])).unwrap(),
        );
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].value, Some(10.0));
        assert_eq!(t.rows[0].count, 1);
    }

    #[test]
    fn unknown_field_is_reported() {
        let spec = AggregationSpec::mean("SalePrice").group_by(["Foo"]);
        assert_eq!(
            aggregate(&three_sales(), &spec),
            Err(AggregateError::InvalidField("Foo".into()))
        );
        let spec = AggregationSpec::mean("Foo");
        assert_eq!(
            aggregate(&three_sales(), &spec),
            Err(AggregateError::InvalidField("Foo".into()))
        );
    }

    #[test]
    fn empty_input_is_reported() {
        let spec = AggregationSpec::mean("SalePrice");
        assert_eq!(
            aggregate(&Dataset::default(), &spec),
            Err(AggregateError::EmptyInput)
        );
        assert_eq!(
            aggregate_rows(&three_sales(), &[], &spec),
            Err(AggregateError::EmptyInput)
        );
    }

    #[test]
    fn mean_over_text_is_a_type_mismatch() {
        let spec = AggregationSpec::mean("Neighborhood");
        let err = aggregate(&three_sales(), &spec).unwrap_err();
        assert_eq!(
            err,
            AggregateError::TypeMismatch {
                field: "Neighborhood".into(),
                kind: ColumnKind::Text,
            }
        );
        assert!(err.to_string().contains("Neighborhood"));

        // Counting text is fine.
        let spec = AggregationSpec::count("Neighborhood").group_by(["Neighborhood"]);
        assert!(aggregate(&three_sales(), &spec).is_ok());
    }

    #[test]
    fn aggregate_rows_only_sees_selected_records() {
        let spec = AggregationSpec::mean("SalePrice").group_by(["Neighborhood"]);
        let t = table(aggregate_rows(&three_sales(), &[1, 2], &spec).unwrap());
        assert_eq!(t.get(&["A".into()]), Some(200.0));
        assert_eq!(t.get(&["B".into()]), Some(300.0));
    }

    #[test]
    fn sorted_by_value_desc_puts_missing_last() {
        let t = GroupedTable {
            keys: vec!["k".into()],
            value_field: "v".into(),
            function: AggregateFn::Mean,
            rows: vec![
                GroupRow { key: vec!["a".into()], value: Some(1.0), count: 1 },
                GroupRow { key: vec!["b".into()], value: None, count: 0 },
                GroupRow { key: vec!["c".into()], value: Some(5.0), count: 1 },
            ],
        };
        let order: Vec<String> = t
            .sorted_by_value_desc()
            .iter()
            .map(|r| r.key[0].to_string())
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
