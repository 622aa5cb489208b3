use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the housing table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes found in the source CSV.
///
/// Integers and floats share one numeric ordering so that a column mixing
/// `3` and `2.5` still sorts the way a reader expects on a chart axis.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

static NULL: CellValue = CellValue::Null;

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)),
            (String(a), String(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            CellValue::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            // Numerics hash through their f64 bits so `Integer(2) == Float(2.0)`
            // hash identically.
            CellValue::Integer(i) => {
                2u8.hash(state);
                (*i as f64).to_bits().hash(state);
            }
            CellValue::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            CellValue::Null => 0u8.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(v)
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl CellValue {
    /// Interpret the value as an `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single house sale (one row of the source CSV).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// column_name → value. Absent columns read as [`CellValue::Null`].
    pub fields: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(fields: BTreeMap<String, CellValue>) -> Self {
        Record { fields }
    }

    /// Value of `column`, or `Null` when the record does not carry it.
    pub fn get(&self, column: &str) -> &CellValue {
        self.fields.get(column).unwrap_or(&NULL)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – inferred column type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-null cell is an integer or a float.
    Numeric,
    Boolean,
    /// Strings, or a mix of kinds.
    Text,
    /// Only nulls.
    Empty,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
            ColumnKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// A `Dataset` is never mutated after construction; derivations build a new
/// one and every chart borrows it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All house sales (rows).
    pub records: Vec<Record>,
    /// Column names in source order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
    kinds: BTreeMap<String, ColumnKind>,
}

impl Dataset {
    /// Build a dataset with an explicit column order. Columns found in the
    /// records but missing from `column_names` are appended alphabetically.
    pub fn new(column_names: Vec<String>, records: Vec<Record>) -> Self {
        let mut column_names = column_names;
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = column_names
            .iter()
            .map(|c| (c.clone(), BTreeSet::new()))
            .collect();

        for rec in &records {
            for (col, val) in &rec.fields {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        for col in unique_values.keys() {
            if !column_names.contains(col) {
                column_names.push(col.clone());
            }
        }

        let kinds = unique_values
            .iter()
            .map(|(col, vals)| (col.clone(), infer_kind(vals)))
            .collect();

        Dataset {
            records,
            column_names,
            unique_values,
            kinds,
        }
    }

    /// Build a dataset whose column order is the sorted union of record keys.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(Vec::new(), records)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.kinds.contains_key(column)
    }

    /// Inferred type of `column`, `None` when the column does not exist.
    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.kinds.get(column).copied()
    }

    /// Numeric columns in source order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.column_names
            .iter()
            .filter(|c| self.column_kind(c) == Some(ColumnKind::Numeric))
            .map(String::as_str)
            .collect()
    }

    /// Distinct non-null values of `column`, ascending.
    pub fn categories(&self, column: &str) -> Vec<CellValue> {
        self.unique_values
            .get(column)
            .map(|vals| vals.iter().filter(|v| !v.is_null()).cloned().collect())
            .unwrap_or_default()
    }

    /// Return a new dataset with `column` appended (or replaced) using one
    /// value per record.
    pub fn with_column(&self, column: &str, values: Vec<CellValue>) -> Dataset {
        debug_assert_eq!(values.len(), self.records.len());
        let records = self
            .records
            .iter()
            .zip(values)
            .map(|(rec, val)| {
                let mut fields = rec.fields.clone();
                fields.insert(column.to_string(), val);
                Record { fields }
            })
            .collect();

        let mut column_names = self.column_names.clone();
        if !column_names.iter().any(|c| c == column) {
            column_names.push(column.to_string());
        }
        Dataset::new(column_names, records)
    }
}

fn infer_kind(values: &BTreeSet<CellValue>) -> ColumnKind {
    let mut kind = ColumnKind::Empty;
    for val in values {
        let this = match val {
            CellValue::Null => continue,
            CellValue::Integer(_) | CellValue::Float(_) => ColumnKind::Numeric,
            CellValue::Bool(_) => ColumnKind::Boolean,
            CellValue::String(_) => ColumnKind::Text,
        };
        kind = match kind {
            ColumnKind::Empty => this,
            k if k == this => k,
            _ => return ColumnKind::Text,
        };
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, CellValue)]) -> Record {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn integers_and_floats_share_an_ordering() {
        let mut vals = vec![
            CellValue::Float(2.5),
            CellValue::Integer(3),
            CellValue::Integer(1),
            CellValue::Null,
            CellValue::from("A"),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                CellValue::Null,
                CellValue::Integer(1),
                CellValue::Float(2.5),
                CellValue::Integer(3),
                CellValue::from("A"),
            ]
        );
        assert_eq!(CellValue::Integer(2), CellValue::Float(2.0));
    }

    #[test]
    fn column_kinds_are_inferred() {
        let ds = Dataset::from_records(vec![
            rec(&[
                ("price", CellValue::Integer(10)),
                ("hood", "A".into()),
                ("mixed", CellValue::Integer(1)),
                ("flag", CellValue::Bool(true)),
                ("gone", CellValue::Null),
            ]),
            rec(&[
                ("price", CellValue::Float(12.5)),
                ("hood", CellValue::Null),
                ("mixed", "x".into()),
                ("flag", CellValue::Bool(false)),
                ("gone", CellValue::Null),
            ]),
        ]);
        assert_eq!(ds.column_kind("price"), Some(ColumnKind::Numeric));
        assert_eq!(ds.column_kind("hood"), Some(ColumnKind::Text));
        assert_eq!(ds.column_kind("mixed"), Some(ColumnKind::Text));
        assert_eq!(ds.column_kind("flag"), Some(ColumnKind::Boolean));
        assert_eq!(ds.column_kind("gone"), Some(ColumnKind::Empty));
        assert_eq!(ds.column_kind("nope"), None);
        assert_eq!(ds.categories("hood"), vec![CellValue::from("A")]);
    }

    #[test]
    fn explicit_column_order_is_kept() {
        let ds = Dataset::new(
            vec!["b".into(), "a".into()],
            vec![rec(&[("a", 1i64.into()), ("b", 2i64.into()), ("c", 3i64.into())])],
        );
        assert_eq!(ds.column_names, vec!["b", "a", "c"]);
        assert_eq!(ds.numeric_columns(), vec!["b", "a", "c"]);
    }

    #[test]
    fn with_column_leaves_source_untouched() {
        let ds = Dataset::from_records(vec![rec(&[("a", 1i64.into())])]);
        let derived = ds.with_column("b", vec![CellValue::Bool(true)]);
        assert!(!ds.has_column("b"));
        assert_eq!(derived.records[0].get("b"), &CellValue::Bool(true));
        assert_eq!(derived.records[0].get("zzz"), &CellValue::Null);
    }
}
