//! # Tables
//!
//! In-memory tabular data as it flows through the analysis: named, typed
//! columns plus a row index. A fresh table is keyed by row position; once key
//! columns are moved into the index they stop being ordinary columns.
//!
//! Numeric columns store `f64` and use NaN for missing cells. Categorical
//! columns store `Option<String>`.

use crate::error::{AnalysisError, Result};
use std::collections::HashSet;
use std::fmt;

mod feature;

pub use feature::FeatureMatrix;

/// A single table cell.
#[derive(Debug, Clone)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Number(v) => v.is_nan(),
            Cell::Text(_) => false,
            Cell::Missing => true,
        }
    }

    fn fingerprint(&self) -> CellFingerprint {
        match self {
            Cell::Number(v) if v.is_nan() => CellFingerprint::Missing,
            // -0.0 and 0.0 compare equal
            Cell::Number(v) if *v == 0.0 => CellFingerprint::Number(0.0f64.to_bits()),
            Cell::Number(v) => CellFingerprint::Number(v.to_bits()),
            Cell::Text(s) => CellFingerprint::Text(s.clone()),
            Cell::Missing => CellFingerprint::Missing,
        }
    }
}

/// Missing cells are equal to each other, which is what deduplication needs.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) if v.is_nan() => write!(f, "NaN"),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Number(v) => write!(f, "{:.4}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => write!(f, "NaN"),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellFingerprint {
    Number(u64),
    Text(String),
    Missing,
}

/// Column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell(&self, row: usize) -> Cell {
        match self {
            ColumnData::Numeric(values) if values[row].is_nan() => Cell::Missing,
            ColumnData::Numeric(values) => Cell::Number(values[row]),
            ColumnData::Categorical(values) => match &values[row] {
                Some(s) => Cell::Text(s.clone()),
                None => Cell::Missing,
            },
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.iter().filter(|v| v.is_nan()).count(),
            ColumnData::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    fn select(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(rows.iter().map(|&i| values[i]).collect())
            }
            ColumnData::Categorical(values) => {
                ColumnData::Categorical(rows.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self::new(
            name,
            ColumnData::Categorical(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Categorical(_) => None,
        }
    }
}

/// Row key of a table. `names` is empty for the positional index.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIndex {
    names: Vec<String>,
    labels: Vec<Vec<Cell>>,
}

impl RowIndex {
    /// Positions `0..n_rows`.
    pub fn positional(n_rows: usize) -> Self {
        Self {
            names: Vec::new(),
            labels: (0..n_rows).map(|i| vec![Cell::Number(i as f64)]).collect(),
        }
    }

    pub fn new(names: Vec<String>, labels: Vec<Vec<Cell>>) -> Result<Self> {
        let width = names.len().max(1);
        if let Some((row, label)) = labels.iter().enumerate().find(|(_, l)| l.len() != width) {
            return Err(AnalysisError::Schema(format!(
                "index label at row {} has {} parts, expected {}",
                row,
                label.len(),
                width
            )));
        }
        Ok(Self { names, labels })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn labels(&self) -> &[Vec<Cell>] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_positional(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a named index level.
    pub fn level(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn is_unique(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.labels.len());
        self.labels.iter().all(|label| {
            let fingerprint: Vec<CellFingerprint> = label.iter().map(Cell::fingerprint).collect();
            seen.insert(fingerprint)
        })
    }

    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            labels: rows.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }

    pub(crate) fn format_label(&self, row: usize) -> String {
        self.labels[row]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Ordered named columns sharing one row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    index: RowIndex,
}

impl Table {
    /// Builds a table keyed by row position.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        Self::with_index(columns, RowIndex::positional(n_rows))
    }

    pub fn with_index(columns: Vec<Column>, index: RowIndex) -> Result<Self> {
        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !names.insert(column.name()) {
                return Err(AnalysisError::Schema(format!(
                    "duplicate column '{}'",
                    column.name()
                )));
            }
            if column.len() != index.len() {
                return Err(AnalysisError::Schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    index.len()
                )));
            }
        }
        Ok(Self { columns, index })
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn row(&self, row: usize) -> Vec<Cell> {
        self.columns.iter().map(|c| c.data().cell(row)).collect()
    }

    /// Total number of missing cells across all columns.
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(|c| c.data().missing_count()).sum()
    }

    /// Positions of the first occurrence of every distinct row, compared over
    /// all columns. The index does not take part in the comparison.
    pub(crate) fn first_occurrences(&self) -> Vec<usize> {
        let mut seen = HashSet::with_capacity(self.nrows());
        (0..self.nrows())
            .filter(|&row| {
                let fingerprint: Vec<CellFingerprint> = self
                    .columns
                    .iter()
                    .map(|c| c.data().cell(row).fingerprint())
                    .collect();
                seen.insert(fingerprint)
            })
            .collect()
    }

    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name(), c.data().select(rows)))
                .collect(),
            index: self.index.select(rows),
        }
    }

    fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let absent: Vec<&str> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.column(name).is_none())
            .collect();
        if absent.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::Schema(format!(
                "columns not found: {}",
                absent.join(", ")
            )))
        }
    }

    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        self.require_columns(names)?;
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.iter().any(|n| n.as_ref() == c.name()))
            .cloned()
            .collect();
        Ok(Table {
            columns,
            index: self.index.clone(),
        })
    }

    /// Moves `keys` out of the columns and into the row index, in order.
    pub fn set_index<S: AsRef<str>>(&self, keys: &[S]) -> Result<Table> {
        self.require_columns(keys)?;
        if keys.is_empty() {
            return Ok(self.clone());
        }

        let key_columns: Vec<&Column> = keys
            .iter()
            .filter_map(|k| self.column(k.as_ref()))
            .collect();
        let labels = (0..self.nrows())
            .map(|row| key_columns.iter().map(|c| c.data().cell(row)).collect())
            .collect();
        let names = keys.iter().map(|k| k.as_ref().to_string()).collect();

        let remaining = self.drop_columns(keys)?;
        Table::with_index(remaining.columns, RowIndex::new(names, labels)?)
    }

    /// Replaces the columns and keeps the index.
    pub(crate) fn with_columns(&self, columns: Vec<Column>) -> Result<Table> {
        Table::with_index(columns, self.index.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::numeric("id", vec![0.0, 1.0, 2.0, 2.0]),
            Column::numeric("col1", vec![1.0, 2.0, 3.0, 3.0]),
            Column::numeric("col2", vec![30.0, f64::NAN, 30.0, 30.0]),
            Column::categorical("non_feature", vec![Some("a"), Some("b"), Some("c"), Some("c")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_shape_and_positional_index() {
        let table = sample_table();
        assert_eq!(table.shape(), (4, 4));
        assert!(table.index().is_positional());
        assert_eq!(table.index().labels()[3], vec![Cell::Number(3.0)]);
        assert_eq!(table.missing_count(), 1);
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Table::new(vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("b", vec![1.0]),
        ]);
        assert!(matches!(result, Err(AnalysisError::Schema(_))));
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let result = Table::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("a", vec![2.0]),
        ]);
        assert!(matches!(result, Err(AnalysisError::Schema(_))));
    }

    #[test]
    fn test_missing_cells_compare_equal() {
        assert_eq!(Cell::Number(f64::NAN), Cell::Missing);
        assert_eq!(Cell::Number(-0.0), Cell::Number(0.0));
        assert_ne!(Cell::Number(1.0), Cell::Text("1".to_string()));
    }

    #[test]
    fn test_first_occurrences() {
        let table = sample_table();
        assert_eq!(table.first_occurrences(), vec![0, 1, 2]);
    }

    #[test]
    fn test_set_index_moves_key_columns() {
        let table = sample_table().set_index(&["id", "non_feature"]).unwrap();
        assert_eq!(table.column_names(), vec!["col1", "col2"]);
        assert_eq!(table.index().names(), &["id", "non_feature"]);
        assert_eq!(
            table.index().labels()[1],
            vec![Cell::Number(1.0), Cell::Text("b".to_string())]
        );
        assert_eq!(table.index().level("non_feature"), Some(1));
        assert_eq!(table.index().format_label(2), "2/c");
        assert!(!table.index().is_unique());
    }

    #[test]
    fn test_drop_unknown_column() {
        let err = sample_table().drop_columns(&["missing", "col1"]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Schema("columns not found: missing".to_string())
        );
    }
}
