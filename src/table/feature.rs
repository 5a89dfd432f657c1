use crate::error::{AnalysisError, Result};
use crate::table::{Cell, Column, ColumnData, RowIndex, Table};
use ndarray::{Array2, ArrayView1, Axis};
use std::fmt;

/// Numeric-only view of a table: row index, column names and a dense
/// `n_rows × n_columns` matrix with finite cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    index: RowIndex,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(index: RowIndex, columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() != index.len() {
            return Err(AnalysisError::dimension_mismatch(
                "feature matrix rows",
                index.len(),
                values.nrows(),
            ));
        }
        if values.ncols() != columns.len() {
            return Err(AnalysisError::dimension_mismatch(
                "feature matrix columns",
                columns.len(),
                values.ncols(),
            ));
        }
        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Converts a table whose columns are all numeric and finite.
    pub fn from_table(table: &Table) -> Result<Self> {
        if let Some(column) = table.columns().iter().find(|c| !c.is_numeric()) {
            return Err(AnalysisError::Schema(format!(
                "column '{}' is not numeric",
                column.name()
            )));
        }
        Self::numeric_part(table)
    }

    /// Converts the numeric columns of a table and ignores the rest.
    pub fn numeric_part(table: &Table) -> Result<Self> {
        let numeric: Vec<&Column> = table.columns().iter().filter(|c| c.is_numeric()).collect();
        let mut values = Array2::zeros((table.nrows(), numeric.len()));

        for (j, column) in numeric.iter().enumerate() {
            let data = column.as_numeric().unwrap_or_default();
            for (i, &v) in data.iter().enumerate() {
                if !v.is_finite() {
                    return Err(AnalysisError::NonFiniteValue {
                        column: column.name().to_string(),
                        row: i,
                    });
                }
                values[[i, j]] = v;
            }
        }

        Self::new(
            table.index().clone(),
            numeric.iter().map(|c| c.name().to_string()).collect(),
            values,
        )
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|j| self.values.column(j))
    }

    /// Rows whose index level `level` equals `value`.
    pub fn filter_rows(&self, level: &str, value: &Cell) -> Result<FeatureMatrix> {
        let position = self.index.level(level).ok_or_else(|| {
            AnalysisError::Schema(format!("index level '{}' not found", level))
        })?;
        let rows: Vec<usize> = self
            .index
            .labels()
            .iter()
            .enumerate()
            .filter(|(_, label)| &label[position] == value)
            .map(|(i, _)| i)
            .collect();

        Ok(FeatureMatrix {
            index: self.index.select(&rows),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), &rows),
        })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> FeatureMatrix {
        let rows: Vec<usize> = (0..n.min(self.nrows())).collect();
        FeatureMatrix {
            index: self.index.select(&rows),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), &rows),
        }
    }

    pub fn to_table(&self) -> Table {
        let columns = self
            .columns
            .iter()
            .zip(self.values.columns())
            .map(|(name, values)| Column::new(name.clone(), ColumnData::Numeric(values.to_vec())))
            .collect();
        Table {
            columns,
            index: self.index.clone(),
        }
    }
}

impl fmt::Display for FeatureMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_header = if self.index.is_positional() {
            String::new()
        } else {
            self.index.names().join("/")
        };
        write!(f, "{:<24}", index_header)?;
        for name in &self.columns {
            write!(f, " {:>12}", name)?;
        }
        writeln!(f)?;

        for (i, row) in self.values.rows().into_iter().enumerate() {
            write!(f, "{:<24}", self.index.format_label(i))?;
            for v in row {
                write!(f, " {:>12.4}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
