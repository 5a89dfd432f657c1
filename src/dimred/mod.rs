//! # Dimensionality Reduction
//!
//! Projects the numeric columns of a table onto a small number of orthogonal
//! components for visualization. Non-numeric columns are set aside when the
//! reducer is built and never take part in the fit.
//!
//! ## Currently Available
//! - **PCA** ([`pca`]): principal components of the standardized columns

use crate::error::{AnalysisError, Result};
use crate::logging::LogHandle;
use crate::table::{Column, FeatureMatrix, Table};
use log::Level;
use std::fmt;
use std::str::FromStr;

pub mod pca;

pub use pca::{Pca, PCABuilder, ReductionModel};

/// Default number of components.
pub const DEFAULT_N_COMPONENTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReductionMethod {
    #[default]
    Pca,
}

impl FromStr for ReductionMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pca" => Ok(ReductionMethod::Pca),
            _ => Err(AnalysisError::invalid_parameter(
                "method",
                s,
                "supported reduction methods: PCA",
            )),
        }
    }
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionMethod::Pca => write!(f, "PCA"),
        }
    }
}

/// Name of the `i`-th (zero-based) reduced column.
pub fn component_name(i: usize) -> String {
    format!("component {}", i + 1)
}

/// Reduces the numeric part of a table to `n_components` columns and keeps
/// the fitted projection for inverse mapping.
pub struct DimensionalityReducer<'a> {
    method: ReductionMethod,
    n_components: usize,
    data: Table,
    numeric: FeatureMatrix,
    non_numeric: Table,
    pca: Option<Pca>,
    log: &'a LogHandle,
}

impl<'a> DimensionalityReducer<'a> {
    /// Partitions `table` into numeric and non-numeric columns.
    ///
    /// # Errors
    /// `NonFiniteValue` if a numeric cell is missing or infinite.
    pub fn new(method: ReductionMethod, table: &Table, log: &'a LogHandle) -> Result<Self> {
        let numeric = FeatureMatrix::numeric_part(table)?;
        let non_numeric_columns: Vec<Column> = table
            .columns()
            .iter()
            .filter(|c| !c.is_numeric())
            .cloned()
            .collect();
        let non_numeric = Table::with_index(non_numeric_columns, table.index().clone())?;

        log.debug(format_args!(
            "{} reducer over {} numeric and {} non-numeric column(s)",
            method,
            numeric.ncols(),
            non_numeric.ncols()
        ));

        Ok(Self {
            method,
            n_components: DEFAULT_N_COMPONENTS,
            data: table.clone(),
            numeric,
            non_numeric,
            pca: None,
            log,
        })
    }

    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn method(&self) -> ReductionMethod {
        self.method
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// The table the reducer was built from.
    pub fn data(&self) -> &Table {
        &self.data
    }

    pub fn numeric(&self) -> &FeatureMatrix {
        &self.numeric
    }

    pub fn non_numeric(&self) -> &Table {
        &self.non_numeric
    }

    /// Standardizes the numeric columns, fits the projection and returns the
    /// reduced matrix with columns `component 1..k` and the input row index.
    ///
    /// Calling it again refits and replaces the stored model.
    ///
    /// # Errors
    /// `InvalidParameter` if `k` is zero or exceeds the number of numeric
    /// columns, or the table has no rows.
    pub fn transform(&mut self) -> Result<FeatureMatrix> {
        let available = self.numeric.ncols();
        if self.n_components == 0 || self.n_components > available {
            return Err(AnalysisError::invalid_parameter(
                "n_components",
                self.n_components,
                format!(
                    "must be between 1 and the number of numeric columns ({})",
                    available
                ),
            ));
        }

        self.log.info(format_args!(
            "Reducing {} numeric column(s) to {} component(s) with {}",
            available, self.n_components, self.method
        ));

        let reduced = match self.method {
            ReductionMethod::Pca => {
                let pca = self.pca.insert(
                    PCABuilder::new()
                        .n_components(self.n_components)
                        .build(),
                );
                pca.fit_transform(self.numeric.values().view(), self.numeric.columns().to_vec())?
            }
        };

        if let (true, Ok(model)) = (self.log.enabled(Level::Debug), self.model()) {
            self.log.debug(format_args!(
                "Explained variance ratio: {:?}",
                model.explained_variance_ratio().to_vec()
            ));
        }

        FeatureMatrix::new(
            self.numeric.index().clone(),
            (0..self.n_components).map(component_name).collect(),
            reduced,
        )
    }

    /// The fitted projection.
    ///
    /// # Errors
    /// `NotFitted` before the first [`transform`](Self::transform).
    pub fn model(&self) -> Result<&ReductionModel> {
        match &self.pca {
            Some(pca) => pca.model(),
            None => Err(AnalysisError::NotFitted(
                "dimensionality reducer has not been transformed yet".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use approx::assert_abs_diff_eq;

    fn mock_table() -> Table {
        Table::new(vec![
            Column::numeric("id", vec![0.0, 1.0, 2.0]),
            Column::numeric("col1", vec![-1.225, 0.0, 1.225]),
            Column::numeric("col2", vec![-1.175, -0.1, 1.257]),
            Column::numeric("col3", vec![-1.019, -0.340, 1.359]),
        ])
        .unwrap()
        .set_index(&["id"])
        .unwrap()
    }

    fn mixed_table() -> Table {
        Table::new(vec![
            Column::numeric("id", vec![1.0, 2.0, 3.0]),
            Column::categorical("party_name", vec![Some("A"), Some("B"), Some("C")]),
            Column::numeric("score1", vec![1.22, 0.0, 2.3]),
            Column::numeric("score2", vec![1.222, 1.0, -2.3]),
            Column::categorical("country", vec![Some("X"), Some("Y"), Some("Z")]),
        ])
        .unwrap()
        .set_index(&["id"])
        .unwrap()
    }

    #[test]
    fn test_initialization() {
        let log = LogHandle::detached();
        let table = mock_table();
        let reducer = DimensionalityReducer::new(ReductionMethod::Pca, &table, &log).unwrap();
        assert_eq!(reducer.data(), &table);
        assert_eq!(reducer.n_components(), 2);
        assert_eq!(reducer.method(), ReductionMethod::Pca);
        assert!(matches!(reducer.model(), Err(AnalysisError::NotFitted(_))));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("PCA".parse::<ReductionMethod>().unwrap(), ReductionMethod::Pca);
        assert_eq!("pca".parse::<ReductionMethod>().unwrap(), ReductionMethod::Pca);
        assert!(matches!(
            "tsne".parse::<ReductionMethod>(),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_dimensionality_reducer() {
        let log = LogHandle::detached();
        let table = mock_table();
        let mut reducer = DimensionalityReducer::new(ReductionMethod::Pca, &table, &log).unwrap();
        let reduced = reducer.transform().unwrap();

        assert_eq!(reduced.shape(), (3, 2));
        assert_eq!(reduced.columns(), &["component 1", "component 2"]);
        assert_eq!(reduced.index(), table.index());
        assert_eq!(reducer.model().unwrap().feature_names(), &["col1", "col2", "col3"]);
    }

    #[test]
    fn test_handle_non_numeric_data() {
        let log = LogHandle::detached();
        let table = mixed_table();
        let mut reducer = DimensionalityReducer::new(ReductionMethod::Pca, &table, &log).unwrap();
        assert_eq!(reducer.non_numeric().column_names(), vec!["party_name", "country"]);

        let reduced = reducer.transform().unwrap();
        assert_eq!(reduced.shape(), (3, 2));
        assert!(reduced.column("component 1").is_some());
        assert!(reduced.column("component 2").is_some());
    }

    #[test]
    fn test_too_many_components() {
        let log = LogHandle::detached();
        let table = mixed_table();
        let mut reducer = DimensionalityReducer::new(ReductionMethod::Pca, &table, &log)
            .unwrap()
            .with_n_components(3);
        assert!(matches!(
            reducer.transform(),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_restandardizing_is_a_no_op() {
        let log = LogHandle::detached();
        let table = Table::new(vec![
            Column::numeric("a", vec![-1.224744871391589, 0.0, 1.224744871391589]),
            Column::numeric("b", vec![0.7071067811865475, -1.414213562373095, 0.7071067811865475]),
        ])
        .unwrap();
        let mut reducer = DimensionalityReducer::new(ReductionMethod::Pca, &table, &log).unwrap();
        reducer.transform().unwrap();

        let model = reducer.model().unwrap();
        for &m in model.mean().unwrap() {
            assert_abs_diff_eq!(m, 0.0, epsilon = 1e-12);
        }
        for &s in model.scale().unwrap() {
            assert_abs_diff_eq!(s, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let log = LogHandle::detached();
        let table = mock_table();
        let mut reducer = DimensionalityReducer::new(ReductionMethod::Pca, &table, &log)
            .unwrap()
            .with_n_components(2);
        let reduced = reducer.transform().unwrap();
        let model = reducer.model().unwrap();

        let restored = model
            .inverse_transform_standardized(reduced.values().view())
            .unwrap();
        let standardized = crate::preprocessing::StandardScaler::new()
            .fit_transform(reducer.numeric().values().view())
            .unwrap();

        // error bounded by the variance of the discarded component
        let mut full = DimensionalityReducer::new(ReductionMethod::Pca, &table, &log)
            .unwrap()
            .with_n_components(3);
        full.transform().unwrap();
        let discarded = full.model().unwrap().explained_variance()[2];
        let residual: f64 = (&restored - &standardized).mapv(|v| v * v).sum();
        assert!(residual <= discarded * (table.nrows() as f64 - 1.0) + 1e-9);
    }
}
