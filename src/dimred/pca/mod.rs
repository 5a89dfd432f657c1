//! # Principal Component Analysis
//!
//! Dense PCA over standardized columns. The covariance matrix of the
//! standardized data is decomposed with a symmetric eigen-solver and the
//! eigenvectors with the largest eigenvalues become the components.
//!
//! The fitted projection lives in a [`ReductionModel`], an immutable value that
//! can be cloned and handed to consumers that need the inverse mapping.

use crate::error::{AnalysisError, Result};
use crate::preprocessing::StandardScaler;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2};
use std::cmp::Ordering;

/// Fitted linear projection: scaler statistics, component directions and the
/// variance they explain.
#[derive(Debug, Clone)]
pub struct ReductionModel {
    feature_names: Vec<String>,
    scaler: StandardScaler,
    components: Array2<f64>,
    explained_variance: Array1<f64>,
    explained_variance_ratio: Array1<f64>,
}

impl ReductionModel {
    /// Number of components `k`, the width of the reduced space.
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Number of input features `d`.
    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Component directions, `k × d`, one unit-length row per component.
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.scaler.mean()
    }

    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scaler.scale()
    }

    pub fn explained_variance(&self) -> &Array1<f64> {
        &self.explained_variance
    }

    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    /// Standardizes `x` with the fitted statistics and projects it.
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(AnalysisError::dimension_mismatch(
                "forward projection",
                self.n_features(),
                x.ncols(),
            ));
        }
        let standardized = self.scaler.transform(x)?;
        Ok(standardized.dot(&self.components.t()))
    }

    /// Maps reduced coordinates back into the standardized feature space.
    pub fn inverse_transform_standardized(&self, z: ArrayView2<f64>) -> Result<Array2<f64>> {
        if z.ncols() != self.n_components() {
            return Err(AnalysisError::dimension_mismatch(
                "inverse projection",
                self.n_components(),
                z.ncols(),
            ));
        }
        Ok(z.dot(&self.components))
    }

    /// Maps reduced coordinates back into the space the model was fitted on.
    pub fn inverse_transform(&self, z: ArrayView2<f64>) -> Result<Array2<f64>> {
        let standardized = self.inverse_transform_standardized(z)?;
        self.scaler.inverse_transform(standardized.view())
    }
}

pub struct PCABuilder {
    n_components: usize,
}

impl Default for PCABuilder {
    fn default() -> Self {
        Self { n_components: 2 }
    }
}

impl PCABuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn build(self) -> Pca {
        Pca {
            n_components: self.n_components,
            model: None,
        }
    }
}

pub struct Pca {
    n_components: usize,
    model: Option<ReductionModel>,
}

impl Pca {
    /// Fits the projection. `feature_names` label the columns of `x`.
    ///
    /// # Errors
    /// - `InvalidParameter` if `x` has no rows, or `n_components` is zero or
    ///   larger than the number of columns
    /// - `Linalg` if the eigen-decomposition yields non-finite values
    pub fn fit(&mut self, x: ArrayView2<f64>, feature_names: Vec<String>) -> Result<&ReductionModel> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(AnalysisError::invalid_parameter(
                "rows",
                n_samples,
                "PCA requires at least one row",
            ));
        }
        if self.n_components == 0 || self.n_components > n_features {
            return Err(AnalysisError::invalid_parameter(
                "n_components",
                self.n_components,
                format!("must be between 1 and the number of numeric columns ({})", n_features),
            ));
        }
        if feature_names.len() != n_features {
            return Err(AnalysisError::dimension_mismatch(
                "PCA feature names",
                n_features,
                feature_names.len(),
            ));
        }

        let mut scaler = StandardScaler::new();
        let standardized = scaler.fit_transform(x)?;

        let denom = if n_samples > 1 {
            (n_samples - 1) as f64
        } else {
            1.0
        };
        let cov = standardized.t().dot(&standardized) / denom;
        let (eigenvalues, eigenvectors) = symmetric_eigen(&cov)?;

        let total_variance: f64 = eigenvalues.iter().sum();
        let explained_variance = eigenvalues.slice(ndarray::s![..self.n_components]).to_owned();
        let explained_variance_ratio = if total_variance > 0.0 {
            &explained_variance / total_variance
        } else {
            Array1::zeros(self.n_components)
        };

        let mut components = Array2::zeros((self.n_components, n_features));
        for (i, mut row) in components.rows_mut().into_iter().enumerate() {
            row.assign(&eigenvectors.column(i));
        }
        flip_signs(&mut components);

        Ok(&*self.model.insert(ReductionModel {
            feature_names,
            scaler,
            components,
            explained_variance,
            explained_variance_ratio,
        }))
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.model()?.transform(x)
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f64>, feature_names: Vec<String>) -> Result<Array2<f64>> {
        self.fit(x, feature_names)?;
        self.transform(x)
    }

    pub fn model(&self) -> Result<&ReductionModel> {
        self.model
            .as_ref()
            .ok_or_else(|| AnalysisError::NotFitted("PCA has not been fitted yet".to_string()))
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }
}

/// Eigenpairs of a symmetric matrix sorted by descending eigenvalue.
/// Eigenvectors are the columns of the returned matrix; negative eigenvalues
/// from round-off are clamped to zero.
fn symmetric_eigen(cov: &Array2<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
    let d = cov.nrows();
    let matrix = DMatrix::from_fn(d, d, |i, j| cov[[i, j]]);
    let eigen = matrix.symmetric_eigen();

    if eigen.eigenvalues.iter().any(|v| !v.is_finite())
        || eigen.eigenvectors.iter().any(|v| !v.is_finite())
    {
        return Err(AnalysisError::Linalg(
            "symmetric eigen-decomposition produced non-finite values".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..d).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(Ordering::Equal)
    });

    let eigenvalues = order
        .iter()
        .map(|&j| eigen.eigenvalues[j].max(0.0))
        .collect::<Array1<f64>>();
    let eigenvectors = Array2::from_shape_fn((d, d), |(i, k)| eigen.eigenvectors[(i, order[k])]);

    Ok((eigenvalues, eigenvectors))
}

/// Makes the largest-magnitude loading of every component positive so the
/// output does not depend on the solver's sign choice.
fn flip_signs(components: &mut Array2<f64>) {
    for mut row in components.rows_mut() {
        let pivot = row
            .iter()
            .copied()
            .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal))
            .unwrap_or(0.0);
        if pivot < 0.0 {
            row.mapv_inplace(|v| -v);
        }
    }
}
