//! # Density Estimation
//!
//! Models the distribution of parties in feature space with a kernel density
//! estimate, draws synthetic parties from it and maps them back to the
//! original feature names through the fitted reduction.
//!
//! The estimator keeps its own copy of the reduction model taken at
//! construction time, so refitting the reducer afterwards does not change the
//! inverse mapping of an existing estimator.

use crate::dimred::{DimensionalityReducer, ReductionModel};
use crate::error::{AnalysisError, Result};
use crate::logging::LogHandle;
use crate::table::{FeatureMatrix, RowIndex};
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod kde;
mod kernel;

pub use kde::KernelDensity;
pub use kernel::Kernel;

pub const DEFAULT_BANDWIDTH: f64 = 0.5;
pub const DEFAULT_N_SAMPLES: usize = 10;
pub const DEFAULT_SEED: u64 = 42;

pub struct DensityEstimator<'a> {
    data: FeatureMatrix,
    reduction: ReductionModel,
    feature_names: Vec<String>,
    model: Option<KernelDensity>,
    rng: ChaCha8Rng,
    log: &'a LogHandle,
}

impl<'a> DensityEstimator<'a> {
    /// # Errors
    /// - `NotFitted` if `reducer` has not been transformed
    /// - `DimensionMismatch` if `feature_names` does not match the reducer's
    ///   input width
    pub fn new(
        data: FeatureMatrix,
        reducer: &DimensionalityReducer<'_>,
        feature_names: Vec<String>,
        log: &'a LogHandle,
    ) -> Result<Self> {
        let reduction = reducer.model()?.clone();
        if feature_names.len() != reduction.n_features() {
            return Err(AnalysisError::dimension_mismatch(
                "high-dimensional feature names",
                reduction.n_features(),
                feature_names.len(),
            ));
        }

        Ok(Self {
            data,
            reduction,
            feature_names,
            model: None,
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
            log,
        })
    }

    /// Restarts the sampling stream from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn data(&self) -> &FeatureMatrix {
        &self.data
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn reduction(&self) -> &ReductionModel {
        &self.reduction
    }

    pub fn model(&self) -> Result<&KernelDensity> {
        self.model.as_ref().ok_or_else(|| {
            AnalysisError::NotFitted(
                "model_distribution must be called before using the density model".to_string(),
            )
        })
    }

    /// Fits the kernel density over the rows of the data.
    ///
    /// # Errors
    /// `InvalidParameter` if `bandwidth` is not positive.
    pub fn model_distribution(&mut self, kernel: Kernel, bandwidth: f64) -> Result<()> {
        self.log.info(format_args!(
            "Fitting {} kernel density (bandwidth {}) over {} rows",
            kernel,
            bandwidth,
            self.data.nrows()
        ));
        self.model = Some(KernelDensity::fit(self.data.values().view(), kernel, bandwidth)?);
        Ok(())
    }

    /// Draws `n` independent points with the same columns as the data.
    ///
    /// # Errors
    /// `NotFitted` before [`model_distribution`](Self::model_distribution).
    pub fn sample_from_distribution(&mut self, n: usize) -> Result<FeatureMatrix> {
        let model = self.model.as_ref().ok_or_else(|| {
            AnalysisError::NotFitted("model_distribution must be called before sampling".to_string())
        })?;
        let samples = model.sample(n, &mut self.rng)?;
        self.log.debug(format_args!("Drew {} sample(s)", n));
        FeatureMatrix::new(RowIndex::positional(n), self.data.columns().to_vec(), samples)
    }

    /// Inverse-projects reduced points into the space named by
    /// `feature_names`.
    ///
    /// # Errors
    /// `DimensionMismatch` if the sample width differs from the number of
    /// components.
    pub fn map_to_high_dimension_space(&self, low_dim_sample: &FeatureMatrix) -> Result<FeatureMatrix> {
        if low_dim_sample.ncols() != self.reduction.n_components() {
            return Err(AnalysisError::dimension_mismatch(
                "low-dimensional sample",
                self.reduction.n_components(),
                low_dim_sample.ncols(),
            ));
        }
        let high_dim = self
            .reduction
            .inverse_transform(low_dim_sample.values().view())?;
        FeatureMatrix::new(
            low_dim_sample.index().clone(),
            self.feature_names.clone(),
            high_dim,
        )
    }

    /// Log-density of every row of `x` under the fitted model.
    pub fn score_samples(&self, x: &FeatureMatrix) -> Result<Array1<f64>> {
        self.model()?.score_samples(x.values().view())
    }

    pub fn score(&self, x: &FeatureMatrix) -> Result<f64> {
        self.model()?.score(x.values().view())
    }
}
