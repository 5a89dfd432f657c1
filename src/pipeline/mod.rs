//! End-to-end analysis: preprocess the survey table, reduce it, model the
//! density of the reduced parties and synthesize new ones.

use crate::density::{DensityEstimator, Kernel, DEFAULT_BANDWIDTH, DEFAULT_N_SAMPLES, DEFAULT_SEED};
use crate::dimred::{DimensionalityReducer, ReductionMethod, DEFAULT_N_COMPONENTS};
use crate::error::Result;
use crate::logging::LogHandle;
use crate::preprocessing::{PreprocessConfig, Preprocessor};
use crate::table::{Cell, FeatureMatrix, Table};
use ndarray::Array1;

/// Every knob of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub preprocess: PreprocessConfig,
    pub method: ReductionMethod,
    pub n_components: usize,
    pub kernel: Kernel,
    pub bandwidth: f64,
    pub n_samples: usize,
    pub seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            method: ReductionMethod::default(),
            n_components: DEFAULT_N_COMPONENTS,
            kernel: Kernel::default(),
            bandwidth: DEFAULT_BANDWIDTH,
            n_samples: DEFAULT_N_SAMPLES,
            seed: DEFAULT_SEED,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preprocess(mut self, preprocess: PreprocessConfig) -> Self {
        self.preprocess = preprocess;
        self
    }

    pub fn method(mut self, method: ReductionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Tables produced by [`run`].
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub processed: Table,
    pub reduced: FeatureMatrix,
    pub samples: FeatureMatrix,
    pub mapped_samples: FeatureMatrix,
    pub explained_variance_ratio: Array1<f64>,
}

impl AnalysisOutput {
    /// Reduced rows whose index level `key_name` equals `value`, e.g. the
    /// parties of one country.
    ///
    /// # Errors
    /// `Schema` if the reduced matrix has no such index level.
    pub fn filter_rows(&self, key_name: &str, value: impl Into<Cell>) -> Result<FeatureMatrix> {
        self.reduced.filter_rows(key_name, &value.into())
    }
}

/// Runs every stage in order and stops at the first error.
pub fn run(table: &Table, config: &AnalysisConfig, log: &LogHandle) -> Result<AnalysisOutput> {
    let preprocessor = Preprocessor::new(config.preprocess.clone(), log);
    let processed = preprocessor.preprocess(table)?;

    let mut reducer = DimensionalityReducer::new(config.method, &processed, log)?
        .with_n_components(config.n_components);
    let reduced = reducer.transform()?;
    let explained_variance_ratio = reducer.model()?.explained_variance_ratio().clone();
    log.info(format_args!(
        "Reduced data has shape ({}, {}), explained variance ratio {:?}",
        reduced.nrows(),
        reduced.ncols(),
        explained_variance_ratio.to_vec()
    ));

    let feature_names = reducer.model()?.feature_names().to_vec();
    let mut estimator =
        DensityEstimator::new(reduced.clone(), &reducer, feature_names, log)?.with_seed(config.seed);
    estimator.model_distribution(config.kernel, config.bandwidth)?;
    let samples = estimator.sample_from_distribution(config.n_samples)?;
    let mapped_samples = estimator.map_to_high_dimension_space(&samples)?;
    log.info(format_args!(
        "Mapped {} sample(s) back to {} feature(s)",
        mapped_samples.nrows(),
        mapped_samples.ncols()
    ));

    Ok(AnalysisOutput {
        processed,
        reduced,
        samples,
        mapped_samples,
        explained_variance_ratio,
    })
}
