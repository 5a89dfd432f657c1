pub mod density;
pub mod dimred;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod preprocessing;
pub mod table;

pub use density::{DensityEstimator, Kernel, KernelDensity};
pub use dimred::{DimensionalityReducer, ReductionMethod, ReductionModel};
pub use error::{AnalysisError, Result};
pub use loader::{InMemoryLoader, TableLoader};
pub use logging::LogHandle;
pub use pipeline::{AnalysisConfig, AnalysisOutput};
pub use preprocessing::{PreprocessConfig, Preprocessor, StandardScaler};
pub use table::{Cell, Column, ColumnData, FeatureMatrix, RowIndex, Table};

#[cfg(feature = "polars")]
pub use loader::CsvLoader;
