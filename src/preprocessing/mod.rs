//! # Preprocessing
//!
//! Cleaning stages applied to the raw survey table before any reduction:
//! deduplication, removal of non-feature columns, row keying, zero-filling of
//! missing cells and column standardization. Every stage takes a table by
//! reference and returns a new one.
//!
//! [`Preprocessor::preprocess`] runs the stages in their only valid order.
//! Filling must precede scaling or NaNs propagate through the column means, and
//! deduplication must precede keying so duplicate keys cannot slip through.

use crate::error::{AnalysisError, Result};
use crate::logging::LogHandle;
use crate::table::{Column, ColumnData, FeatureMatrix, Table};
use log::Level;

mod scaler;

pub use scaler::StandardScaler;

/// Index columns of the party survey.
pub const DEFAULT_KEY_COLUMNS: [&str; 3] = ["party_id", "party", "country"];

/// Columns to discard and columns that identify a row.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    pub excluded_columns: Vec<String>,
    pub key_columns: Vec<String>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            excluded_columns: Vec::new(),
            key_columns: DEFAULT_KEY_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PreprocessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excluded_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.excluded_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn key_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.key_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Cleans a survey table stage by stage.
pub struct Preprocessor<'a> {
    config: PreprocessConfig,
    log: &'a LogHandle,
}

impl<'a> Preprocessor<'a> {
    pub fn new(config: PreprocessConfig, log: &'a LogHandle) -> Self {
        Self { config, log }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Drops rows equal to an earlier row, keeping the first occurrence and the
    /// original order of the survivors.
    pub fn remove_duplicates(&self, table: &Table) -> Table {
        self.log.info(format_args!("Removing duplicate rows"));
        let keep = table.first_occurrences();
        let removed = table.nrows() - keep.len();
        if removed > 0 {
            self.log
                .debug(format_args!("Dropped {} duplicate row(s)", removed));
        }
        table.select_rows(&keep)
    }

    /// Drops `excluded` and moves `keys` into the row index.
    ///
    /// # Errors
    /// `Schema` naming every absent column.
    pub fn remove_nonfeature_cols<S: AsRef<str>>(
        &self,
        table: &Table,
        excluded: &[S],
        keys: &[S],
    ) -> Result<Table> {
        self.log.info(format_args!("Removing non-feature columns"));
        let absent: Vec<&str> = excluded
            .iter()
            .chain(keys.iter())
            .map(AsRef::as_ref)
            .filter(|name| table.column(name).is_none())
            .collect();
        if !absent.is_empty() {
            return Err(AnalysisError::Schema(format!(
                "columns not found: {}",
                absent.join(", ")
            )));
        }

        let dropped = table.drop_columns(excluded)?;
        self.log.info(format_args!("Setting up index"));
        let keyed = dropped.set_index(keys)?;
        if !keyed.index().is_unique() {
            self.log.warn(format_args!(
                "Row keys [{}] are not unique",
                keyed.index().names().join(", ")
            ));
        }
        Ok(keyed)
    }

    /// Replaces every missing cell with zero: `0.0` in numeric columns, the
    /// text `"0"` in categorical ones.
    pub fn handle_missing_values(&self, table: &Table) -> Result<Table> {
        if self.log.enabled(Level::Info) {
            self.log.info(format_args!(
                "Filling {} missing value(s) with zero",
                table.missing_count()
            ));
        }
        let columns = table
            .columns()
            .iter()
            .map(|column| {
                let data = match column.data() {
                    ColumnData::Numeric(values) => ColumnData::Numeric(
                        values
                            .iter()
                            .map(|&v| if v.is_nan() { 0.0 } else { v })
                            .collect(),
                    ),
                    ColumnData::Categorical(values) => ColumnData::Categorical(
                        values
                            .iter()
                            .map(|v| Some(v.clone().unwrap_or_else(|| "0".to_string())))
                            .collect(),
                    ),
                };
                Column::new(column.name(), data)
            })
            .collect();
        table.with_columns(columns)
    }

    /// Standardizes every column with its population standard deviation.
    ///
    /// # Errors
    /// `Schema` if a column is categorical, `NonFiniteValue` if a cell is
    /// still missing.
    pub fn scale_features(&self, table: &Table) -> Result<Table> {
        self.log.info(format_args!("Scaling features"));
        let features = FeatureMatrix::from_table(table)?;
        if features.nrows() == 0 {
            return Ok(table.clone());
        }
        let scaled = StandardScaler::new().fit_transform(features.values().view())?;
        let scaled = FeatureMatrix::new(
            features.index().clone(),
            features.columns().to_vec(),
            scaled,
        )?;
        Ok(scaled.to_table())
    }

    /// Runs every stage in order: deduplicate, drop and key, fill, scale.
    pub fn preprocess(&self, table: &Table) -> Result<Table> {
        let (rows, cols) = table.shape();
        self.log
            .info(format_args!("Preprocessing table of shape ({}, {})", rows, cols));

        let deduplicated = self.remove_duplicates(table);
        let keyed = self.remove_nonfeature_cols(
            &deduplicated,
            self.config.excluded_columns.as_slice(),
            self.config.key_columns.as_slice(),
        )?;
        let filled = self.handle_missing_values(&keyed)?;
        let scaled = self.scale_features(&filled)?;

        let (rows, cols) = scaled.shape();
        self.log
            .info(format_args!("Processed table has shape ({}, {})", rows, cols));
        Ok(scaled)
    }
}
