//! FILENAME: core/cube-engine/src/error.rs

use thiserror::Error;

/// Defects in the fact data itself. Fatal for the whole batch: skipping the
/// offending rows would corrupt every downstream sum.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataQualityError {
    #[error("row {row}: full_date value '{value}' is not a calendar date")]
    UnparseableDate { row: usize, value: String },

    #[error("required column '{0}' is missing from the fact table")]
    MissingColumn(String),

    #[error("row {row}: measure '{column}' holds non-numeric value '{value}'")]
    NonNumericMeasure {
        row: usize,
        column: String,
        value: String,
    },
}

/// Invalid choices in a single request. The caller recovers by asking again
/// with a valid choice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("unknown measure '{0}'")]
    UnknownMeasure(String),

    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("value '{value}' is not present for dimension '{dimension}' in the current selection")]
    DrillValueNotPresent { dimension: String, value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CubeError {
    #[error("data quality: {0}")]
    DataQuality(#[from] DataQualityError),

    #[error("configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}
