//! FILENAME: app/cli/src/cube/types.rs
use cube_engine::{ConfigurationError, CubeError, DataQualityError, YearRange};
use persistence::PersistenceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One dashboard interaction as the presentation layer sends it: every
/// choice is a string key, parsed and validated on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Measure key, e.g. "budget"
    pub measure: String,
    /// Row dimension key, e.g. "industry"
    pub rows: String,
    /// Column dimension key; absent or "none" for a roll-up
    #[serde(default)]
    pub columns: Option<String>,
    #[serde(default)]
    pub year_min: Option<i32>,
    #[serde(default)]
    pub year_max: Option<i32>,
    /// Industries to keep; absent keeps every industry
    #[serde(default)]
    pub industries: Option<Vec<String>>,
    /// Status labels to keep; absent keeps every status
    #[serde(default)]
    pub statuses: Option<Vec<String>>,
    /// Row-dimension value to drill into
    #[serde(default)]
    pub drill_value: Option<String>,
}

/// A selectable option: stable key plus display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceItem {
    pub key: String,
    pub label: String,
}

/// Everything the filter and axis selectors may offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionsResponse {
    pub snapshot_rows: usize,
    pub years: YearRange,
    pub industries: Vec<String>,
    pub statuses: Vec<String>,
    pub measures: Vec<ChoiceItem>,
    pub dimensions: Vec<ChoiceItem>,
    /// Column axis choices: the dimensions plus the "none" sentinel
    pub column_choices: Vec<ChoiceItem>,
}

#[derive(Error, Debug)]
pub enum QueryError {
    /// The snapshot could not be loaded and nothing is cached.
    #[error("snapshot unavailable: {0}")]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Cube(#[from] CubeError),
}

impl From<ConfigurationError> for QueryError {
    fn from(e: ConfigurationError) -> Self {
        QueryError::Cube(e.into())
    }
}

impl From<DataQualityError> for QueryError {
    fn from(e: DataQualityError) -> Self {
        QueryError::Cube(e.into())
    }
}
