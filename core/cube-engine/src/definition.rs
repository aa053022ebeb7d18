//! FILENAME: core/cube-engine/src/definition.rs
//! Cube request definitions - what the presentation layer asks for.
//!
//! Measures and dimensions come from fixed option sets. The presentation
//! layer holds string keys; parsing them here is where an unrecognised
//! choice becomes a `ConfigurationError`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use model::{Column, FactValue};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

// ============================================================================
// MEASURES
// ============================================================================

/// A numeric column that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Budget,
    ActualCost,
    BudgetDeviation,
    EstimatedHours,
    ActualHours,
    DefectsReported,
    DefectCost,
}

impl Measure {
    pub const ALL: [Measure; 7] = [
        Measure::Budget,
        Measure::ActualCost,
        Measure::BudgetDeviation,
        Measure::EstimatedHours,
        Measure::ActualHours,
        Measure::DefectsReported,
        Measure::DefectCost,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Measure::Budget => "budget",
            Measure::ActualCost => "actual_cost",
            Measure::BudgetDeviation => "budget_deviation",
            Measure::EstimatedHours => "estimated_hours",
            Measure::ActualHours => "actual_hours",
            Measure::DefectsReported => "defects_reported",
            Measure::DefectCost => "defect_cost",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measure::Budget => "Total budget",
            Measure::ActualCost => "Total actual cost",
            Measure::BudgetDeviation => "Budget deviation",
            Measure::EstimatedHours => "Estimated hours",
            Measure::ActualHours => "Actual hours",
            Measure::DefectsReported => "Defects reported",
            Measure::DefectCost => "Defect cost",
        }
    }

    pub fn column(self) -> Column {
        match self {
            Measure::Budget => Column::Budget,
            Measure::ActualCost => Column::ActualCost,
            Measure::BudgetDeviation => Column::BudgetDeviation,
            Measure::EstimatedHours => Column::EstimatedHoursTotal,
            Measure::ActualHours => Column::ActualHoursTotal,
            Measure::DefectsReported => Column::DefectsReported,
            Measure::DefectCost => Column::DefectCost,
        }
    }

    /// Accepts the key, the column header (canonical or warehouse) or the
    /// display label.
    pub fn from_key(key: &str) -> Result<Measure, ConfigurationError> {
        let wanted = key.trim();
        Measure::ALL
            .iter()
            .copied()
            .find(|m| {
                m.key().eq_ignore_ascii_case(wanted)
                    || m.label().eq_ignore_ascii_case(wanted)
                    || Column::from_header(wanted) == Some(m.column())
            })
            .ok_or_else(|| ConfigurationError::UnknownMeasure(key.to_string()))
    }
}

impl FromStr for Measure {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Measure::from_key(s)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// DIMENSIONS
// ============================================================================

/// A categorical column usable as a roll-up, pivot or drill-down axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    Quarter,
    Month,
    Industry,
    Client,
    ProjectType,
    Team,
    Status,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Year,
        Dimension::Quarter,
        Dimension::Month,
        Dimension::Industry,
        Dimension::Client,
        Dimension::ProjectType,
        Dimension::Team,
        Dimension::Status,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Quarter => "quarter",
            Dimension::Month => "month",
            Dimension::Industry => "industry",
            Dimension::Client => "client",
            Dimension::ProjectType => "project_type",
            Dimension::Team => "team",
            Dimension::Status => "status",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Year => "Year",
            Dimension::Quarter => "Quarter",
            Dimension::Month => "Month",
            Dimension::Industry => "Industry",
            Dimension::Client => "Client",
            Dimension::ProjectType => "Project type",
            Dimension::Team => "Team",
            Dimension::Status => "Status",
        }
    }

    /// Column the dimension reads. Month and status read the derived
    /// display columns.
    pub fn column(self) -> Column {
        match self {
            Dimension::Year => Column::Year,
            Dimension::Quarter => Column::Quarter,
            Dimension::Month => Column::MonthName,
            Dimension::Industry => Column::Industry,
            Dimension::Client => Column::ClientName,
            Dimension::ProjectType => Column::ProjectType,
            Dimension::Team => Column::TeamName,
            Dimension::Status => Column::StatusLabel,
        }
    }

    pub fn from_key(key: &str) -> Result<Dimension, ConfigurationError> {
        let wanted = key.trim();
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| {
                d.key().eq_ignore_ascii_case(wanted)
                    || d.label().eq_ignore_ascii_case(wanted)
                    || Column::from_header(wanted) == Some(d.column())
            })
            .ok_or_else(|| ConfigurationError::UnknownDimension(key.to_string()))
    }
}

impl FromStr for Dimension {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::from_key(s)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column axis choice: a dimension (pivot) or none (roll-up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnChoice {
    #[default]
    None,
    Dimension(Dimension),
}

impl ColumnChoice {
    pub const NONE_KEY: &'static str = "none";

    pub fn from_key(key: &str) -> Result<ColumnChoice, ConfigurationError> {
        let wanted = key.trim();
        if wanted.is_empty()
            || wanted.eq_ignore_ascii_case(Self::NONE_KEY)
            || wanted.eq_ignore_ascii_case("(none)")
        {
            return Ok(ColumnChoice::None);
        }
        Dimension::from_key(wanted).map(ColumnChoice::Dimension)
    }

    pub fn dimension(self) -> Option<Dimension> {
        match self {
            ColumnChoice::None => None,
            ColumnChoice::Dimension(d) => Some(d),
        }
    }
}

impl FromStr for ColumnChoice {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnChoice::from_key(s)
    }
}

// ============================================================================
// FILTER SELECTION
// ============================================================================

/// The slice/dice predicate chosen by the user.
///
/// `None` for any field means "everything observed"; an empty set is a
/// legal choice that selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub year_min: Option<i32>,
    #[serde(default)]
    pub year_max: Option<i32>,
    #[serde(default)]
    pub industries: Option<BTreeSet<String>>,
    #[serde(default)]
    pub statuses: Option<BTreeSet<String>>,
}

impl FilterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_years(mut self, min: i32, max: i32) -> Self {
        self.year_min = Some(min);
        self.year_max = Some(max);
        self
    }

    pub fn with_industries<I, S>(mut self, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.industries = Some(industries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = Some(statuses.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// QUERY
// ============================================================================

/// One interaction: filters, measure, axes and an optional drill-down value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeQuery {
    pub filter: FilterSelection,
    pub measure: Measure,
    pub rows: Dimension,
    pub columns: ColumnChoice,
    pub drill_value: Option<FactValue>,
}

impl CubeQuery {
    pub fn rollup(measure: Measure, rows: Dimension) -> Self {
        CubeQuery {
            filter: FilterSelection::default(),
            measure,
            rows,
            columns: ColumnChoice::None,
            drill_value: None,
        }
    }

    pub fn pivot(measure: Measure, rows: Dimension, columns: Dimension) -> Self {
        CubeQuery {
            columns: ColumnChoice::Dimension(columns),
            ..Self::rollup(measure, rows)
        }
    }

    pub fn filtered(mut self, filter: FilterSelection) -> Self {
        self.filter = filter;
        self
    }

    pub fn drill(mut self, value: impl Into<FactValue>) -> Self {
        self.drill_value = Some(value.into());
        self
    }
}
