//! FILENAME: core/model/src/value.rs
//! PURPOSE: The scalar stored in one fact table cell.
//! CONTEXT: Values are hashable and totally ordered so they can be used
//! directly as grouping keys, deduplication keys and axis members.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::column::ColumnKind;

/// A single cell of a fact row. `Empty` is the missing value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Empty,
    Number(f64),
    Text(String),
}

impl Default for FactValue {
    fn default() -> Self {
        FactValue::Empty
    }
}

impl FactValue {
    pub fn text(s: impl Into<String>) -> Self {
        FactValue::Text(s.into())
    }

    /// Parses a raw CSV field according to the kind of its column.
    /// A blank or whitespace-only field is `Empty`. Numeric columns fall back
    /// to `Text` when the field is not a number, so the offending value
    /// survives until something validates it.
    pub fn parse(raw: &str, kind: ColumnKind) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FactValue::Empty;
        }
        match kind {
            ColumnKind::Integer | ColumnKind::Decimal => match trimmed.parse::<f64>() {
                Ok(n) => FactValue::Number(n),
                Err(_) => FactValue::Text(raw.to_string()),
            },
            ColumnKind::Date | ColumnKind::Text => FactValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FactValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Display form used for CSV output and for set-membership filters.
    /// Integral numbers are written without a fractional part.
    pub fn display_value(&self) -> String {
        match self {
            FactValue::Empty => String::new(),
            FactValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            FactValue::Text(s) => s.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FactValue::Empty => 0,
            FactValue::Number(_) => 1,
            FactValue::Text(_) => 2,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

impl From<f64> for FactValue {
    fn from(n: f64) -> Self {
        FactValue::Number(n)
    }
}

impl From<i64> for FactValue {
    fn from(n: i64) -> Self {
        FactValue::Number(n as f64)
    }
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        FactValue::Text(s.to_string())
    }
}

impl From<String> for FactValue {
    fn from(s: String) -> Self {
        FactValue::Text(s)
    }
}

impl<T: Into<FactValue>> From<Option<T>> for FactValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FactValue::Empty, Into::into)
    }
}

// ============================================================================
// EQUALITY, HASHING, ORDERING
// ============================================================================

// NaN equals NaN and -0.0 equals 0.0 so that Eq and Hash stay consistent.

impl PartialEq for FactValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FactValue::Empty, FactValue::Empty) => true,
            (FactValue::Number(a), FactValue::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a == b
            }
            (FactValue::Text(a), FactValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FactValue {}

impl Hash for FactValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            FactValue::Empty => {}
            FactValue::Number(n) => {
                if n.is_nan() {
                    u64::MAX.hash(state);
                } else if *n == 0.0 {
                    0u64.hash(state);
                } else {
                    n.to_bits().hash(state);
                }
            }
            FactValue::Text(s) => s.hash(state),
        }
    }
}

impl Ord for FactValue {
    /// Empty sorts first, then numbers, then text. NaN sorts after every
    /// other number.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FactValue::Number(a), FactValue::Number(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            },
            (FactValue::Text(a), FactValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FactValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parses_numeric_columns() {
        assert_eq!(FactValue::parse("2023", ColumnKind::Integer), FactValue::Number(2023.0));
        assert_eq!(FactValue::parse(" 12.5 ", ColumnKind::Decimal), FactValue::Number(12.5));
        assert_eq!(FactValue::parse("", ColumnKind::Decimal), FactValue::Empty);
        assert_eq!(FactValue::parse("   ", ColumnKind::Decimal), FactValue::Empty);
        assert_eq!(FactValue::parse(" \t", ColumnKind::Integer), FactValue::Empty);
        assert_eq!(FactValue::parse("  ", ColumnKind::Text), FactValue::Empty);
        assert_eq!(
            FactValue::parse("n/a", ColumnKind::Decimal),
            FactValue::Text("n/a".to_string())
        );
    }

    #[test]
    fn text_columns_keep_raw_value() {
        assert_eq!(
            FactValue::parse("00123", ColumnKind::Text),
            FactValue::Text("00123".to_string())
        );
    }

    #[test]
    fn display_drops_integral_fraction() {
        assert_eq!(FactValue::Number(150.0).display_value(), "150");
        assert_eq!(FactValue::Number(99.25).display_value(), "99.25");
        assert_eq!(FactValue::Empty.display_value(), "");
    }

    #[test]
    fn nan_and_signed_zero_hash_consistently() {
        let mut set = HashSet::new();
        set.insert(FactValue::Number(f64::NAN));
        set.insert(FactValue::Number(f64::NAN));
        set.insert(FactValue::Number(0.0));
        set.insert(FactValue::Number(-0.0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn ordering_groups_by_kind() {
        let mut values = vec![
            FactValue::text("b"),
            FactValue::Number(3.0),
            FactValue::Empty,
            FactValue::text("a"),
            FactValue::Number(1.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                FactValue::Empty,
                FactValue::Number(1.0),
                FactValue::Number(3.0),
                FactValue::text("a"),
                FactValue::text("b"),
            ]
        );
    }
}
