//! FILENAME: core/cube-engine/src/normalize.rs
//! Dimension Normalizer - derives display attributes from raw fact columns.
//!
//! Adds `month_name` (from the month of `full_date`) and `status_label`
//! (from the `status` code or label). Source columns are never touched; derived
//! columns are recomputed from scratch on every call, so normalizing an
//! already normalized table is a no-op.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use model::{Column, FactTable, FactValue};
use serde::{Deserialize, Serialize};

use crate::error::DataQualityError;

/// Language of the derived display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    Spanish,
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const MONTHS_ES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

impl Locale {
    fn months(self) -> &'static [&'static str; 12] {
        match self {
            Locale::English => &MONTHS_EN,
            Locale::Spanish => &MONTHS_ES,
        }
    }

    pub fn in_progress(self) -> &'static str {
        match self {
            Locale::English => "in progress",
            Locale::Spanish => "En progreso",
        }
    }

    pub fn completed(self) -> &'static str {
        match self {
            Locale::English => "completed",
            Locale::Spanish => "Completado",
        }
    }

    pub fn unknown(self) -> &'static str {
        match self {
            Locale::English => "unknown",
            Locale::Spanish => "Desconocido",
        }
    }
}

/// Month name for a 1-based month number.
pub fn month_name(month: u32, locale: Locale) -> Option<&'static str> {
    let idx = month.checked_sub(1)? as usize;
    locale.months().get(idx).copied()
}

/// Calendar position (1-12) of a month name in any supported locale.
pub fn month_ordinal(name: &str) -> Option<u32> {
    [Locale::English, Locale::Spanish].iter().find_map(|locale| {
        locale
            .months()
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|i| i as u32 + 1)
    })
}

/// Status label for a raw status cell.
///
/// The codes 0 and 1 map to in progress and completed. A text cell already
/// holding one of those labels, in either locale and any case, maps to the
/// same label in `locale`. Anything else, including a missing value, maps
/// to the unknown label.
pub fn status_label(status: &FactValue, locale: Locale) -> &'static str {
    let completed = match status {
        FactValue::Number(n) => code_state(*n),
        FactValue::Text(s) => {
            let s = s.trim();
            match s.parse::<f64>() {
                Ok(n) => code_state(n),
                Err(_) => label_state(s),
            }
        }
        FactValue::Empty => None,
    };
    match completed {
        Some(false) => locale.in_progress(),
        Some(true) => locale.completed(),
        None => locale.unknown(),
    }
}

fn code_state(code: f64) -> Option<bool> {
    if code == 0.0 {
        Some(false)
    } else if code == 1.0 {
        Some(true)
    } else {
        None
    }
}

fn label_state(label: &str) -> Option<bool> {
    [Locale::English, Locale::Spanish].iter().find_map(|locale| {
        if label.eq_ignore_ascii_case(locale.completed()) {
            Some(true)
        } else if label.eq_ignore_ascii_case(locale.in_progress()) {
            Some(false)
        } else {
            None
        }
    })
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the calendar date formats the fact view is exported with.
pub fn parse_full_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Returns a copy of `table` with `month_name` and `status_label` derived.
///
/// Fails on the first row whose `full_date` cannot be read; no partial
/// output is produced.
pub fn normalize(table: &FactTable, locale: Locale) -> Result<FactTable, DataQualityError> {
    let date_idx = table
        .index_of(Column::FullDate)
        .ok_or_else(|| DataQualityError::MissingColumn(Column::FullDate.name().to_string()))?;

    let mut months = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let cell = table.value(row, date_idx);
        let raw = cell.display_value();
        let date = parse_full_date(&raw).ok_or_else(|| DataQualityError::UnparseableDate {
            row,
            value: raw.clone(),
        })?;
        // month0() is always 0-11
        months.push(locale.months()[date.month0() as usize]);
    }

    let mut out = table.clone();
    let month_idx = out.ensure_column(Column::MonthName.name());
    let label_idx = out.ensure_column(Column::StatusLabel.name());
    for (row, name) in months.into_iter().enumerate() {
        let label = status_label(table.get(row, Column::Status), locale);
        out.set_value(row, month_idx, FactValue::text(name));
        out.set_value(row, label_idx, FactValue::text(label));
    }

    log::debug!("normalized {} rows ({:?} labels)", out.len(), locale);
    Ok(out)
}
