//! FILENAME: app/cli/src/cube/utils.rs
use cube_engine::{
    ColumnChoice, ConfigurationError, CubeQuery, Dimension, FilterSelection, Measure,
};
use model::FactValue;

use crate::cube::types::*;

// ============================================================================
// REQUEST PARSING
// ============================================================================

/// Parses a drill-down value typed as text into the value type of the
/// dimension's column ("2023" becomes a number for the year dimension).
pub(crate) fn parse_drill_value(raw: &str, dimension: Dimension) -> FactValue {
    FactValue::parse(raw.trim(), dimension.column().kind())
}

/// Converts a string-keyed request into a typed query.
pub(crate) fn request_to_query(request: &QueryRequest) -> Result<CubeQuery, ConfigurationError> {
    let measure = Measure::from_key(&request.measure)?;
    let rows = Dimension::from_key(&request.rows)?;
    let columns = match &request.columns {
        Some(key) => ColumnChoice::from_key(key)?,
        None => ColumnChoice::None,
    };

    let mut filter = FilterSelection::all();
    filter.year_min = request.year_min;
    filter.year_max = request.year_max;
    if let Some(industries) = &request.industries {
        filter = filter.with_industries(industries.iter().cloned());
    }
    if let Some(statuses) = &request.statuses {
        filter = filter.with_statuses(statuses.iter().cloned());
    }

    Ok(CubeQuery {
        filter,
        measure,
        rows,
        columns,
        drill_value: request
            .drill_value
            .as_deref()
            .map(|raw| parse_drill_value(raw, rows)),
    })
}

// ============================================================================
// OPTION LISTS
// ============================================================================

pub(crate) fn measure_choices() -> Vec<ChoiceItem> {
    Measure::ALL
        .iter()
        .map(|m| ChoiceItem {
            key: m.key().to_string(),
            label: m.label().to_string(),
        })
        .collect()
}

pub(crate) fn dimension_choices() -> Vec<ChoiceItem> {
    Dimension::ALL
        .iter()
        .map(|d| ChoiceItem {
            key: d.key().to_string(),
            label: d.label().to_string(),
        })
        .collect()
}

pub(crate) fn column_choices() -> Vec<ChoiceItem> {
    let mut choices = vec![ChoiceItem {
        key: ColumnChoice::NONE_KEY.to_string(),
        label: "(none)".to_string(),
    }];
    choices.extend(dimension_choices());
    choices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(measure: &str, rows: &str) -> QueryRequest {
        QueryRequest {
            measure: measure.to_string(),
            rows: rows.to_string(),
            ..QueryRequest::default()
        }
    }

    #[test]
    fn parses_a_rollup_request() {
        let query = request_to_query(&request("budget", "industry")).unwrap();
        assert_eq!(query, CubeQuery::rollup(Measure::Budget, Dimension::Industry));
    }

    #[test]
    fn parses_pivot_filters_and_drill() {
        let req = QueryRequest {
            columns: Some("year".to_string()),
            year_min: Some(2023),
            industries: Some(vec!["Tech".to_string()]),
            statuses: Some(vec![]),
            drill_value: Some("Tech".to_string()),
            ..request("actual_cost", "industry")
        };
        let query = request_to_query(&req).unwrap();
        assert_eq!(query.columns, ColumnChoice::Dimension(Dimension::Year));
        assert_eq!(query.filter.year_min, Some(2023));
        assert_eq!(query.filter.year_max, None);
        assert_eq!(query.filter.statuses, Some(Default::default()));
        assert_eq!(query.drill_value, Some(FactValue::text("Tech")));
    }

    #[test]
    fn numeric_dimensions_drill_by_number() {
        assert_eq!(parse_drill_value("2023", Dimension::Year), FactValue::Number(2023.0));
        assert_eq!(parse_drill_value(" 2 ", Dimension::Quarter), FactValue::Number(2.0));
        assert_eq!(parse_drill_value("2023", Dimension::Team), FactValue::text("2023"));
    }

    #[test]
    fn unknown_keys_are_configuration_errors() {
        assert_eq!(
            request_to_query(&request("revenue", "industry")),
            Err(ConfigurationError::UnknownMeasure("revenue".to_string()))
        );
        assert_eq!(
            request_to_query(&request("budget", "region")),
            Err(ConfigurationError::UnknownDimension("region".to_string()))
        );
    }

    #[test]
    fn column_choices_lead_with_none() {
        let choices = column_choices();
        assert_eq!(choices.len(), 9);
        assert_eq!(choices[0].key, "none");
    }
}
