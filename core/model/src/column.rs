//! FILENAME: core/model/src/column.rs
//! PURPOSE: Catalogue of the known fact view columns.
//! CONTEXT: The warehouse view emits Spanish headers; snapshots written by
//! this workspace use the canonical English names. Both are recognised on
//! load. Columns outside the catalogue are carried through untouched.

use serde::{Deserialize, Serialize};

/// How raw CSV fields of a column are typed on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Decimal,
    Date,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Decimal)
    }
}

/// A known column of the project cube fact view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    FactId,
    Year,
    Quarter,
    FullDate,
    Industry,
    ClientName,
    ProjectType,
    TeamName,
    ProjectName,
    Status,
    Budget,
    ActualCost,
    BudgetDeviation,
    EstimatedHoursTotal,
    ActualHoursTotal,
    DefectsReported,
    DefectCost,
    // Derived by the normalizer, never persisted.
    MonthName,
    StatusLabel,
}

impl Column {
    pub const ALL: [Column; 19] = [
        Column::FactId,
        Column::Year,
        Column::Quarter,
        Column::FullDate,
        Column::Industry,
        Column::ClientName,
        Column::ProjectType,
        Column::TeamName,
        Column::ProjectName,
        Column::Status,
        Column::Budget,
        Column::ActualCost,
        Column::BudgetDeviation,
        Column::EstimatedHoursTotal,
        Column::ActualHoursTotal,
        Column::DefectsReported,
        Column::DefectCost,
        Column::MonthName,
        Column::StatusLabel,
    ];

    /// Canonical header name.
    pub fn name(self) -> &'static str {
        match self {
            Column::FactId => "fact_id",
            Column::Year => "year",
            Column::Quarter => "quarter",
            Column::FullDate => "full_date",
            Column::Industry => "industry",
            Column::ClientName => "client_name",
            Column::ProjectType => "project_type",
            Column::TeamName => "team_name",
            Column::ProjectName => "project_name",
            Column::Status => "status",
            Column::Budget => "budget",
            Column::ActualCost => "actual_cost",
            Column::BudgetDeviation => "budget_deviation",
            Column::EstimatedHoursTotal => "estimated_hours_total",
            Column::ActualHoursTotal => "actual_hours_total",
            Column::DefectsReported => "defects_reported",
            Column::DefectCost => "defect_cost",
            Column::MonthName => "month_name",
            Column::StatusLabel => "status_label",
        }
    }

    /// Header used by the warehouse view for this column.
    pub fn warehouse_alias(self) -> &'static str {
        match self {
            Column::FactId => "id_hecho",
            Column::Year => "anio",
            Column::Quarter => "trimestre",
            Column::FullDate => "fecha_completa",
            Column::Industry => "industria",
            Column::ClientName => "nombre_cliente",
            Column::ProjectType => "tipo_proyecto",
            Column::TeamName => "nombre_equipo",
            Column::ProjectName => "nombre_proyecto",
            Column::Status => "estado",
            Column::Budget => "presupuesto",
            Column::ActualCost => "costo_real",
            Column::BudgetDeviation => "desviacion_presupuestal",
            Column::EstimatedHoursTotal => "horas_estimadas_total",
            Column::ActualHoursTotal => "horas_reales_total",
            Column::DefectsReported => "defectos_reportados",
            Column::DefectCost => "costo_defecto",
            Column::MonthName => "nombre_mes",
            Column::StatusLabel => "estado_texto",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Year | Column::Quarter | Column::Status | Column::DefectsReported => {
                ColumnKind::Integer
            }
            Column::Budget
            | Column::ActualCost
            | Column::BudgetDeviation
            | Column::EstimatedHoursTotal
            | Column::ActualHoursTotal
            | Column::DefectCost => ColumnKind::Decimal,
            Column::FullDate => ColumnKind::Date,
            Column::FactId
            | Column::Industry
            | Column::ClientName
            | Column::ProjectType
            | Column::TeamName
            | Column::ProjectName
            | Column::MonthName
            | Column::StatusLabel => ColumnKind::Text,
        }
    }

    pub fn is_derived(self) -> bool {
        matches!(self, Column::MonthName | Column::StatusLabel)
    }

    /// Resolves a header (canonical or warehouse alias, case-insensitive).
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL.iter().copied().find(|c| {
            c.name().eq_ignore_ascii_case(header) || c.warehouse_alias().eq_ignore_ascii_case(header)
        })
    }
}

/// Maps a header read from a file to the name the table stores it under.
/// Unknown headers are only trimmed.
pub fn canonical_header(header: &str) -> String {
    match Column::from_header(header) {
        Some(column) => column.name().to_string(),
        None => header.trim().to_string(),
    }
}

/// Kind used to type the fields of a header, `Text` for unknown columns.
pub fn header_kind(header: &str) -> ColumnKind {
    Column::from_header(header).map_or(ColumnKind::Text, Column::kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_warehouse_aliases() {
        assert_eq!(Column::from_header("anio"), Some(Column::Year));
        assert_eq!(Column::from_header(" Fecha_Completa "), Some(Column::FullDate));
        assert_eq!(Column::from_header("budget"), Some(Column::Budget));
        assert_eq!(Column::from_header("region"), None);
    }

    #[test]
    fn canonicalises_known_headers_only() {
        assert_eq!(canonical_header("presupuesto"), "budget");
        assert_eq!(canonical_header(" region "), "region");
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Column::ALL.len());
    }
}
