//! FILENAME: core/persistence/src/csv_reader.rs

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use model::{canonical_header, header_kind, ColumnKind, FactTable, FactValue};

use crate::PersistenceError;

/// Reads a header row plus records into a `FactTable`.
///
/// Headers are canonicalised (warehouse aliases become the English names)
/// and each field is typed by its column kind. Unknown columns are kept as
/// text. Every record must have as many fields as the header.
pub fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<FactTable, PersistenceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_reader(reader);

    let mut record = StringRecord::new();
    let mut record_index: u64 = 0;

    let has_first = csv_reader
        .read_record(&mut record)
        .map_err(|e| PersistenceError::from_csv_read(e, record_index + 1))?;
    if !has_first {
        return Err(PersistenceError::EmptyInput);
    }
    record_index += 1;

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(record.len());
    for (i, raw) in record.iter().enumerate() {
        let raw = if i == 0 { raw.trim_start_matches('\u{feff}') } else { raw };
        let name = canonical_header(raw);
        if !seen.insert(name.clone()) {
            return Err(PersistenceError::DuplicateColumn(name));
        }
        columns.push(name);
    }
    let kinds: Vec<ColumnKind> = columns.iter().map(|c| header_kind(c)).collect();

    let mut table = FactTable::new(columns);
    loop {
        match csv_reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                record_index += 1;
                let row = record
                    .iter()
                    .zip(&kinds)
                    .map(|(field, kind)| FactValue::parse(field, *kind))
                    .collect();
                table.push_row(row);
            }
            Err(e) => return Err(PersistenceError::from_csv_read(e, record_index + 1)),
        }
    }

    log::debug!(
        "read {} rows x {} columns",
        table.len(),
        table.width()
    );
    Ok(table)
}

/// Loads the comma-separated snapshot at `path`.
pub fn load_snapshot(path: &Path) -> Result<FactTable, PersistenceError> {
    let file = File::open(path)?;
    let table = read_table(BufReader::new(file), b',')?;
    log::info!("loaded snapshot {} ({} rows)", path.display(), table.len());
    Ok(table)
}

/// Like `load_snapshot`, but a missing file is `None` (first export).
pub fn load_snapshot_if_exists(path: &Path) -> Result<Option<FactTable>, PersistenceError> {
    match load_snapshot(path) {
        Ok(table) => Ok(Some(table)),
        Err(PersistenceError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::Column;

    #[test]
    fn canonicalises_warehouse_headers_and_types_fields() {
        let data = "id_hecho,anio,fecha_completa,industria,presupuesto,extra\n\
                    F1,2023,2023-01-05,Tech,100.5,x\n\
                    F2,2024,2024-02-01,,,\n";
        let table = read_table(data.as_bytes(), b',').unwrap();

        assert_eq!(
            table.columns(),
            &["fact_id", "year", "full_date", "industry", "budget", "extra"]
        );
        assert_eq!(table.get(0, Column::Year), &FactValue::Number(2023.0));
        assert_eq!(table.get(0, Column::FactId), &FactValue::text("F1"));
        assert_eq!(table.get(0, Column::FullDate), &FactValue::text("2023-01-05"));
        assert_eq!(table.get(0, Column::Budget), &FactValue::Number(100.5));
        assert_eq!(table.get(1, Column::Industry), &FactValue::Empty);
        assert_eq!(table.get(1, Column::Budget), &FactValue::Empty);
        assert_eq!(table.value(0, 5), &FactValue::text("x"));
    }

    #[test]
    fn whitespace_only_fields_are_empty() {
        let data = "year,budget,industry\n 2023 ,  ,   \n";
        let table = read_table(data.as_bytes(), b',').unwrap();
        assert_eq!(table.get(0, Column::Year), &FactValue::Number(2023.0));
        assert_eq!(table.get(0, Column::Budget), &FactValue::Empty);
        assert_eq!(table.get(0, Column::Industry), &FactValue::Empty);
    }

    #[test]
    fn non_numeric_measure_survives_as_text() {
        let data = "budget\nabc\n";
        let table = read_table(data.as_bytes(), b',').unwrap();
        assert_eq!(table.get(0, Column::Budget), &FactValue::text("abc"));
    }

    #[test]
    fn semicolon_delimiter() {
        let data = "year;industry\n2023;Tech\n";
        let table = read_table(data.as_bytes(), b';').unwrap();
        assert_eq!(table.get(0, Column::Industry), &FactValue::text("Tech"));
    }

    #[test]
    fn header_only_is_an_empty_table() {
        let table = read_table("year,budget\n".as_bytes(), b',').unwrap();
        assert!(table.is_empty());
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            read_table("".as_bytes(), b','),
            Err(PersistenceError::EmptyInput)
        ));
    }

    #[test]
    fn ragged_record_is_a_parse_error() {
        let data = "year,budget\n2023,1\n2024\n";
        assert!(matches!(
            read_table(data.as_bytes(), b','),
            Err(PersistenceError::Parse { .. })
        ));
    }

    #[test]
    fn alias_and_name_collide() {
        let data = "anio,year\n2023,2023\n";
        assert!(matches!(
            read_table(data.as_bytes(), b','),
            Err(PersistenceError::DuplicateColumn(name)) if name == "year"
        ));
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(load_snapshot_if_exists(&path).unwrap().is_none());
        assert!(matches!(load_snapshot(&path), Err(PersistenceError::Io(_))));
    }
}
