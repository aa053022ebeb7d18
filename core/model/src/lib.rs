//! FILENAME: core/model/src/lib.rs
//! PURPOSE: Shared data model for the project cube workspace.
//! CONTEXT: Every other crate exchanges fact rows through these types.

pub mod column;
pub mod table;
pub mod value;

pub use column::{canonical_header, header_kind, Column, ColumnKind};
pub use table::{FactTable, Row};
pub use value::FactValue;
