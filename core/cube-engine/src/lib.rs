//! FILENAME: core/cube-engine/src/lib.rs
//! In-memory OLAP engine for the project cube.
//!
//! Operates on a single flattened fact table (see the `model` crate). Every
//! operation is a synchronous transform over borrowed data; nothing here
//! touches the filesystem.
//!
//! Layers:
//! - `definition`: Request types (measures, dimensions, filter selection, query)
//! - `normalize`: Derived display columns (month name, status label)
//! - `filter`: Slice/dice into a borrowed working set
//! - `engine`: Roll-up, pivot and the per-interaction query runner
//! - `drilldown`: Detail rows beneath an aggregated value
//! - `view`: Structured results handed to the presentation layer
//! - `error`: Data-quality and configuration errors

pub mod definition;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod view;

pub use definition::*;
pub use drilldown::{detail_columns, drill_down, drill_values};
pub use engine::{measure_total, pivot, rollup, run_query};
pub use error::{ConfigurationError, CubeError, DataQualityError};
pub use filter::{filter, FilterOptions, WorkingSet, YearRange};
pub use normalize::{month_name, month_ordinal, normalize, parse_full_date, status_label, Locale};
pub use view::*;
