//! FILENAME: app/cli/src/lib.rs
// PURPOSE: Library entry point for the `cube` tool.
// CONTEXT: Export (source -> merge -> snapshot -> publish) and query
// (snapshot -> normalize -> filter -> aggregate -> drill) share this crate;
// the binary only parses arguments and dispatches.

pub mod cli;
pub mod config;
pub mod cube;
pub mod export;
pub mod logging;
pub mod publish;
pub mod render;
pub mod source;

pub use config::{CubeConfig, PublishConfig, SourceConfig};
pub use cube::{cube_options, query_cube, CubeState, OptionsResponse, QueryError, QueryRequest};
pub use export::{run_export, ExportError, ExportSummary, PublishStatus};
pub use publish::{GitPublisher, NoopPublisher, PublishError, Publisher};
pub use source::{CsvFactSource, FactSource, SourceError, StaticFactSource};

/// Parses the process arguments and runs the selected command.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
