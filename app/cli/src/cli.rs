//! FILENAME: app/cli/src/cli.rs
//! PURPOSE: Command-line surface of the `cube` binary.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use persistence::MergePolicy;
use serde::Serialize;

use crate::config::CubeConfig;
use crate::cube::{cube_options, query_cube, CubeState, QueryRequest};
use crate::export::run_export;
use crate::logging::{init_log_file, init_logger, set_echo_level};
use crate::publish::{GitPublisher, Publisher};
use crate::render::{render_export, render_options, render_report};
use crate::source::CsvFactSource;
use crate::{log_info, log_warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "cube", about = "Export and explore the project cube snapshot.")]
pub struct Args {
    /// Configuration file (JSON). Defaults to ./cube.json when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Snapshot file, overriding the configuration.
    #[arg(long, global = true, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Echo debug output to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge a fresh fact extract into the snapshot and optionally publish it.
    Export(ExportArgs),
    /// List the filter values and choices the snapshot offers.
    Options {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Roll up, pivot and drill into the snapshot.
    Query(QueryArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    /// Fact extract to read, overriding `source.path`.
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Merge policy: dedupe, append or replace.
    #[arg(long)]
    pub policy: Option<MergePolicy>,

    /// Publish the snapshot even when the configuration disables it.
    #[arg(long)]
    pub publish: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug)]
pub struct QueryArgs {
    /// Measure key (budget, actual_cost, budget_deviation, estimated_hours,
    /// actual_hours, defects_reported, defect_cost).
    #[arg(long, default_value = "budget")]
    pub measure: String,

    /// Row dimension key (year, quarter, month, industry, client,
    /// project_type, team, status).
    #[arg(long, default_value = "industry")]
    pub rows: String,

    /// Column dimension key, or "none" for a roll-up.
    #[arg(long)]
    pub cols: Option<String>,

    #[arg(long)]
    pub year_min: Option<i32>,

    #[arg(long)]
    pub year_max: Option<i32>,

    /// Industry to keep (repeatable); all industries when omitted.
    #[arg(long = "industry")]
    pub industries: Vec<String>,

    /// Status label to keep (repeatable); all statuses when omitted.
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Row-dimension value to drill into.
    #[arg(long)]
    pub drill: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl QueryArgs {
    pub fn to_request(&self) -> QueryRequest {
        let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());
        QueryRequest {
            measure: self.measure.clone(),
            rows: self.rows.clone(),
            columns: self.cols.clone(),
            year_min: self.year_min,
            year_max: self.year_max,
            industries: non_empty(&self.industries),
            statuses: non_empty(&self.statuses),
            drill_value: self.drill.clone(),
        }
    }
}

pub fn run() -> Result<()> {
    run_with_args(Args::parse())
}

pub fn run_with_args(args: Args) -> Result<()> {
    let mut config = CubeConfig::load_or_default(args.config.as_deref())?;
    if let Some(snapshot) = &args.snapshot {
        config.snapshot_path = snapshot.clone();
    }

    set_echo_level(if args.verbose { "D" } else { "W" });
    init_logger(if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
    if let Some(log_path) = &config.log_path {
        init_log_file(log_path).map_err(anyhow::Error::msg)?;
    }

    match args.command {
        Command::Export(export) => cmd_export(config, export),
        Command::Options { format } => {
            let state = CubeState::new(&config.snapshot_path, config.locale);
            let options = cube_options(&state)?;
            emit(format, &options, || render_options(&options))
        }
        Command::Query(query) => {
            let state = CubeState::new(&config.snapshot_path, config.locale);
            let outcome = query_cube(&state, query.to_request())?;
            emit(query.format, &outcome, || render_report(&outcome))
        }
    }
}

fn cmd_export(mut config: CubeConfig, args: ExportArgs) -> Result<()> {
    if let Some(source) = args.source {
        config.source.path = Some(source);
    }
    if let Some(policy) = args.policy {
        config.merge_policy = policy;
    }
    if args.publish {
        config.publish.enabled = true;
    }

    let source = CsvFactSource::from_config(&config.source)?;
    let git = GitPublisher::from_config(&config.publish, &config.snapshot_path);
    let publisher: Option<&dyn Publisher> = if config.publish.enabled {
        Some(&git)
    } else {
        None
    };

    let summary = run_export(&config, &source, publisher)
        .with_context(|| format!("export to {} failed", config.snapshot_path.display()))?;
    if summary.merge.is_empty() {
        log_warn!("CLI", "export wrote an empty snapshot");
    }
    log_info!("CLI", "export finished: {} rows", summary.merge.output_rows);
    emit(args.format, &summary, || render_export(&summary))
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match format {
        OutputFormat::Text => handle.write_all(text().as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut handle, value)?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}
