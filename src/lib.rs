pub mod aggregate;
pub mod aliases;
pub mod analyze;
pub mod cli;
pub mod column_table;
pub mod config;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod normalize;
pub mod preview;
pub mod report;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs},
    column_table::ColumnTable,
    config::AnalysisConfig,
    ingest::IngestOptions,
};

pub use crate::{
    aggregate::{Analysis, aggregate},
    analyze::{analyze, analyze_table},
    error::TableError,
    ingest::{ingest_table, ingest_table_with},
    report::render_report,
    schema::validate_schema,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("energy_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Normalize(args) => normalize::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

/// Reads, decodes and ingests the input named by `args`, honouring `--config`.
pub(crate) fn load_table(args: &InputArgs) -> Result<ColumnTable> {
    let config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let options = config.ingest_options(args)?;
    load_table_with(args, &options)
}

pub(crate) fn load_table_with(args: &InputArgs, options: &IngestOptions) -> Result<ColumnTable> {
    info!(
        "Reading '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(options.delimiter)
    );
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let text = io_utils::read_input_text(&args.input, encoding)?;
    debug!(
        "Row shape policy {:?}, {} header alias(es) active",
        options.row_shape,
        options.aliases.len()
    );
    let table = ingest::ingest_table_with(&text, options)
        .with_context(|| format!("Ingesting {:?}", args.input))?;
    info!(
        "Ingested {} row(s) across {} column(s)",
        table.row_count(),
        table.headers().len()
    );
    Ok(table)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
