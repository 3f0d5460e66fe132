//! `normalize` command: writes the ingested table back out with canonical headers.
//!
//! Short rows come out padded, so the result is rectangular and can be fed to
//! tools that expect a fixed schema.

use anyhow::{Context, Result};
use log::info;

use crate::{cli::NormalizeArgs, config::AnalysisConfig, io_utils, load_table_with};

pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let config = match &args.input.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let options = config.ingest_options(&args.input)?;
    let table = load_table_with(&args.input, &options)?;
    let delimiter = args.output_delimiter.unwrap_or(options.delimiter);
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
    table
        .write_csv(&mut writer)
        .with_context(|| format!("Writing normalized table for {:?}", args.input.input))?;
    info!(
        "Normalized {} row(s) across {} column(s)",
        table.row_count(),
        table.headers().len()
    );
    Ok(())
}
