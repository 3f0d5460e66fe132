//! Validation, aggregation and rendering wired together, plus the `analyze` command.

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    aggregate::{Analysis, aggregate},
    cli::{AnalyzeArgs, ReportFormat},
    column_table::ColumnTable,
    error::TableResult,
    load_table,
    report::{MISSING_COLUMNS_MESSAGE, render_report},
    schema::validate_schema,
};

/// Validates `table` and aggregates it.
pub fn analyze_table(table: &ColumnTable) -> TableResult<Analysis> {
    validate_schema(table)?;
    Ok(aggregate(table))
}

/// Produces the text report for `table`.
///
/// A table missing any required column yields exactly
/// [`MISSING_COLUMNS_MESSAGE`] rather than a partial report.
pub fn analyze(table: &ColumnTable) -> String {
    match analyze_table(table) {
        Ok(analysis) => render_report(&analysis),
        Err(_) => MISSING_COLUMNS_MESSAGE.to_string(),
    }
}

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let table = load_table(&args.input)?;
    let analysis = match analyze_table(&table) {
        Ok(analysis) => analysis,
        Err(err) => {
            warn!("{err}");
            println!("{MISSING_COLUMNS_MESSAGE}");
            return Err(err).with_context(|| format!("Analyzing {:?}", args.input.input));
        }
    };
    if analysis.coerced_cells > 0 {
        warn!(
            "{} consumption value(s) were not numeric and counted as 0",
            analysis.coerced_cells
        );
    }

    match args.format {
        ReportFormat::Text => print!("{}", render_report(&analysis)),
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&analysis).context("Serializing analysis to JSON")?;
            println!("{json}");
        }
    }
    info!(
        "Analyzed {} row(s) across {} device(s) and {} room(s)",
        analysis.rows,
        analysis.devices.len(),
        analysis.rooms.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::TableError, ingest::ingest_table};

    #[test]
    fn missing_columns_short_circuit_to_fixed_message() {
        let table = ingest_table("Date,Time,Appliance,Room,Status\n2024-01-01,08:00,Fridge,Kitchen,On")
            .expect("ingest");
        assert_eq!(analyze(&table), MISSING_COLUMNS_MESSAGE);
        assert_eq!(
            analyze_table(&table),
            Err(TableError::MissingColumns {
                missing: vec!["Energy_Consumption".to_string()]
            })
        );
    }

    #[test]
    fn valid_table_renders_report() {
        let table = ingest_table(
            "Date,Time,Appliance,Energy_Consumption,Room,Status\n2024-01-01,08:00,Fridge,1.5,Kitchen,On",
        )
        .expect("ingest");
        let report = analyze(&table);
        assert!(report.starts_with(crate::report::REPORT_TITLE));
        assert!(report.contains("- Highest Consumption Device: Fridge (1.50 kWh)"));
    }
}
