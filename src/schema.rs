//! Required-column validation for energy usage tables.

use crate::{
    column_table::ColumnTable,
    error::{TableError, TableResult},
};

pub const DATE: &str = "Date";
pub const TIME: &str = "Time";
pub const APPLIANCE: &str = "Appliance";
pub const ENERGY_CONSUMPTION: &str = "Energy_Consumption";
pub const ROOM: &str = "Room";
pub const STATUS: &str = "Status";
pub const ENERGY_SOURCE: &str = "Energy_Source";

/// Columns that must exist (after alias resolution) before aggregation runs.
pub const REQUIRED_COLUMNS: [&str; 6] = [DATE, TIME, APPLIANCE, ENERGY_CONSUMPTION, ROOM, STATUS];

/// Returns the required columns absent from `table`, in declaration order.
pub fn missing_columns(table: &ColumnTable) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|name| !table.contains(name))
        .map(|name| name.to_string())
        .collect()
}

pub fn validate_schema(table: &ColumnTable) -> TableResult<()> {
    let missing = missing_columns(table);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TableError::MissingColumns { missing })
    }
}
