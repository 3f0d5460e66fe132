//! Single-pass aggregation over a validated [`ColumnTable`].
//!
//! One [`Accumulator`] is built per call and consumed by [`Accumulator::finish`],
//! so no statistics survive between analyses. All keyed collections are
//! `BTreeMap`s, which fixes iteration order for tie-breaking and rendering.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::{
    column_table::ColumnTable,
    schema::{APPLIANCE, ENERGY_CONSUMPTION, ENERGY_SOURCE, ROOM, STATUS},
};

/// Status value counted as on-time. Anything else, including an empty cell, is off-time.
pub const STATUS_ON: &str = "On";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceStats {
    pub total_consumption: f64,
    pub on_time: u64,
    pub off_time: u64,
    pub average_consumption: f64,
}

impl DeviceStats {
    fn observe(&mut self, consumption: f64, status: &str) {
        self.total_consumption += consumption;
        if status == STATUS_ON {
            self.on_time += 1;
        } else {
            self.off_time += 1;
        }
    }

    fn finalize(&mut self) {
        let observations = self.on_time + self.off_time;
        self.average_consumption = if observations == 0 {
            0.0
        } else {
            self.total_consumption / observations as f64
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoomStats {
    pub total_consumption: f64,
    pub device_count: u64,
}

/// Largest and smallest single-row consumption seen for one energy source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceExtremes {
    pub max_consumption: f64,
    pub max_appliance: String,
    pub min_consumption: f64,
    pub min_appliance: String,
    pub observations: u64,
}

impl Default for SourceExtremes {
    fn default() -> Self {
        Self {
            max_consumption: 0.0,
            max_appliance: String::new(),
            min_consumption: f64::INFINITY,
            min_appliance: String::new(),
            observations: 0,
        }
    }
}

impl SourceExtremes {
    // Strict comparisons: the first appliance to reach an extreme keeps it on ties.
    fn observe(&mut self, consumption: f64, appliance: &str) {
        self.observations += 1;
        if consumption > self.max_consumption {
            self.max_consumption = consumption;
            self.max_appliance = appliance.to_string();
        }
        if consumption < self.min_consumption {
            self.min_consumption = consumption;
            self.min_appliance = appliance.to_string();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceTotal {
    pub appliance: String,
    pub total_consumption: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_consumption: f64,
    pub highest: Option<DeviceTotal>,
    /// Lowest total among devices that consumed anything at all.
    pub lowest: Option<DeviceTotal>,
}

impl Summary {
    fn from_devices(total_consumption: f64, devices: &BTreeMap<String, DeviceStats>) -> Self {
        let mut highest: Option<DeviceTotal> = None;
        let mut lowest: Option<DeviceTotal> = None;
        for (appliance, stats) in devices {
            let total = stats.total_consumption;
            if highest
                .as_ref()
                .is_none_or(|current| total > current.total_consumption)
            {
                highest = Some(DeviceTotal {
                    appliance: appliance.clone(),
                    total_consumption: total,
                });
            }
            if total > 0.0
                && lowest
                    .as_ref()
                    .is_none_or(|current| total < current.total_consumption)
            {
                lowest = Some(DeviceTotal {
                    appliance: appliance.clone(),
                    total_consumption: total,
                });
            }
        }
        Self {
            total_consumption,
            highest,
            lowest,
        }
    }
}

/// Finished statistics for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub rows: usize,
    /// Consumption cells that did not parse as a finite number and were counted as zero.
    pub coerced_cells: usize,
    pub summary: Summary,
    pub devices: BTreeMap<String, DeviceStats>,
    pub rooms: BTreeMap<String, RoomStats>,
    /// Present only when the table carries an `Energy_Source` column.
    pub energy_sources: Option<BTreeMap<String, SourceExtremes>>,
}

/// Parses a consumption cell, returning `None` for anything that is not a finite number.
pub fn parse_consumption(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

struct Observation<'a> {
    appliance: &'a str,
    room: &'a str,
    status: &'a str,
    source: Option<&'a str>,
    consumption: f64,
}

#[derive(Default)]
struct Accumulator {
    devices: BTreeMap<String, DeviceStats>,
    rooms: BTreeMap<String, RoomStats>,
    sources: Option<BTreeMap<String, SourceExtremes>>,
    total_consumption: f64,
    coerced_cells: usize,
    rows: usize,
}

impl Accumulator {
    fn new(track_sources: bool) -> Self {
        Self {
            sources: track_sources.then(BTreeMap::new),
            ..Self::default()
        }
    }

    fn ingest(&mut self, row: Observation<'_>) {
        self.rows += 1;
        self.total_consumption += row.consumption;
        self.devices
            .entry(row.appliance.to_string())
            .or_default()
            .observe(row.consumption, row.status);
        let room = self.rooms.entry(row.room.to_string()).or_default();
        room.total_consumption += row.consumption;
        room.device_count += 1;
        if let (Some(sources), Some(source)) = (self.sources.as_mut(), row.source) {
            sources
                .entry(source.to_string())
                .or_default()
                .observe(row.consumption, row.appliance);
        }
    }

    fn finish(mut self) -> Analysis {
        for stats in self.devices.values_mut() {
            stats.finalize();
        }
        let summary = Summary::from_devices(self.total_consumption, &self.devices);
        Analysis {
            rows: self.rows,
            coerced_cells: self.coerced_cells,
            summary,
            devices: self.devices,
            rooms: self.rooms,
            energy_sources: self.sources,
        }
    }
}

/// Aggregates every row of `table`.
///
/// Expects a table that passed [`crate::schema::validate_schema`]; absent
/// columns read as empty cells. Never fails: unparseable consumption counts as
/// zero and is tallied in [`Analysis::coerced_cells`].
pub fn aggregate(table: &ColumnTable) -> Analysis {
    let track_sources = table.contains(ENERGY_SOURCE);
    let mut accumulator = Accumulator::new(track_sources);

    for idx in 0..table.row_count() {
        let raw = table.cell(ENERGY_CONSUMPTION, idx);
        let consumption = match parse_consumption(raw) {
            Some(value) => value,
            None => {
                debug!(
                    "Row {}: consumption '{raw}' is not numeric, counting as 0",
                    idx + 2
                );
                accumulator.coerced_cells += 1;
                0.0
            }
        };
        accumulator.ingest(Observation {
            appliance: table.cell(APPLIANCE, idx),
            room: table.cell(ROOM, idx),
            status: table.cell(STATUS, idx),
            source: track_sources.then(|| table.cell(ENERGY_SOURCE, idx)),
            consumption,
        });
    }

    accumulator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_table;

    const HEADER: &str = "Date,Time,Appliance,Energy_Consumption,Room,Status,Energy_Source";

    fn analysis_of(rows: &[&str]) -> Analysis {
        let raw = std::iter::once(HEADER)
            .chain(rows.iter().copied())
            .collect::<Vec<_>>()
            .join("\n");
        aggregate(&ingest_table(&raw).expect("ingest"))
    }

    #[test]
    fn device_counts_split_on_exact_status() {
        let analysis = analysis_of(&[
            "2024-01-01,08:00,Fridge,1.0,Kitchen,On,Electric",
            "2024-01-01,09:00,Fridge,2.0,Kitchen,on,Electric",
            "2024-01-01,10:00,Fridge,3.0,Kitchen,,Electric",
        ]);
        let fridge = &analysis.devices["Fridge"];
        assert_eq!(fridge.on_time, 1);
        assert_eq!(fridge.off_time, 2);
        assert!((fridge.total_consumption - 6.0).abs() < 1e-9);
        assert!((fridge.average_consumption - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rooms_count_every_row() {
        let analysis = analysis_of(&[
            "2024-01-01,08:00,Fridge,1.0,Kitchen,On,Electric",
            "2024-01-01,09:00,Kettle,0.5,Kitchen,Off,Electric",
            "2024-01-01,10:00,Lamp,0.1,Bedroom,On,Solar",
        ]);
        assert_eq!(analysis.rooms["Kitchen"].device_count, 2);
        assert!((analysis.rooms["Kitchen"].total_consumption - 1.5).abs() < 1e-9);
        assert_eq!(analysis.rooms["Bedroom"].device_count, 1);
    }

    #[test]
    fn non_numeric_consumption_counts_as_zero() {
        let analysis = analysis_of(&[
            "2024-01-01,08:00,Fridge,abc,Kitchen,On,Electric",
            "2024-01-01,09:00,Fridge,NaN,Kitchen,On,Electric",
            "2024-01-01,10:00,Fridge, 2.5 ,Kitchen,On,Electric",
        ]);
        assert_eq!(analysis.coerced_cells, 2);
        assert!((analysis.devices["Fridge"].total_consumption - 2.5).abs() < 1e-9);
    }

    #[test]
    fn source_extremes_keep_first_holder_on_ties() {
        let analysis = analysis_of(&[
            "2024-01-01,08:00,Heater,3.0,Lounge,On,Electric",
            "2024-01-01,09:00,Oven,3.0,Kitchen,On,Electric",
            "2024-01-01,10:00,Lamp,0.5,Bedroom,On,Electric",
            "2024-01-01,11:00,Clock,0.5,Bedroom,On,Electric",
        ]);
        let sources = analysis.energy_sources.expect("sources tracked");
        let electric = &sources["Electric"];
        assert_eq!(electric.max_appliance, "Heater");
        assert_eq!(electric.min_appliance, "Lamp");
        assert_eq!(electric.observations, 4);
    }

    #[test]
    fn sources_absent_without_column() {
        let table = ingest_table(
            "Date,Time,Appliance,Energy_Consumption,Room,Status\n2024-01-01,08:00,Fridge,1.5,Kitchen,On",
        )
        .expect("ingest");
        assert_eq!(aggregate(&table).energy_sources, None);
    }

    #[test]
    fn summary_ties_resolve_lexicographically() {
        let analysis = analysis_of(&[
            "2024-01-01,08:00,Oven,2.0,Kitchen,On,Electric",
            "2024-01-01,09:00,Heater,2.0,Lounge,On,Electric",
            "2024-01-01,10:00,Kettle,1.0,Kitchen,On,Electric",
            "2024-01-01,11:00,Toaster,1.0,Kitchen,On,Electric",
        ]);
        let summary = &analysis.summary;
        assert_eq!(summary.highest.as_ref().unwrap().appliance, "Heater");
        assert_eq!(summary.lowest.as_ref().unwrap().appliance, "Kettle");
    }

    #[test]
    fn lowest_skips_zero_totals() {
        let analysis = analysis_of(&[
            "2024-01-01,08:00,Clock,0,Hall,Off,Battery",
            "2024-01-01,09:00,Lamp,0.3,Bedroom,On,Solar",
        ]);
        assert_eq!(analysis.summary.lowest.as_ref().unwrap().appliance, "Lamp");

        let idle = analysis_of(&["2024-01-01,08:00,Clock,0,Hall,Off,Battery"]);
        assert_eq!(idle.summary.lowest, None);
        assert_eq!(idle.summary.highest.as_ref().unwrap().appliance, "Clock");
    }

    #[test]
    fn empty_table_has_zero_totals() {
        let analysis = analysis_of(&[]);
        assert_eq!(analysis.rows, 0);
        assert_eq!(analysis.summary, Summary::default());
        assert!(analysis.devices.is_empty());
        assert_eq!(analysis.energy_sources, Some(BTreeMap::new()));
    }
}
