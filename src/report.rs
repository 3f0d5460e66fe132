//! Deterministic text rendering of an [`Analysis`].
//!
//! Sections always appear in the same order and every map is walked in key
//! order, so the same table always renders byte-identical text.

use std::fmt::Write as _;

use crate::aggregate::{Analysis, DeviceTotal, SourceExtremes};

pub const REPORT_TITLE: &str = "=== Energy Consumption Analysis Report ===";

/// Returned instead of a report when required columns are missing.
pub const MISSING_COLUMNS_MESSAGE: &str = "Error: Missing required columns for analysis";

/// Sources listed first, in this order, in the extremes section.
pub const KNOWN_SOURCES: [&str; 3] = ["Electric", "Solar", "Battery"];

const STANDBY_TIP: &str =
    "- Turn off devices completely when not in use to cut standby consumption.";
const OFF_PEAK_TIP: &str =
    "- Shift flexible loads such as laundry and dishwashing to off-peak or solar hours.";
const NOT_AVAILABLE: &str = "N/A";

pub fn render_report(analysis: &Analysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{REPORT_TITLE}");
    out.push('\n');

    render_summary(&mut out, analysis);
    render_devices(&mut out, analysis);
    render_rooms(&mut out, analysis);
    render_sources(&mut out, analysis);
    render_recommendations(&mut out, analysis);
    out
}

fn render_summary(out: &mut String, analysis: &Analysis) {
    let summary = &analysis.summary;
    let _ = writeln!(out, "Overall Summary:");
    let _ = writeln!(
        out,
        "- Total Energy Consumption: {:.2} kWh",
        summary.total_consumption
    );
    let _ = writeln!(
        out,
        "- Highest Consumption Device: {}",
        device_total(summary.highest.as_ref())
    );
    let _ = writeln!(
        out,
        "- Lowest Consumption Device: {}",
        device_total(summary.lowest.as_ref())
    );
    out.push('\n');
}

fn device_total(device: Option<&DeviceTotal>) -> String {
    match device {
        Some(device) => format!("{} ({:.2} kWh)", device.appliance, device.total_consumption),
        None => format!("{NOT_AVAILABLE} (0.00 kWh)"),
    }
}

fn render_devices(out: &mut String, analysis: &Analysis) {
    let _ = writeln!(out, "Device Energy Breakdown:");
    for (appliance, stats) in &analysis.devices {
        let _ = writeln!(out, "{appliance}:");
        let _ = writeln!(
            out,
            "  - Total Consumption: {:.2} kWh",
            stats.total_consumption
        );
        let _ = writeln!(out, "  - On Time: {} times", stats.on_time);
        let _ = writeln!(out, "  - Off Time: {} times", stats.off_time);
        let _ = writeln!(
            out,
            "  - Average Consumption: {:.2} kWh",
            stats.average_consumption
        );
    }
    out.push('\n');
}

fn render_rooms(out: &mut String, analysis: &Analysis) {
    let _ = writeln!(out, "Room Energy Distribution:");
    for (room, stats) in &analysis.rooms {
        let _ = writeln!(out, "{room}:");
        let _ = writeln!(
            out,
            "  - Total Consumption: {:.2} kWh",
            stats.total_consumption
        );
        let _ = writeln!(out, "  - Number of Devices: {}", stats.device_count);
    }
    out.push('\n');
}

fn render_sources(out: &mut String, analysis: &Analysis) {
    let Some(sources) = analysis.energy_sources.as_ref() else {
        return;
    };
    let ordered = KNOWN_SOURCES
        .iter()
        .filter_map(|name| sources.get_key_value(*name))
        .chain(
            sources
                .iter()
                .filter(|(name, _)| !KNOWN_SOURCES.contains(&name.as_str())),
        )
        .collect::<Vec<_>>();
    if ordered.is_empty() {
        return;
    }
    let _ = writeln!(out, "Energy Source Extremes:");
    for (source, extremes) in ordered {
        let _ = writeln!(out, "{}", source_line(source, extremes));
    }
    out.push('\n');
}

fn source_line(source: &str, extremes: &SourceExtremes) -> String {
    format!(
        "{}: Most consumption by {} ({:.2}), Least consumption by {} ({:.2})",
        or_not_available(source),
        or_not_available(&extremes.max_appliance),
        extremes.max_consumption,
        or_not_available(&extremes.min_appliance),
        extremes.min_consumption,
    )
}

fn or_not_available(value: &str) -> &str {
    if value.is_empty() { NOT_AVAILABLE } else { value }
}

fn render_recommendations(out: &mut String, analysis: &Analysis) {
    let _ = writeln!(out, "Efficiency Recommendations:");
    match analysis.summary.highest.as_ref() {
        Some(device) => {
            let _ = writeln!(
                out,
                "- Consider optimizing the usage of {}, which has the highest consumption ({:.2} kWh).",
                device.appliance, device.total_consumption
            );
        }
        None => {
            let _ = writeln!(
                out,
                "- No device consumption was recorded; upload more readings for targeted advice."
            );
        }
    }
    let _ = writeln!(out, "{STANDBY_TIP}");
    let _ = writeln!(out, "{OFF_PEAK_TIP}");
}
