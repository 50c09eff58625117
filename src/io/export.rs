//! CSV export for recorded forecast and grid-health summaries.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::history::InMemoryHistory;

/// Column header shared by both summary kinds.
const HEADER: &str = "kind,recorded_at,weather_condition,status,current,predicted,\
                      confidence,feeder_utilization,feeder_limit";

/// Exports the full history to a CSV file at the given path.
///
/// Forecast rows come first, then grid health rows, each oldest first.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(history: &InMemoryHistory, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(history, buf)
}

/// Writes the history as CSV to any writer.
///
/// Columns that do not apply to a row kind are left empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(history: &InMemoryHistory, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for f in history.forecasts() {
        wtr.write_record(&[
            f.forecast_type.clone(),
            f.recorded_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            f.weather_condition.clone(),
            String::new(),
            format!("{:.4}", f.current_value),
            format!("{:.4}", f.predicted_value),
            format!("{:.2}", f.confidence),
            String::new(),
            String::new(),
        ])?;
    }

    for g in history.grid_health() {
        wtr.write_record(&[
            "grid_health".to_string(),
            g.recorded_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            String::new(),
            g.status.clone(),
            format!("{:.4}", g.current_load),
            format!("{:.4}", g.peak_prediction),
            String::new(),
            format!("{:.2}", g.feeder_utilization),
            format!("{:.2}", g.feeder_limit),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
