//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

/// Errors raised while writing exports.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut writer = writer_for_path(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer_for_path(path)?);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub mod snapshot {
    use std::path::Path;

    use sky_ephemeris::BodySnapshot;

    use crate::ExportError;

    /// Write body snapshots as a pretty-printed JSON array.
    pub fn write_snapshot_json(path: &Path, rows: &[BodySnapshot]) -> Result<(), ExportError> {
        crate::write_json(path, rows)
    }

    /// Write body snapshots as CSV with a header row; absent distances are left empty.
    pub fn write_snapshot_csv(path: &Path, rows: &[BodySnapshot]) -> Result<(), ExportError> {
        crate::write_csv(path, rows)
    }
}

pub mod riseset {
    use std::path::Path;

    use serde::Serialize;
    use sky_ephemeris::Planet;

    use crate::ExportError;

    /// One rise or set lookup; `utc` is empty when the event does not occur.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct RiseSetRow {
        pub body: Planet,
        pub event: &'static str,
        pub latitude_deg: f64,
        pub longitude_deg: f64,
        pub utc: Option<String>,
    }

    pub fn write_rise_set_json(path: &Path, rows: &[RiseSetRow]) -> Result<(), ExportError> {
        crate::write_json(path, rows)
    }

    pub fn write_rise_set_csv(path: &Path, rows: &[RiseSetRow]) -> Result<(), ExportError> {
        crate::write_csv(path, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::riseset::{RiseSetRow, write_rise_set_csv};
    use super::snapshot::{write_snapshot_csv, write_snapshot_json};
    use sky_ephemeris::{BodySnapshot, Planet};
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> Vec<BodySnapshot> {
        vec![
            BodySnapshot {
                body: Planet::Mars,
                utc: "2024-01-01T00:00:00Z".into(),
                ra_deg: 250.5,
                dec_deg: -23.1,
                heliocentric_au: Some(1.4),
                geocentric_au: Some(2.3),
                phase_deg: 12.0,
                illuminated_pct: 98.9,
                magnitude: 1.4,
            },
            BodySnapshot {
                body: Planet::Moon,
                utc: "2024-01-01T00:00:00Z".into(),
                ra_deg: 150.0,
                dec_deg: 12.0,
                heliocentric_au: None,
                geocentric_au: None,
                phase_deg: 120.0,
                illuminated_pct: 25.0,
                magnitude: -10.0,
            },
        ]
    }

    #[test]
    fn snapshot_csv_has_header_and_empty_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        write_snapshot_csv(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "body,utc,ra_deg,dec_deg,heliocentric_au,geocentric_au,phase_deg,illuminated_pct,magnitude"
        );
        assert!(lines.next().unwrap().starts_with("mars,2024-01-01T00:00:00Z,250.5,"));
        assert!(lines.next().unwrap().starts_with("moon,2024-01-01T00:00:00Z,150.0,12.0,,,"));
    }

    #[test]
    fn snapshot_json_round_trips_through_serde_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_snapshot_json(&path, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["body"], "mars");
        assert!(value[1]["geocentric_au"].is_null());
    }

    #[test]
    fn rise_set_rows_mark_missing_events() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("riseset.csv");
        let rows = [
            RiseSetRow {
                body: Planet::Sun,
                event: "set",
                latitude_deg: 80.0,
                longitude_deg: 0.0,
                utc: None,
            },
            RiseSetRow {
                body: Planet::Sun,
                event: "rise",
                latitude_deg: 0.0,
                longitude_deg: 0.0,
                utc: Some("2010-03-22T06:05:00Z".into()),
            },
        ];
        write_rise_set_csv(&path, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("sun,set,80.0,0.0,\n"));
        assert!(text.contains("sun,rise,0.0,0.0,2010-03-22T06:05:00Z"));
    }
}
