//! Final particle position CSV.

use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::particle::Particle;

/// Error type for position file handling.
#[derive(Debug, Error)]
pub enum PositionError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header
    #[error("Column '{0}' not found in positions header")]
    MissingColumn(String),

    /// Parse error with row number (1-based, excluding the header)
    #[error("Parse error at row {row}: {message}")]
    Parse { row: usize, message: String },
}

/// One particle endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRecord {
    /// Release group identifier
    pub release_id: u32,
    /// Longitude in degrees east
    pub lon: f64,
    /// Latitude in degrees north
    pub lat: f64,
}

/// Write final particle positions as `release_id,lon,lat`.
///
/// Every particle appears, frozen ones at their last position.
pub fn write_positions<P: AsRef<Path>>(path: P, particles: &[Particle]) -> Result<(), PositionError> {
    let file = std::fs::File::create(path)?;
    write_positions_to(file, particles)
}

/// Write positions to any writer.
pub fn write_positions_to<W: Write>(writer: W, particles: &[Particle]) -> Result<(), PositionError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["release_id", "lon", "lat"])?;
    for p in particles {
        csv_writer.write_record([
            p.release_id.to_string(),
            format!("{:.6}", p.lon),
            format!("{:.6}", p.lat),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Read a positions CSV back.
pub fn read_positions<P: AsRef<Path>>(path: P) -> Result<Vec<PositionRecord>, PositionError> {
    let file = std::fs::File::open(path)?;
    read_positions_from(file)
}

/// Read positions from any reader.
pub fn read_positions_from<R: Read>(reader: R) -> Result<Vec<PositionRecord>, PositionError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let id_idx = resolve(&headers, "release_id")?;
    let lon_idx = resolve(&headers, "lon")?;
    let lat_idx = resolve(&headers, "lat")?;

    let mut records = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result?;
        records.push(PositionRecord {
            release_id: parse(&record, id_idx, row, "release_id")?,
            lon: parse(&record, lon_idx, row, "lon")?,
            lat: parse(&record, lat_idx, row, "lat")?,
        });
    }
    Ok(records)
}

fn resolve(headers: &csv::StringRecord, name: &str) -> Result<usize, PositionError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| PositionError::MissingColumn(name.to_string()))
}

fn parse<T: std::str::FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    name: &str,
) -> Result<T, PositionError> {
    let raw = record.get(idx).ok_or_else(|| PositionError::Parse {
        row,
        message: format!("Missing {} value", name),
    })?;
    raw.parse().map_err(|_| PositionError::Parse {
        row,
        message: format!("Invalid {} value '{}'", name, raw),
    })
}
