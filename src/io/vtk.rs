//! VTK output for arrival maps.
//!
//! Writes particle endpoints and the arrival polygon as a VTU (XML
//! UnstructuredGrid) file: one vertex cell per endpoint carrying
//! `release_id`, `inside` and `weight` point data, plus a closed
//! polyline for the polygon outline. Viewable in ParaView.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::positions::PositionRecord;
use crate::arrival::ArrivalRegion;

/// Error type for VTK operations.
#[derive(Debug, Error)]
pub enum VtkError {
    /// I/O error during file operations.
    #[error("VTK I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write an arrival map VTU file.
///
/// `weights` pairs with `records` when given; polygon outline points
/// carry `release_id = -1` so they are easy to threshold away.
pub fn write_arrivals_vtu<P: AsRef<Path>>(
    path: P,
    records: &[PositionRecord],
    weights: Option<&[f64]>,
    region: &ArrivalRegion,
) -> Result<(), VtkError> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    let n_particles = records.len();
    let outline = region.coords();
    let n_points = n_particles + outline.len();
    // One vertex cell per particle plus the closed outline polyline
    let n_cells = n_particles + 1;

    writeln!(w, "<?xml version=\"1.0\"?>")?;
    writeln!(
        w,
        "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
    )?;
    writeln!(w, "  <UnstructuredGrid>")?;
    writeln!(
        w,
        "    <Piece NumberOfPoints=\"{}\" NumberOfCells=\"{}\">",
        n_points, n_cells
    )?;

    // Points: endpoints first, then the polygon outline
    writeln!(w, "      <Points>")?;
    writeln!(
        w,
        "        <DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">"
    )?;
    for r in records {
        writeln!(w, "          {:.6} {:.6} 0.0", r.lon, r.lat)?;
    }
    for &(lon, lat) in outline {
        writeln!(w, "          {:.6} {:.6} 0.0", lon, lat)?;
    }
    writeln!(w, "        </DataArray>")?;
    writeln!(w, "      </Points>")?;

    // Cells: vertices for particles, one polyline for the outline
    writeln!(w, "      <Cells>")?;
    writeln!(
        w,
        "        <DataArray type=\"Int64\" Name=\"connectivity\" format=\"ascii\">"
    )?;
    for i in 0..n_particles {
        writeln!(w, "          {}", i)?;
    }
    write!(w, "         ")?;
    for i in 0..outline.len() {
        write!(w, " {}", n_particles + i)?;
    }
    // Close the outline back to its first vertex
    writeln!(w, " {}", n_particles)?;
    writeln!(w, "        </DataArray>")?;

    writeln!(
        w,
        "        <DataArray type=\"Int64\" Name=\"offsets\" format=\"ascii\">"
    )?;
    for i in 0..n_particles {
        writeln!(w, "          {}", i + 1)?;
    }
    writeln!(w, "          {}", n_particles + outline.len() + 1)?;
    writeln!(w, "        </DataArray>")?;

    writeln!(
        w,
        "        <DataArray type=\"UInt8\" Name=\"types\" format=\"ascii\">"
    )?;
    for _ in 0..n_particles {
        writeln!(w, "          1")?; // VTK_VERTEX
    }
    writeln!(w, "          4")?; // VTK_POLY_LINE
    writeln!(w, "        </DataArray>")?;
    writeln!(w, "      </Cells>")?;

    // Point data
    writeln!(w, "      <PointData>")?;

    writeln!(
        w,
        "        <DataArray type=\"Int32\" Name=\"release_id\" format=\"ascii\">"
    )?;
    for r in records {
        writeln!(w, "          {}", r.release_id)?;
    }
    for _ in outline {
        writeln!(w, "          -1")?;
    }
    writeln!(w, "        </DataArray>")?;

    writeln!(
        w,
        "        <DataArray type=\"Int32\" Name=\"inside\" format=\"ascii\">"
    )?;
    for r in records {
        let inside = if region.contains(r.lon, r.lat) { 1 } else { 0 };
        writeln!(w, "          {}", inside)?;
    }
    for _ in outline {
        writeln!(w, "          0")?;
    }
    writeln!(w, "        </DataArray>")?;

    writeln!(
        w,
        "        <DataArray type=\"Float32\" Name=\"weight\" format=\"ascii\">"
    )?;
    for i in 0..n_particles {
        let weight = weights.and_then(|ws| ws.get(i)).copied().unwrap_or(0.0);
        writeln!(w, "          {:.6}", weight)?;
    }
    for _ in outline {
        writeln!(w, "          0.0")?;
    }
    writeln!(w, "        </DataArray>")?;

    writeln!(w, "      </PointData>")?;
    writeln!(w, "    </Piece>")?;
    writeln!(w, "  </UnstructuredGrid>")?;
    writeln!(w, "</VTKFile>")?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_arrivals_vtu() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arrivals.vtu");

        let records = vec![
            PositionRecord {
                release_id: 1,
                lon: 34.25,
                lat: 31.30,
            },
            PositionRecord {
                release_id: 2,
                lon: 35.00,
                lat: 31.30,
            },
        ];
        let region = ArrivalRegion::default_region();

        write_arrivals_vtu(&path, &records, Some(&[1.0, 0.5]), &region).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        // 2 endpoints + 4 polygon vertices, 2 vertex cells + 1 polyline
        assert!(text.contains("NumberOfPoints=\"6\" NumberOfCells=\"3\""));
        assert!(text.contains("Name=\"release_id\""));
        // First particle is inside the default quad, second is not
        let inside_block = text
            .split("Name=\"inside\" format=\"ascii\">")
            .nth(1)
            .unwrap();
        let flags: Vec<&str> = inside_block
            .split("</DataArray>")
            .next()
            .unwrap()
            .split_whitespace()
            .take(2)
            .collect();
        assert_eq!(flags, vec!["1", "0"]);
    }

    #[test]
    fn test_vtu_without_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arrivals.vtu");

        let records = vec![PositionRecord {
            release_id: 1,
            lon: 0.0,
            lat: 0.0,
        }];
        write_arrivals_vtu(&path, &records, None, &ArrivalRegion::default_region()).unwrap();
        assert!(path.exists());
    }
}
