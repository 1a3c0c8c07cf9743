//! Arrival analysis.
//!
//! Classifies particle endpoints against a target polygon and counts
//! arrivals per release group.

use std::collections::BTreeMap;
use std::fmt;

use geo::{Contains, Coord, LineString, Point, Polygon};
use thiserror::Error;

use crate::io::PositionRecord;

/// Error type for arrival regions.
#[derive(Debug, Error)]
pub enum ArrivalError {
    /// A polygon needs at least three vertices
    #[error("Arrival polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Vertex string could not be parsed
    #[error("Invalid polygon vertex '{0}' (expected lon,lat)")]
    InvalidVertex(String),
}

/// A closed target polygon over (lon, lat) coordinates.
#[derive(Debug, Clone)]
pub struct ArrivalRegion {
    polygon: Polygon<f64>,
    coords: Vec<(f64, f64)>,
}

impl ArrivalRegion {
    /// Build a region from `(lon, lat)` vertices. The ring is closed
    /// automatically.
    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self, ArrivalError> {
        if coords.len() < 3 {
            return Err(ArrivalError::TooFewVertices(coords.len()));
        }
        let ring: Vec<Coord<f64>> = coords.iter().map(|&(x, y)| Coord { x, y }).collect();
        let polygon = Polygon::new(LineString::from(ring), vec![]);
        Ok(Self {
            polygon,
            coords: coords.to_vec(),
        })
    }

    /// Parse vertices from a string of whitespace-separated `lon,lat`
    /// pairs, e.g. `"34.05,31.20 34.45,31.20 34.45,31.45"`.
    pub fn from_vertex_list(text: &str) -> Result<Self, ArrivalError> {
        let mut coords = Vec::new();
        for token in text.split_whitespace() {
            let mut parts = token.split(',');
            let pair = (parts.next(), parts.next(), parts.next());
            let (Some(lon), Some(lat), None) = pair else {
                return Err(ArrivalError::InvalidVertex(token.to_string()));
            };
            let lon: f64 = lon
                .parse()
                .map_err(|_| ArrivalError::InvalidVertex(token.to_string()))?;
            let lat: f64 = lat
                .parse()
                .map_err(|_| ArrivalError::InvalidVertex(token.to_string()))?;
            coords.push((lon, lat));
        }
        Self::from_coords(&coords)
    }

    /// The default arrival quad off the southeastern Mediterranean coast.
    pub fn default_region() -> Self {
        Self::from_coords(&[
            (34.05, 31.20),
            (34.45, 31.20),
            (34.45, 31.45),
            (34.05, 31.45),
        ])
        .expect("default region is a valid quad")
    }

    /// Whether a point lies inside the polygon.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygon.contains(&Point::new(lon, lat))
    }

    /// The polygon vertices as given.
    pub fn coords(&self) -> &[(f64, f64)] {
        &self.coords
    }
}

/// Per-release arrival counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalSummary {
    /// Number of particles inside the polygon, per release id (only ids
    /// with at least one arrival appear)
    pub counts: BTreeMap<u32, usize>,
    /// Total particles inside
    pub inside: usize,
    /// Total particles outside
    pub outside: usize,
}

impl ArrivalSummary {
    /// Total number of classified endpoints.
    pub fn total(&self) -> usize {
        self.inside + self.outside
    }
}

impl fmt::Display for ArrivalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arrival counts within polygon:")?;
        for (release_id, count) in &self.counts {
            writeln!(
                f,
                "release_id {} -> {} particles inside polygon",
                release_id, count
            )?;
        }
        write!(
            f,
            "{} of {} particles inside",
            self.inside,
            self.total()
        )
    }
}

/// Count endpoints inside the region, grouped by release id.
pub fn summarize(region: &ArrivalRegion, records: &[PositionRecord]) -> ArrivalSummary {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut inside = 0usize;

    for record in records {
        if region.contains(record.lon, record.lat) {
            *counts.entry(record.release_id).or_insert(0) += 1;
            inside += 1;
        }
    }

    ArrivalSummary {
        counts,
        inside,
        outside: records.len() - inside,
    }
}
