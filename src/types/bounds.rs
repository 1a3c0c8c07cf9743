//! Geographic bounding box in WGS84 coordinates.

use std::fmt;

/// Geographic bounding box in WGS84 lat/lon degrees.
///
/// # Example
///
/// ```
/// use driftcast::types::GeoBoundingBox;
///
/// let bbox = GeoBoundingBox::new(34.0, 31.0, 35.0, 32.0);
/// assert!(bbox.contains(31.5, 34.5));
///
/// // Expand by half a degree on every side
/// let buffered = bbox.buffered(0.5);
/// assert_eq!(buffered.min_lon, 33.5);
/// assert_eq!(buffered.max_lat, 32.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundingBox {
    /// Minimum longitude (western edge) in degrees
    pub min_lon: f64,
    /// Minimum latitude (southern edge) in degrees
    pub min_lat: f64,
    /// Maximum longitude (eastern edge) in degrees
    pub max_lon: f64,
    /// Maximum latitude (northern edge) in degrees
    pub max_lat: f64,
}

impl GeoBoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Smallest box covering all `(lat, lon)` points.
    ///
    /// Returns `None` for an empty iterator. A single point yields a
    /// degenerate (zero-area) box; use [`buffered`](Self::buffered) to
    /// give it extent.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lat0, lon0) = iter.next()?;
        let mut bbox = Self::new(lon0, lat0, lon0, lat0);
        for (lat, lon) in iter {
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        Some(bbox)
    }

    /// Check if a point is within this bounding box (inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Get the center of the bounding box as `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Expand the box by a fixed margin in degrees on every side.
    pub fn buffered(&self, margin_deg: f64) -> Self {
        Self {
            min_lon: self.min_lon - margin_deg,
            min_lat: self.min_lat - margin_deg,
            max_lon: self.max_lon + margin_deg,
            max_lat: self.max_lat + margin_deg,
        }
    }

    /// Longitudinal extent in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitudinal extent in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl fmt::Display for GeoBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon [{:.3}, {:.3}], lat [{:.3}, {:.3}]",
            self.min_lon, self.max_lon, self.min_lat, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_contains() {
        let bbox = GeoBoundingBox::new(8.0, 63.5, 9.5, 64.0);

        assert!(bbox.contains(63.75, 8.75));
        assert!(bbox.contains(63.5, 8.0));
        assert!(!bbox.contains(65.0, 8.75));
        assert!(!bbox.contains(63.75, 10.0));
    }

    #[test]
    fn test_from_points() {
        let points = [(31.3, 34.1), (31.2, 34.4), (31.45, 34.2)];
        let bbox = GeoBoundingBox::from_points(points).unwrap();

        assert!((bbox.min_lon - 34.1).abs() < TOL);
        assert!((bbox.max_lon - 34.4).abs() < TOL);
        assert!((bbox.min_lat - 31.2).abs() < TOL);
        assert!((bbox.max_lat - 31.45).abs() < TOL);
    }

    #[test]
    fn test_from_points_empty() {
        assert!(GeoBoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_single_point_buffered() {
        let bbox = GeoBoundingBox::from_points([(31.3, 34.1)]).unwrap();
        assert_eq!(bbox.width(), 0.0);

        let buffered = bbox.buffered(0.5);
        assert!((buffered.width() - 1.0).abs() < TOL);
        assert!((buffered.height() - 1.0).abs() < TOL);
        assert!(buffered.contains(31.3, 34.1));
    }

    #[test]
    fn test_center() {
        let bbox = GeoBoundingBox::new(8.0, 63.5, 9.5, 64.0);
        let (lat, lon) = bbox.center();
        assert!((lat - 63.75).abs() < TOL);
        assert!((lon - 8.75).abs() < TOL);
    }
}
