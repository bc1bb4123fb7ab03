use serde::{Deserialize, Serialize};

use crate::{error::{MaskError, MaskResult}, region::RegionCatalog};
use super::builder::linspace;

/// Step count used for either axis when none is configured.
pub const DEFAULT_STEPS: usize = 100;

/// Optional grid parameters as they arrive from configuration or the CLI.
/// Unset ranges fall back to the region catalog's extent, unset steps to 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridOptions {
    pub lat_range: Option<(f64, f64)>,
    pub lon_range: Option<(f64, f64)>,
    pub lat_steps: Option<usize>,
    pub lon_steps: Option<usize>,
}

impl GridOptions {
    /// Overlay the values set in `other` on top of `self`.
    pub fn merge(&self, other: &GridOptions) -> GridOptions {
        GridOptions {
            lat_range: other.lat_range.or(self.lat_range),
            lon_range: other.lon_range.or(self.lon_range),
            lat_steps: other.lat_steps.or(self.lat_steps),
            lon_steps: other.lon_steps.or(self.lon_steps),
        }
    }
}

/// One sample location of the lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GridPoint {
    #[inline] pub fn new(lat: f64, lon: f64) -> Self { Self { lat, lon } }
}

impl From<GridPoint> for geo::Point<f64> {
    fn from(p: GridPoint) -> Self { geo::Point::new(p.lon, p.lat) }
}

/// A validated regular lat/lon lattice: two inclusive ranges and a step count per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    lat_range: (f64, f64),
    lon_range: (f64, f64),
    lat_steps: usize,
    lon_steps: usize,
}

impl GridSpec {
    /// Validate and construct a grid spec. Ranges must be finite with
    /// `max > min`; step counts must be at least 1 (1 gives a single row or column).
    /// Each span must also be wide enough to hold its steps as distinct `f64` values.
    pub fn new(lat_range: (f64, f64), lon_range: (f64, f64), lat_steps: usize, lon_steps: usize) -> MaskResult<Self> {
        fn check_range(axis: &str, (min, max): (f64, f64), steps: usize) -> MaskResult<()> {
            if !min.is_finite() || !max.is_finite() {
                return Err(MaskError::InvalidGridSpec(format!("{axis} range ({min}, {max}) is not finite")))
            }
            if max <= min {
                return Err(MaskError::InvalidGridSpec(format!("{axis} range ({min}, {max}) has non-positive span")))
            }
            if steps > 1 && !linspace(min, max, steps).windows(2).all(|w| w[0] < w[1]) {
                return Err(MaskError::InvalidGridSpec(format!("{axis} range ({min}, {max}) is too narrow for {steps} distinct steps")))
            }
            Ok(())
        }

        if lat_steps == 0 || lon_steps == 0 {
            return Err(MaskError::InvalidGridSpec(format!("step counts must be positive, got {lat_steps}x{lon_steps}")))
        }
        check_range("lat", lat_range, lat_steps)?;
        check_range("lon", lon_range, lon_steps)?;

        Ok(Self { lat_range, lon_range, lat_steps, lon_steps })
    }

    /// Resolve optional grid parameters against a catalog's bounding extent.
    pub fn resolve(options: &GridOptions, catalog: &RegionCatalog) -> MaskResult<Self> {
        let bounds = catalog.bounds();
        let missing = |axis: &str| {
            MaskError::InvalidGridSpec(format!("no {axis} range given and the region catalog has no extent"))
        };

        let lat_range = match options.lat_range {
            Some(range) => range,
            None => bounds.map(|b| b.lat_range()).ok_or_else(|| missing("lat"))?,
        };
        let lon_range = match options.lon_range {
            Some(range) => range,
            None => bounds.map(|b| b.lon_range()).ok_or_else(|| missing("lon"))?,
        };

        Self::new(
            lat_range,
            lon_range,
            options.lat_steps.unwrap_or(DEFAULT_STEPS),
            options.lon_steps.unwrap_or(DEFAULT_STEPS),
        )
    }

    #[inline] pub fn lat_range(&self) -> (f64, f64) { self.lat_range }
    #[inline] pub fn lon_range(&self) -> (f64, f64) { self.lon_range }
    #[inline] pub fn lat_steps(&self) -> usize { self.lat_steps }
    #[inline] pub fn lon_steps(&self) -> usize { self.lon_steps }

    /// Grid shape as (rows, columns) = (lat_steps, lon_steps).
    #[inline] pub fn shape(&self) -> (usize, usize) { (self.lat_steps, self.lon_steps) }

    /// Total number of grid points.
    #[inline] pub fn point_count(&self) -> usize { self.lat_steps * self.lon_steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn rejects_non_positive_spans() {
        assert!(matches!(GridSpec::new((1.0, 1.0), (0.0, 1.0), 2, 2), Err(MaskError::InvalidGridSpec(_))));
        assert!(matches!(GridSpec::new((0.0, 1.0), (2.0, 1.0), 2, 2), Err(MaskError::InvalidGridSpec(_))));
        assert!(matches!(GridSpec::new((f64::NAN, 1.0), (0.0, 1.0), 2, 2), Err(MaskError::InvalidGridSpec(_))));
    }

    #[test]
    fn rejects_spans_too_narrow_for_the_step_count() {
        let narrow = (1.0, 1.0 + 1e-15);
        assert!(matches!(GridSpec::new(narrow, (0.0, 1.0), 100, 2), Err(MaskError::InvalidGridSpec(_))));
        assert!(matches!(GridSpec::new((0.0, 1.0), narrow, 2, 100), Err(MaskError::InvalidGridSpec(_))));

        // The same span still holds two distinct values, and one step needs none.
        assert!(GridSpec::new(narrow, (0.0, 1.0), 2, 2).is_ok());
        assert!(GridSpec::new(narrow, (0.0, 1.0), 1, 2).is_ok());
    }

    #[test]
    fn rejects_zero_steps() {
        assert!(matches!(GridSpec::new((0.0, 1.0), (0.0, 1.0), 0, 2), Err(MaskError::InvalidGridSpec(_))));
        assert!(matches!(GridSpec::new((0.0, 1.0), (0.0, 1.0), 2, 0), Err(MaskError::InvalidGridSpec(_))));
    }

    #[test]
    fn single_step_is_valid() {
        let spec = GridSpec::new((0.0, 1.0), (0.0, 1.0), 1, 5).unwrap();
        assert_eq!(spec.shape(), (1, 5));
        assert_eq!(spec.point_count(), 5);
    }

    #[test]
    fn resolve_defaults_to_catalog_extent_and_100_steps() {
        let catalog = RegionCatalog::new(vec![Region::new("A", MultiPolygon(vec![polygon![
            (x: -10.0, y: 30.0), (x: -5.0, y: 30.0), (x: -5.0, y: 40.0), (x: -10.0, y: 40.0), (x: -10.0, y: 30.0),
        ]]))]).unwrap();

        let spec = GridSpec::resolve(&GridOptions::default(), &catalog).unwrap();
        assert_eq!(spec.lat_range(), (30.0, 40.0));
        assert_eq!(spec.lon_range(), (-10.0, -5.0));
        assert_eq!(spec.shape(), (DEFAULT_STEPS, DEFAULT_STEPS));

        let options = GridOptions { lat_range: Some((32.0, 33.0)), lon_steps: Some(7), ..Default::default() };
        let spec = GridSpec::resolve(&options, &catalog).unwrap();
        assert_eq!(spec.lat_range(), (32.0, 33.0));
        assert_eq!(spec.lon_range(), (-10.0, -5.0));
        assert_eq!(spec.shape(), (DEFAULT_STEPS, 7));
    }

    #[test]
    fn resolve_without_extent_fails() {
        let catalog = RegionCatalog::new(vec![]).unwrap();
        assert!(matches!(GridSpec::resolve(&GridOptions::default(), &catalog), Err(MaskError::InvalidGridSpec(_))));

        let options = GridOptions { lat_range: Some((0.0, 1.0)), lon_range: Some((0.0, 1.0)), ..Default::default() };
        assert!(GridSpec::resolve(&options, &catalog).is_ok());
    }

    #[test]
    fn merge_prefers_overriding_values() {
        let base = GridOptions { lat_steps: Some(10), lon_steps: Some(20), ..Default::default() };
        let overrides = GridOptions { lon_steps: Some(5), lat_range: Some((0.0, 1.0)), ..Default::default() };
        let merged = base.merge(&overrides);

        assert_eq!(merged.lat_steps, Some(10));
        assert_eq!(merged.lon_steps, Some(5));
        assert_eq!(merged.lat_range, Some((0.0, 1.0)));
        assert_eq!(merged.lon_range, None);
    }
}
