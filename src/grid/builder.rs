use rayon::prelude::*;

use super::spec::{GridPoint, GridSpec};

/// `n` evenly spaced values over `[start, stop]`, both endpoints included.
/// The last value is pinned to `stop` exactly; `n == 1` yields `[start]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i + 1 == n { stop } else { start + i as f64 * step })
                .collect()
        }
    }
}

impl GridSpec {
    /// Ascending latitude axis values.
    pub fn latitudes(&self) -> Vec<f64> {
        let (min, max) = self.lat_range();
        linspace(min, max, self.lat_steps())
    }

    /// Ascending longitude axis values.
    pub fn longitudes(&self) -> Vec<f64> {
        let (min, max) = self.lon_range();
        linspace(min, max, self.lon_steps())
    }

    /// Full Cartesian product of the two axes in row-major order:
    /// for each latitude (ascending), every longitude (ascending).
    pub fn points(&self) -> Vec<GridPoint> {
        let lats = self.latitudes();
        let lons = self.longitudes();

        let points = lats.par_iter()
            .flat_map_iter(|&lat| lons.iter().map(move |&lon| GridPoint::new(lat, lon)))
            .collect::<Vec<_>>();

        tracing::debug!(lat_steps = lats.len(), lon_steps = lons.len(), points = points.len(), "generated grid points");
        points
    }
}
