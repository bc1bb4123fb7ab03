use ahash::AHashMap;
use ndarray::{Array1, Array2};

use crate::{assign::Assignment, error::{MaskError, MaskResult}, region::RegionId};
use super::WeightMask;

/// Hash key for an axis value; folds -0.0 onto 0.0 so both land in the same cell.
#[inline]
pub(super) fn axis_key(value: f64) -> u64 {
    if value == 0.0 { 0.0_f64.to_bits() } else { value.to_bits() }
}

/// Sorted unique values of one coordinate across the assignment table.
pub(super) fn unique_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values = values.collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Map from axis value to its position along the axis.
pub(super) fn axis_index(axis: &[f64]) -> AHashMap<u64, usize> {
    axis.iter().enumerate().map(|(i, &value)| (axis_key(value), i)).collect()
}

impl WeightMask {
    /// Build the weight mask from a flat assignment table.
    ///
    /// `shape` is the expected (lat_steps, lon_steps). The table must cover
    /// every cell of that lattice exactly once; its unique latitudes and
    /// longitudes become the ascending output axes. Each assigned cell gets
    /// `1 / n`, `n` being the number of cells assigned to its region.
    pub fn from_assignments(assignments: &[Assignment], shape: (usize, usize)) -> MaskResult<Self> {
        let (lat_len, lon_len) = shape;

        if assignments.len() != lat_len * lon_len {
            return Err(MaskError::shape(shape, format!("{} assignments", assignments.len())))
        }
        if let Some(a) = assignments.iter().find(|a| !a.point.lat.is_finite() || !a.point.lon.is_finite()) {
            return Err(MaskError::shape(shape, format!("non-finite coordinate ({}, {})", a.point.lat, a.point.lon)))
        }

        let lat = unique_sorted(assignments.iter().map(|a| a.point.lat));
        let lon = unique_sorted(assignments.iter().map(|a| a.point.lon));
        if (lat.len(), lon.len()) != shape {
            return Err(MaskError::shape(shape, format!("{} unique latitudes and {} unique longitudes", lat.len(), lon.len())))
        }

        // Occurrences of each region across the whole table.
        let mut counts: AHashMap<&RegionId, usize> = AHashMap::new();
        for region in assignments.iter().filter_map(|a| a.region.as_ref()) {
            *counts.entry(region).or_insert(0) += 1;
        }

        let lat_index = axis_index(&lat);
        let lon_index = axis_index(&lon);

        let mut region_id = Array2::<Option<RegionId>>::from_elem(shape, None);
        let mut weight = Array2::<f64>::zeros(shape);
        let mut filled = Array2::<bool>::from_elem(shape, false);

        for a in assignments {
            let cell = (lat_index[&axis_key(a.point.lat)], lon_index[&axis_key(a.point.lon)]);
            if std::mem::replace(&mut filled[cell], true) {
                return Err(MaskError::shape(shape, format!("cell ({}, {}) assigned twice", a.point.lat, a.point.lon)))
            }

            let Some(region) = &a.region else { continue };
            weight[cell] = match counts.get(region) {
                Some(&n) => 1.0 / n as f64,
                None => {
                    tracing::warn!(region = %region, "region missing from count table; using zero weight");
                    0.0
                }
            };
            region_id[cell] = Some(region.clone());
        }

        tracing::debug!(lat = lat_len, lon = lon_len, regions = counts.len(), "built weight mask");

        Ok(Self {
            lat: Array1::from(lat),
            lon: Array1::from(lon),
            region_id,
            weight,
        })
    }
}
