use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView2, Zip};

use crate::{error::{MaskError, MaskResult}, region::RegionId};

/// Allowed drift of a region's weight sum from 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Per-region weight mask on a regular lat/lon grid.
///
/// Rows follow the ascending `lat` axis, columns the ascending `lon` axis.
/// Assigned cells carry `1 / n` where `n` is the number of cells assigned to
/// the same region, so each region's weights sum to 1. Unassigned cells hold
/// `None` and weight 0.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMask {
    pub(super) lat: Array1<f64>,
    pub(super) lon: Array1<f64>,
    pub(super) region_id: Array2<Option<RegionId>>,
    pub(super) weight: Array2<f64>,
}

/// A borrowed view of one mask cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskCell<'a> {
    pub lat: f64,
    pub lon: f64,
    pub region: Option<&'a RegionId>,
    pub weight: f64,
}

impl WeightMask {
    /// Ascending latitude axis (rows).
    #[inline] pub fn lat(&self) -> &Array1<f64> { &self.lat }

    /// Ascending longitude axis (columns).
    #[inline] pub fn lon(&self) -> &Array1<f64> { &self.lon }

    /// Region layer; `None` marks cells outside every region.
    #[inline] pub fn region_ids(&self) -> &Array2<Option<RegionId>> { &self.region_id }

    /// Weight layer, co-indexed with `region_ids`.
    #[inline] pub fn weights(&self) -> &Array2<f64> { &self.weight }

    /// Grid shape as (lat, lon).
    #[inline] pub fn shape(&self) -> (usize, usize) { self.weight.dim() }

    /// Look up a single cell by (lat index, lon index).
    pub fn cell(&self, i: usize, j: usize) -> Option<MaskCell<'_>> {
        Some(MaskCell {
            lat: *self.lat.get(i)?,
            lon: *self.lon.get(j)?,
            region: self.region_id.get((i, j))?.as_ref(),
            weight: *self.weight.get((i, j))?,
        })
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = MaskCell<'_>> {
        self.region_id.indexed_iter()
            .zip(self.weight.iter())
            .map(|(((i, j), region), &weight)| MaskCell {
                lat: self.lat[i],
                lon: self.lon[j],
                region: region.as_ref(),
                weight,
            })
    }

    /// Number of cells assigned to each region.
    pub fn region_counts(&self) -> BTreeMap<RegionId, usize> {
        let mut counts = BTreeMap::new();
        for region in self.region_id.iter().flatten() {
            *counts.entry(region.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct regions present in the mask, sorted.
    pub fn regions(&self) -> Vec<RegionId> {
        self.region_counts().into_keys().collect()
    }

    /// Sum of weights per region; each entry is 1 up to rounding.
    pub fn weight_sums(&self) -> BTreeMap<RegionId, f64> {
        let mut sums = BTreeMap::new();
        Zip::from(&self.region_id).and(&self.weight).for_each(|region, &weight| {
            if let Some(region) = region {
                *sums.entry(region.clone()).or_insert(0.0) += weight;
            }
        });
        sums
    }

    /// Number of cells outside every region.
    pub fn unassigned_count(&self) -> usize {
        self.region_id.iter().filter(|region| region.is_none()).count()
    }

    /// Weighted per-region sum of a field sampled on this grid, i.e. the
    /// region mean of the field. `field` must have the mask's (lat, lon) shape.
    pub fn aggregate(&self, field: ArrayView2<'_, f64>) -> MaskResult<BTreeMap<RegionId, f64>> {
        if field.dim() != self.shape() {
            return Err(MaskError::shape(self.shape(), format!("field of shape {:?}", field.dim())))
        }

        let mut totals = BTreeMap::new();
        Zip::from(&self.region_id).and(&self.weight).and(&field).for_each(|region, &weight, &value| {
            if let Some(region) = region {
                *totals.entry(region.clone()).or_insert(0.0) += weight * value;
            }
        });
        Ok(totals)
    }

    /// Check the layers of a mask that was not built by `from_assignments`:
    /// strictly ascending finite axes, weights in `[0, 1]`, zero weight on
    /// unassigned cells and per-region weights summing to 1.
    pub(super) fn check_layers(&self) -> MaskResult<()> {
        for (axis, values) in [("lat", &self.lat), ("lon", &self.lon)] {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(MaskError::shape(self.shape(), format!("non-finite {axis} axis value")))
            }
            if let Some(w) = values.windows(2).into_iter().find(|w| w[0] >= w[1]) {
                return Err(MaskError::shape(self.shape(), format!("{axis} axis not strictly ascending at {} -> {}", w[0], w[1])))
            }
        }

        let mut bad = None;
        Zip::from(&self.region_id).and(&self.weight).for_each(|region, &weight| {
            if bad.is_some() { return }
            if !(0.0..=1.0).contains(&weight) {
                bad = Some(format!("weight {weight} outside [0, 1]"));
            } else if region.is_none() && weight != 0.0 {
                bad = Some(format!("unassigned cell with weight {weight}"));
            }
        });
        if let Some(reason) = bad {
            return Err(MaskError::validation("weight", reason))
        }

        match self.weight_sums().into_iter().find(|(_, sum)| (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE) {
            Some((region, sum)) => Err(MaskError::validation("weight", format!("weights of region {region} sum to {sum}"))),
            None => Ok(()),
        }
    }
}
