use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use ndarray::{Array1, Array2};
use polars::{frame::DataFrame, prelude::{Column, DataType, Field, Schema, SchemaRef}};

use crate::{error::MaskError, mask::{build::{axis_index, axis_key, unique_sorted}, WeightMask}};
use crate::region::RegionId;

/// Schema of the long mask table; `region_id` stays a string to keep leading zeros.
pub(super) fn mask_table_schema() -> SchemaRef {
    Arc::new(Schema::from_iter([
        Field::new("lat".into(), DataType::Float64),
        Field::new("lon".into(), DataType::Float64),
        Field::new("region_id".into(), DataType::String),
        Field::new("weight".into(), DataType::Float64),
    ]))
}

impl WeightMask {
    /// Flatten the mask into a long table with one row per cell in row-major order:
    /// `lat`, `lon`, `region_id` (null when unassigned) and `weight`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let n = self.weight.len();
        let mut lats = Vec::with_capacity(n);
        let mut lons = Vec::with_capacity(n);
        let mut ids = Vec::with_capacity(n);
        let mut weights = Vec::with_capacity(n);

        for cell in self.cells() {
            lats.push(cell.lat);
            lons.push(cell.lon);
            ids.push(cell.region.map(RegionId::as_str));
            weights.push(cell.weight);
        }

        DataFrame::new(vec![
            Column::new("lat".into(), lats),
            Column::new("lon".into(), lons),
            Column::new("region_id".into(), ids),
            Column::new("weight".into(), weights),
        ])
        .context("[mask::io] Failed to build mask DataFrame")
    }

    /// Rebuild a mask from the long table produced by [`WeightMask::to_dataframe`].
    /// Rows may come in any order but must cover the lat/lon lattice exactly once.
    /// Weights are checked like [`WeightMask::from_json`] checks them.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
            let column = df.column(name)
                .with_context(|| format!("[mask::io] Missing column '{name}'"))?
                .cast(&DataType::Float64)?;
            column.f64()?.into_iter()
                .enumerate()
                .map(|(row, value)| value.ok_or_else(|| anyhow!("[mask::io] Null '{name}' at row {row}")))
                .collect()
        }

        let lat_values = float_column(df, "lat")?;
        let lon_values = float_column(df, "lon")?;
        let weight_values = float_column(df, "weight")?;
        let ids = df.column("region_id")
            .context("[mask::io] Missing column 'region_id'")?
            .cast(&DataType::String)?;
        let ids = ids.str()?;

        let lat = unique_sorted(lat_values.iter().copied());
        let lon = unique_sorted(lon_values.iter().copied());
        let shape = (lat.len(), lon.len());
        if lat.len() * lon.len() != df.height() {
            return Err(MaskError::shape(shape, format!("{} rows", df.height())).into())
        }

        let lat_index = axis_index(&lat);
        let lon_index = axis_index(&lon);
        let mut region_id = Array2::<Option<RegionId>>::from_elem(shape, None);
        let mut weight = Array2::<f64>::zeros(shape);
        let mut filled = Array2::<bool>::from_elem(shape, false);

        for (row, id) in ids.into_iter().enumerate() {
            let cell = (lat_index[&axis_key(lat_values[row])], lon_index[&axis_key(lon_values[row])]);
            if std::mem::replace(&mut filled[cell], true) {
                return Err(MaskError::shape(shape, format!("cell ({}, {}) listed twice", lat_values[row], lon_values[row])).into())
            }
            region_id[cell] = id.map(RegionId::new);
            weight[cell] = weight_values[row];
        }

        let mask = Self { lat: Array1::from(lat), lon: Array1::from(lon), region_id, weight };
        mask.check_layers()?;
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assign::Assignment, grid::GridPoint};
    use polars::prelude::{NamedFrom, Series};

    fn mask() -> WeightMask {
        let rows = [
            (0.5, 10.0, Some("01001")), (0.5, 11.0, None),
            (1.5, 10.0, Some("01001")), (1.5, 11.0, Some("01003")),
        ];
        let assignments = rows.iter()
            .map(|&(lat, lon, id)| Assignment::new(GridPoint::new(lat, lon), id.map(RegionId::from)))
            .collect::<Vec<_>>();
        WeightMask::from_assignments(&assignments, (2, 2)).unwrap()
    }

    #[test]
    fn dataframe_is_long_and_row_major() {
        let df = mask().to_dataframe().unwrap();

        assert_eq!(df.shape(), (4, 4));
        let lats = df.column("lat").unwrap().f64().unwrap().into_no_null_iter().collect::<Vec<_>>();
        let lons = df.column("lon").unwrap().f64().unwrap().into_no_null_iter().collect::<Vec<_>>();
        let ids = df.column("region_id").unwrap().str().unwrap().into_iter().collect::<Vec<_>>();
        assert_eq!(lats, vec![0.5, 0.5, 1.5, 1.5]);
        assert_eq!(lons, vec![10.0, 11.0, 10.0, 11.0]);
        assert_eq!(ids, vec![Some("01001"), None, Some("01001"), Some("01003")]);
    }

    #[test]
    fn dataframe_rebuilds_the_same_mask() {
        let mask = mask();
        let df = mask.to_dataframe().unwrap();
        assert_eq!(WeightMask::from_dataframe(&df).unwrap(), mask);
    }

    #[test]
    fn inconsistent_weights_are_rejected() {
        let mut df = mask().to_dataframe().unwrap();
        df.replace("weight", Series::new("weight".into(), vec![0.5, 0.25, 0.5, 1.0])).unwrap();
        let err = WeightMask::from_dataframe(&df).unwrap_err();
        assert!(matches!(err.downcast_ref::<MaskError>(), Some(MaskError::Validation { .. })));

        let mut df = mask().to_dataframe().unwrap();
        df.replace("weight", Series::new("weight".into(), vec![0.5, 0.0, 0.5, 2.0])).unwrap();
        assert!(WeightMask::from_dataframe(&df).is_err());
    }

    #[test]
    fn incomplete_table_is_rejected() {
        let df = mask().to_dataframe().unwrap().slice(0, 3);
        let err = WeightMask::from_dataframe(&df).unwrap_err();
        assert!(matches!(err.downcast_ref::<MaskError>(), Some(MaskError::InvalidGridShape { .. })));
    }
}
