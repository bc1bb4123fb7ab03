use anyhow::{ensure, Context, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::{mask::WeightMask, region::RegionId};

/// Structured-grid JSON layout: two axes and two row-major 2-D layers.
#[derive(Debug, Serialize, Deserialize)]
struct MaskJson {
    lat: Vec<f64>,
    lon: Vec<f64>,
    region_id: Vec<Vec<Option<String>>>,
    weight: Vec<Vec<f64>>,
}

impl WeightMask {
    /// Serialize the mask as a structured grid:
    /// `{"lat": [...], "lon": [...], "region_id": [[...]], "weight": [[...]]}`,
    /// with `null` marking unassigned cells.
    pub fn to_json(&self) -> Result<String> {
        let json = MaskJson {
            lat: self.lat.to_vec(),
            lon: self.lon.to_vec(),
            region_id: self.region_id.rows().into_iter()
                .map(|row| row.iter().map(|id| id.as_ref().map(|id| id.to_string())).collect())
                .collect(),
            weight: self.weight.rows().into_iter().map(|row| row.to_vec()).collect(),
        };
        serde_json::to_string(&json).context("[mask::io::json] Failed to serialize weight mask")
    }

    /// Parse a mask written by [`WeightMask::to_json`]. Axes must be strictly
    /// ascending and the weights must be a valid mask (see [`WeightMask`]).
    pub fn from_json(json: &str) -> Result<Self> {
        let json: MaskJson = serde_json::from_str(json).context("[mask::io::json] Failed to parse weight mask")?;
        let shape = (json.lat.len(), json.lon.len());

        ensure!(json.region_id.len() == shape.0 && json.weight.len() == shape.0,
            "[mask::io::json] Expected {} rows in each layer", shape.0);
        ensure!(json.region_id.iter().all(|row| row.len() == shape.1)
            && json.weight.iter().all(|row| row.len() == shape.1),
            "[mask::io::json] Expected {} columns in each layer", shape.1);

        let region_id = Array2::from_shape_vec(shape, json.region_id.into_iter().flatten().map(|id| id.map(RegionId::from)).collect())?;
        let weight = Array2::from_shape_vec(shape, json.weight.into_iter().flatten().collect())?;

        let mask = Self { lat: Array1::from(json.lat), lon: Array1::from(json.lon), region_id, weight };
        mask.check_layers()?;
        Ok(mask)
    }
}
