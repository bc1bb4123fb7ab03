//! Run configuration, loaded from TOML.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::{MaskError, MaskResult}, grid::GridOptions, io::proj};

/// Attribute holding the region identifier when none is configured.
pub const DEFAULT_ID_FIELD: &str = "FIPS";

/// Settings for one mask run.
///
/// ```toml
/// id_field = "GEOID"
/// source_epsg = 4269
///
/// [grid]
/// lat_range = [30.0, 35.0]
/// lat_steps = 200
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskConfig {
    /// Attribute of the region source holding the identifier.
    pub id_field: String,
    /// EPSG code of the region source; `None` means already lon/lat.
    pub source_epsg: Option<u32>,
    pub grid: GridOptions,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            source_epsg: None,
            grid: GridOptions::default(),
        }
    }
}

impl MaskConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("[config] Invalid configuration in {}", path.display()))
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("[config] Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that can be checked before any region data is loaded.
    /// Grid ranges are checked again once the grid is resolved.
    pub fn validate(&self) -> MaskResult<()> {
        if self.id_field.trim().is_empty() {
            return Err(MaskError::validation("id_field", "must not be empty"))
        }
        if let Some(epsg) = self.source_epsg {
            proj::check_supported_crs(epsg)?;
        }
        if self.grid.lat_steps == Some(0) || self.grid.lon_steps == Some(0) {
            return Err(MaskError::InvalidGridSpec("step counts must be positive".to_string()))
        }
        for (axis, range) in [("lat", self.grid.lat_range), ("lon", self.grid.lon_range)] {
            if let Some((min, max)) = range {
                if !(min.is_finite() && max.is_finite() && max > min) {
                    return Err(MaskError::InvalidGridSpec(format!("{axis} range ({min}, {max}) is not a finite increasing range")))
                }
            }
        }
        Ok(())
    }
}
