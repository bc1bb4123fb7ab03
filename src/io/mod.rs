//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `shp` - Shapefile region sources
//! - `geojson` - GeoJSON region sources
//! - `proj` - normalization of region coordinates to WGS84 lon/lat
//! - `csv` - CSV format for tabular mask output
//! - `parquet` - Parquet format for tabular mask output (requires `parquet` feature)
//!
//! Weight mask export lives in `mask/io` since it requires access to private fields.

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod proj;
pub(crate) mod shp;

#[cfg(feature = "parquet")]
pub(crate) mod parquet;

use std::path::Path;

use anyhow::{bail, Result};

use crate::region::Region;

/// Read (id, geometry) pairs from a region source, choosing the reader by extension.
/// Every record must carry a usable value in `id_field`.
pub fn read_regions(path: &Path, id_field: &str) -> Result<Vec<Region>> {
    let ext = path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let regions = match ext.as_deref() {
        Some("shp") => shp::read_regions_from_shapefile(path, id_field)?,
        Some("geojson" | "json") => geojson::read_regions_from_geojson(path, id_field)?,
        _ => bail!("[io] Unsupported region source (expected .shp, .geojson or .json): {}", path.display()),
    };

    tracing::info!(path = %path.display(), regions = regions.len(), "read region source");
    Ok(regions)
}

/// List the attribute columns of a region source (first record only).
pub fn region_columns(path: &Path) -> Result<Vec<String>> {
    let ext = path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("shp") => shp::shapefile_columns(path),
        Some("geojson" | "json") => geojson::geojson_columns(path),
        _ => bail!("[io] Unsupported region source (expected .shp, .geojson or .json): {}", path.display()),
    }
}
