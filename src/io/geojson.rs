//! GeoJSON region sources.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::{error::{MaskError, MaskResult}, region::{Region, RegionId}};

/// Read every feature of a GeoJSON FeatureCollection as a region keyed by `properties[id_field]`.
pub(crate) fn read_regions_from_geojson(path: &Path, id_field: &str) -> Result<Vec<Region>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    read_regions_from_geojson_bytes(&bytes, id_field)
}

/// Read regions from GeoJSON bytes.
pub(crate) fn read_regions_from_geojson_bytes(bytes: &[u8], id_field: &str) -> Result<Vec<Region>> {
    let value: Value = serde_json::from_slice(bytes).context("[io::geojson] Failed to parse GeoJSON")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Expected a FeatureCollection with a 'features' array"))?;

    features.iter().enumerate()
        .map(|(i, feature)| -> Result<Region> {
            let id = feature_region_id(&feature["properties"], id_field, i)?;
            let geometry = parse_geometry(&feature["geometry"], i)?;
            Ok(Region::new(id, geometry))
        })
        .collect()
}

/// Property names of the first feature.
pub(crate) fn geojson_columns(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes).context("[io::geojson] Failed to parse GeoJSON")?;

    let mut columns = value["features"][0]["properties"].as_object()
        .map(|props| props.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    columns.sort();
    Ok(columns)
}

fn feature_region_id(properties: &Value, field: &str, index: usize) -> MaskResult<RegionId> {
    let Some(props) = properties.as_object() else {
        return Err(MaskError::validation(field, format!("feature {index} has no properties")))
    };

    match props.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(RegionId::new(s.trim())),
        Some(Value::Number(n)) => n.as_i64()
            .map(RegionId::from)
            .or_else(|| n.as_f64().map(RegionId::from_number))
            .ok_or_else(|| MaskError::validation(field, format!("feature {index} has an unrepresentable number"))),
        Some(other) => Err(MaskError::validation(field, format!("feature {index} has no usable value ({other})"))),
        None => {
            let mut available = props.keys().map(String::as_str).collect::<Vec<_>>();
            available.sort();
            Err(MaskError::validation(field, format!("missing column; available columns: {}", available.join(", "))))
        }
    }
}

/// Parse a Polygon or MultiPolygon geometry; `null` geometry becomes an empty MultiPolygon.
fn parse_geometry(geometry: &Value, index: usize) -> Result<MultiPolygon<f64>> {
    if geometry.is_null() {
        tracing::warn!(index, "feature without geometry; region will contain no points");
        return Ok(MultiPolygon(vec![]))
    }

    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Feature {index} geometry has no coordinates"))?;

    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon_coords(coords)?])),
        Some("MultiPolygon") => Ok(MultiPolygon(
            coords.iter()
                .map(|polygon| {
                    let rings = polygon.as_array()
                        .ok_or_else(|| anyhow!("[io::geojson] Invalid MultiPolygon member in feature {index}"))?;
                    parse_polygon_coords(rings)
                })
                .collect::<Result<Vec<_>>>()?
        )),
        other => Err(MaskError::UnsupportedGeometry { index, kind: other.unwrap_or("unknown").to_string() }.into()),
    }
}

/// Parse Polygon coordinates: the first ring is the exterior, the rest are holes.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter()
        .map(|ring| {
            ring.as_array()
                .ok_or_else(|| anyhow!("[io::geojson] Invalid ring: expected an array of positions"))
                .and_then(|positions| parse_ring_coords(positions))
        })
        .collect::<Result<Vec<_>>>()?;

    if rings.is_empty() {
        return Ok(Polygon::new(LineString(vec![]), vec![]))
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

/// Parse a ring from GeoJSON positions: [[x, y], [x, y], ...]
fn parse_ring_coords(positions: &[Value]) -> Result<LineString<f64>> {
    let points = positions.iter()
        .map(|position| -> Result<Coord<f64>> {
            let x = position[0].as_f64().ok_or_else(|| anyhow!("[io::geojson] Invalid coordinate: x must be a number"))?;
            let y = position[1].as_f64().ok_or_else(|| anyhow!("[io::geojson] Invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Polygon::new closes the ring if needed
    Ok(LineString(points))
}
