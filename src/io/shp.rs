//! Shapefile region sources.

use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};

use crate::{error::{MaskError, MaskResult}, region::{Region, RegionId}};

/// Reads all polygon shapes from a `.shp` file, keyed by the `id_field` attribute.
pub(crate) fn read_regions_from_shapefile(path: &Path, id_field: &str) -> Result<Vec<Region>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut regions = Vec::with_capacity(reader.shape_count()?);
    for (i, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp] Error reading shape+record #{i} from {}", path.display()))?;
        let id = record_region_id(&record, id_field, i)?;
        regions.push(Region::new(id, shape_to_geo(shape, i)?));
    }
    Ok(regions)
}

/// Attribute column names of the first record in a `.shp` file.
pub(crate) fn shapefile_columns(path: &Path) -> Result<Vec<String>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    match reader.iter_shapes_and_records().next() {
        Some(result) => {
            let (_, record) = result.context("[io::shp] Error reading first shape+record")?;
            Ok(record_columns(&record))
        }
        None => Ok(Vec::new()),
    }
}

fn record_columns(record: &Record) -> Vec<String> {
    let mut columns = record.clone().into_iter().map(|(name, _)| name).collect::<Vec<_>>();
    columns.sort();
    columns
}

/// Extract the region identifier from a record's `field` attribute.
fn record_region_id(record: &Record, field: &str, index: usize) -> MaskResult<RegionId> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) if !s.trim().is_empty() => Ok(RegionId::new(s.trim())),
        Some(FieldValue::Numeric(Some(n))) => Ok(RegionId::from_number(*n)),
        Some(FieldValue::Float(Some(n))) => Ok(RegionId::from_number(f64::from(*n))),
        Some(FieldValue::Double(n)) => Ok(RegionId::from_number(*n)),
        Some(FieldValue::Integer(n)) => Ok(RegionId::from(i64::from(*n))),
        Some(other) => Err(MaskError::validation(field, format!("record {index} has no usable value ({other:?})"))),
        None => Err(MaskError::validation(
            field,
            format!("missing column; available columns: {}", record_columns(record).join(", ")),
        )),
    }
}

/// Convert a shapefile shape to a lon/lat MultiPolygon. Z and M values are dropped.
fn shape_to_geo(shape: Shape, index: usize) -> MaskResult<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(p) => Ok(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Ok(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Ok(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::NullShape => {
            tracing::warn!(index, "null shape in region source; region will contain no points");
            Ok(MultiPolygon(vec![]))
        }
        other => Err(MaskError::UnsupportedGeometry { index, kind: format!("{:?}", other.shapetype()) }),
    }
}

/// Group shapefile rings into polygons: each outer ring owns the inner rings that follow it.
fn rings_to_geo<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let mut polys = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes = Vec::new();

    for ring in rings {
        let ls = LineString(ring.points().iter().map(&xy).collect());
        match ring {
            PolygonRing::Outer(_) => {
                // flush previous polygon
                if let Some(ext) = current_exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(ls);
            }
            PolygonRing::Inner(_) if current_exterior.is_some() => current_holes.push(ls),
            PolygonRing::Inner(_) => tracing::warn!("inner ring without an outer ring; skipping"),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}
