//! Normalization of region coordinates to WGS84 lon/lat degrees.

use anyhow::{Context, Result};
use geo::{Coord, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{error::{MaskError, MaskResult}, region::Region};

/// EPSG code of the lon/lat convention every grid and catalog uses.
pub const WGS84_LONLAT: u32 = 4326;

const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Build the PROJ.4 string for a supported source EPSG code.
/// - 4326: WGS84 lon/lat; 4269 | 4937: NAD83 lon/lat
/// - 3857: spherical web mercator
/// - 326zz / 327zz: WGS84 UTM north / south; 269zz: NAD83 UTM north
fn source_proj4(epsg: u32) -> MaskResult<String> {
    let utm = |zone: u32, datum: &str, south: bool| {
        let south = if south { " +south" } else { "" };
        format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs")
    };

    match epsg {
        4326 => Ok(WGS84_PROJ4.to_string()),
        4269 | 4937 => Ok("+proj=longlat +datum=NAD83 +no_defs +type=crs".to_string()),
        3857 => Ok("+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs".to_string()),
        32601..=32660 => Ok(utm(epsg - 32600, "WGS84", false)),
        32701..=32760 => Ok(utm(epsg - 32700, "WGS84", true)),
        26901..=26960 => Ok(utm(epsg - 26900, "NAD83", false)),
        _ => Err(MaskError::UnsupportedCrs(epsg)),
    }
}

/// Whether the source CRS is geographic (degrees) rather than projected (meters).
#[inline]
fn is_geographic(epsg: u32) -> bool {
    matches!(epsg, 4326 | 4269 | 4937)
}

/// Check that `epsg` can be normalized, without touching any geometry.
pub fn check_supported_crs(epsg: u32) -> MaskResult<()> {
    source_proj4(epsg).map(|_| ())
}

/// Reproject region geometries from `source_epsg` to WGS84 lon/lat degrees.
/// This is the one up-front conversion; everything downstream assumes lon/lat.
pub(crate) fn normalize_to_lonlat(regions: Vec<Region>, source_epsg: u32) -> Result<Vec<Region>> {
    let proj_string = source_proj4(source_epsg)?;
    if source_epsg == WGS84_LONLAT { return Ok(regions) }

    let from = Proj4::from_proj_string(&proj_string)
        .with_context(|| format!("[io::proj] failed to build source PROJ.4: {proj_string}"))?;
    let to = Proj4::from_proj_string(WGS84_PROJ4)
        .with_context(|| format!("[io::proj] failed to build target PROJ.4: {WGS84_PROJ4}"))?;
    let geographic = is_geographic(source_epsg);

    tracing::debug!(source_epsg, regions = regions.len(), "reprojecting regions to EPSG:4326");

    regions.into_iter()
        .map(|region| -> Result<Region> {
            // Geographic coords go in as radians, projected ones as meters; output is radians.
            let geometry = region.geometry.try_map_coords(|coord: Coord<f64>| {
                let mut point = if geographic {
                    (coord.x.to_radians(), coord.y.to_radians(), 0.0)
                } else {
                    (coord.x, coord.y, 0.0)
                };
                transform(&from, &to, &mut point)?;
                Ok::<_, proj4rs::errors::Error>(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
            })
            .with_context(|| format!("[io::proj] CRS transform failed for region {}", region.id))?;
            Ok(Region { id: region.id, geometry })
        })
        .collect()
}
