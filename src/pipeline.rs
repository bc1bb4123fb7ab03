//! End-to-end mask generation: catalog, grid, assignment, weights.

use std::path::Path;

use anyhow::{Context, Result};

use crate::{
    assign::Assignments,
    config::MaskConfig,
    error::MaskResult,
    grid::{GridOptions, GridPoint, GridSpec},
    io,
    mask::WeightMask,
    region::RegionCatalog,
};

/// Drives the four stages over one region catalog.
///
/// Every stage returns its result; nothing is cached on the generator, so
/// the same generator can be reused for several grids.
#[derive(Debug, Clone)]
pub struct MaskGenerator {
    catalog: RegionCatalog,
    id_field: String,
}

impl MaskGenerator {
    pub fn new(catalog: RegionCatalog, id_field: impl Into<String>) -> Self {
        Self { catalog, id_field: id_field.into() }
    }

    /// Load a region source, normalize it to lon/lat and build the catalog.
    pub fn from_path(path: &Path, config: &MaskConfig) -> Result<Self> {
        config.validate()?;

        let regions = io::read_regions(path, &config.id_field)?;
        let regions = match config.source_epsg {
            Some(epsg) => io::proj::normalize_to_lonlat(regions, epsg)?,
            None => regions,
        };
        let catalog = RegionCatalog::new(regions)
            .with_context(|| format!("[pipeline] Failed to build region catalog from {}", path.display()))?;

        Ok(Self::new(catalog, config.id_field.clone()))
    }

    #[inline] pub fn catalog(&self) -> &RegionCatalog { &self.catalog }

    /// Attribute the catalog's identifiers were read from.
    #[inline] pub fn id_field(&self) -> &str { &self.id_field }

    /// Resolve grid options against the catalog extent.
    pub fn grid_spec(&self, options: &GridOptions) -> MaskResult<GridSpec> {
        GridSpec::resolve(options, &self.catalog)
    }

    pub fn grid_points(&self, spec: &GridSpec) -> Vec<GridPoint> {
        spec.points()
    }

    pub fn assign(&self, points: &[GridPoint]) -> Assignments {
        self.catalog.assign(points)
    }

    pub fn weight_mask(&self, assignments: &Assignments, spec: &GridSpec) -> MaskResult<WeightMask> {
        WeightMask::from_assignments(assignments, spec.shape())
    }

    /// Run every stage for one set of grid options.
    pub fn generate(&self, options: &GridOptions) -> MaskResult<(GridSpec, WeightMask)> {
        let spec = self.grid_spec(options)?;
        let points = self.grid_points(&spec);
        let assignments = self.assign(&points);
        let mask = self.weight_mask(&assignments, &spec)?;

        tracing::info!(
            lat_steps = spec.lat_steps(),
            lon_steps = spec.lon_steps(),
            regions = self.catalog.len(),
            assigned = assignments.assigned_count(),
            unassigned = assignments.unassigned_count(),
            "generated weight mask"
        );
        Ok((spec, mask))
    }
}
