use ahash::AHashSet;
use geo::{BoundingRect, Intersects, MultiPolygon, Point, Rect};
use rstar::{primitives::{GeomWithData, Rectangle}, RTree, AABB};

use crate::error::{MaskError, MaskResult};
use super::id::RegionId;

/// R-tree entry: a region's bounding rectangle tagged with its catalog index.
type IndexedBounds = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// A named polygonal area, e.g. a county keyed by its FIPS code.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub geometry: MultiPolygon<f64>, // lon/lat degrees
}

impl Region {
    pub fn new(id: impl Into<RegionId>, geometry: MultiPolygon<f64>) -> Self {
        Self { id: id.into(), geometry }
    }
}

/// Union bounding box of a set of regions, in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    #[inline] pub fn lat_range(&self) -> (f64, f64) { (self.min_lat, self.max_lat) }
    #[inline] pub fn lon_range(&self) -> (f64, f64) { (self.min_lon, self.max_lon) }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self { min_lon: rect.min().x, min_lat: rect.min().y, max_lon: rect.max().x, max_lat: rect.max().y }
    }
}

/// Immutable, ordered collection of regions with unique identifiers and an
/// R-tree over their bounding boxes for containment queries.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    rtree: RTree<IndexedBounds>,
}

impl RegionCatalog {
    /// Build a catalog, failing on the first identifier seen twice.
    pub fn new(regions: Vec<Region>) -> MaskResult<Self> {
        let mut seen = AHashSet::with_capacity(regions.len());
        for region in &regions {
            if !seen.insert(&region.id) {
                return Err(MaskError::DuplicateIdentifier(region.id.clone()))
            }
        }

        // Empty geometries have no bounding rect and can never contain a point.
        let rtree = RTree::bulk_load(
            regions.iter().enumerate()
                .filter_map(|(i, region)| region.geometry.bounding_rect().map(|rect| {
                    IndexedBounds::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), i)
                }))
                .collect()
        );

        tracing::debug!(regions = regions.len(), indexed = rtree.size(), "built region catalog");
        Ok(Self { regions, rtree })
    }

    /// Get the number of regions.
    #[inline] pub fn len(&self) -> usize { self.regions.len() }

    /// Check if the catalog holds no regions.
    #[inline] pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    /// Regions in catalog order.
    #[inline] pub fn regions(&self) -> &[Region] { &self.regions }

    /// Identifiers in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.iter().map(|region| &region.id)
    }

    /// Look up a region by identifier.
    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|region| &region.id == id)
    }

    /// Union bounding box of all region geometries, or `None` if nothing has extent.
    pub fn bounds(&self) -> Option<Bounds> {
        self.regions.iter()
            .filter_map(|region| region.geometry.bounding_rect())
            .reduce(|a, b| Rect::new(
                geo::Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
            .map(Bounds::from)
    }

    /// Identifier of the region containing `point` (x = lon, y = lat).
    ///
    /// Containment is boundary-inclusive: points on an edge or vertex belong
    /// to the polygon. When several regions qualify (shared edges, overlapping
    /// input), the one earliest in catalog order wins.
    pub fn containing_region(&self, point: Point<f64>) -> Option<&RegionId> {
        let env = AABB::from_point([point.x(), point.y()]);

        self.rtree
            .locate_in_envelope_intersecting(&env)
            .map(|entry| entry.data)
            .filter(|&i| self.regions[i].geometry.intersects(&point))
            .min()
            .map(|i| &self.regions[i].id)
    }
}
