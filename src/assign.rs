use std::ops::Deref;

use rayon::prelude::*;

use crate::{grid::GridPoint, region::{RegionCatalog, RegionId}};

/// A grid point together with the region containing it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub point: GridPoint,
    pub region: Option<RegionId>,
}

impl Assignment {
    #[inline] pub fn new(point: GridPoint, region: Option<RegionId>) -> Self { Self { point, region } }

    #[inline] pub fn is_assigned(&self) -> bool { self.region.is_some() }
}

/// Flat assignment table, in the same order as the grid it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments(Vec<Assignment>);

impl Assignments {
    #[inline] pub fn as_slice(&self) -> &[Assignment] { &self.0 }

    #[inline] pub fn into_inner(self) -> Vec<Assignment> { self.0 }

    /// Number of points that fell inside some region.
    pub fn assigned_count(&self) -> usize {
        self.0.iter().filter(|a| a.is_assigned()).count()
    }

    /// Number of points outside every region.
    pub fn unassigned_count(&self) -> usize {
        self.len() - self.assigned_count()
    }

    /// Points outside every region (ocean, gaps between polygons, ...).
    pub fn unassigned(&self) -> impl Iterator<Item = &GridPoint> {
        self.0.iter().filter(|a| !a.is_assigned()).map(|a| &a.point)
    }
}

impl Deref for Assignments {
    type Target = [Assignment];

    fn deref(&self) -> &[Assignment] { &self.0 }
}

impl From<Vec<Assignment>> for Assignments {
    fn from(assignments: Vec<Assignment>) -> Self { Self(assignments) }
}

impl<'a> IntoIterator for &'a Assignments {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

impl RegionCatalog {
    /// Classify every grid point into its containing region, preserving input order.
    /// Points and catalog must share the same lon/lat convention; no reprojection happens here.
    pub fn assign(&self, points: &[GridPoint]) -> Assignments {
        let assignments = points.par_iter()
            .map(|&point| Assignment::new(point, self.containing_region(point.into()).cloned()))
            .collect::<Vec<_>>();

        let assignments = Assignments(assignments);
        for point in assignments.unassigned() {
            tracing::trace!(lat = point.lat, lon = point.lon, "grid point not inside any region");
        }
        tracing::debug!(
            points = assignments.len(),
            assigned = assignments.assigned_count(),
            unassigned = assignments.unassigned_count(),
            "assigned grid points to regions"
        );

        assignments
    }
}
