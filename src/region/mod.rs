mod catalog;
mod id;

pub use catalog::{Bounds, Region, RegionCatalog};
pub use id::RegionId;
