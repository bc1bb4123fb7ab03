#![doc = "Per-region weight masks on regular latitude/longitude grids"]
mod assign;
mod config;
mod error;
mod grid;
mod mask;
mod pipeline;
mod region;

pub mod io;

#[doc(inline)]
pub use assign::{Assignment, Assignments};

#[doc(inline)]
pub use config::{MaskConfig, DEFAULT_ID_FIELD};

#[doc(inline)]
pub use error::{MaskError, MaskResult};

#[doc(inline)]
pub use grid::{linspace, GridOptions, GridPoint, GridSpec, DEFAULT_STEPS};

#[doc(inline)]
pub use mask::{MaskCell, MaskFormat, WeightMask};

#[doc(inline)]
pub use pipeline::MaskGenerator;

#[doc(inline)]
pub use region::{Bounds, Region, RegionCatalog, RegionId};
