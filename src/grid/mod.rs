mod builder;
mod spec;

pub use builder::linspace;
pub use spec::{GridOptions, GridPoint, GridSpec, DEFAULT_STEPS};
