mod build;
mod io;
mod mask;

pub use io::MaskFormat;
pub use mask::{MaskCell, WeightMask};
