//! CSV tables: the long weight-mask layout.

mod read;
mod write;

pub(crate) use read::*;
pub(crate) use write::*;
