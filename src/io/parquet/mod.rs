//! Parquet tables, same long layout as CSV.
//!
//! Only available with the `parquet` feature.

mod read;
mod write;

pub(crate) use read::*;
pub(crate) use write::*;
