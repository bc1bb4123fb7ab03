use thiserror::Error;

use crate::region::RegionId;

/// Structural errors raised by the mask pipeline.
///
/// Each variant is detected at the stage whose precondition it violates and
/// is returned to the caller unchanged; no stage substitutes defaults.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaskError {
    /// The region source is missing the configured identifier attribute, or
    /// a record carries no usable value for it.
    #[error("region data validation failed for field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Two regions share the same identifier.
    #[error("duplicate region identifier: {0}")]
    DuplicateIdentifier(RegionId),

    /// A grid range or step count is not usable.
    #[error("invalid grid spec: {0}")]
    InvalidGridSpec(String),

    /// The assignment table (or a field) does not match the expected grid shape.
    #[error("invalid grid shape: expected {expected:?}, found {found}")]
    InvalidGridShape { expected: (usize, usize), found: String },

    /// The source coordinate reference system cannot be normalized to lon/lat.
    #[error("unsupported source CRS: EPSG:{0}")]
    UnsupportedCrs(u32),

    /// A source geometry is not areal.
    #[error("unsupported geometry for region {index}: {kind}")]
    UnsupportedGeometry { index: usize, kind: String },
}

impl MaskError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.to_string(), reason: reason.into() }
    }

    pub(crate) fn shape(expected: (usize, usize), found: impl Into<String>) -> Self {
        Self::InvalidGridShape { expected, found: found.into() }
    }
}

pub type MaskResult<T> = std::result::Result<T, MaskError>;
