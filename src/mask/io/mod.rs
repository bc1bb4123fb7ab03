//! Weight mask export and import.
//!
//! Implemented here rather than in `crate::io` since it requires access to private fields.

mod json;
mod table;

use std::{fmt, path::Path};

use anyhow::{bail, Context, Result};

use crate::{io, mask::WeightMask};

/// On-disk layouts for a weight mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskFormat {
    /// Long table, one row per cell.
    Csv,
    /// Long table, one row per cell (requires the `parquet` feature).
    Parquet,
    /// Structured grid with axes and 2-D layers.
    Json,
}

impl MaskFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            Some("json") => Ok(Self::Json),
            _ => bail!("[mask::io] Unsupported mask format (expected .csv, .parquet or .json): {}", path.display()),
        }
    }
}

impl fmt::Display for MaskFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Parquet => write!(f, "parquet"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl WeightMask {
    /// Write the mask to `path`, choosing the format by extension.
    pub fn write(&self, path: &Path) -> Result<()> {
        match MaskFormat::from_path(path)? {
            MaskFormat::Csv => self.write_csv(path),
            MaskFormat::Parquet => self.write_parquet(path),
            MaskFormat::Json => self.write_json(path),
        }
    }

    /// Read a mask from `path`, choosing the format by extension.
    pub fn read(path: &Path) -> Result<Self> {
        match MaskFormat::from_path(path)? {
            MaskFormat::Csv => Self::read_csv(path),
            MaskFormat::Parquet => Self::read_parquet(path),
            MaskFormat::Json => Self::read_json(path),
        }
    }

    /// Write the long mask table as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        io::csv::write_csv(&mut self.to_dataframe()?, path)
    }

    /// Render the long mask table as a CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        io::csv::write_csv_string(&mut self.to_dataframe()?)
    }

    /// Read a long mask table from CSV.
    pub fn read_csv(path: &Path) -> Result<Self> {
        Self::from_dataframe(&io::csv::read_csv_with_schema(path, table::mask_table_schema())?)
    }

    /// Write the long mask table as Parquet.
    #[cfg(feature = "parquet")]
    pub fn write_parquet(&self, path: &Path) -> Result<()> {
        io::parquet::write_parquet(&mut self.to_dataframe()?, path)
    }

    #[cfg(not(feature = "parquet"))]
    pub fn write_parquet(&self, path: &Path) -> Result<()> {
        bail!("[mask::io] Parquet support is disabled; cannot write {}", path.display())
    }

    /// Read a long mask table from Parquet.
    #[cfg(feature = "parquet")]
    pub fn read_parquet(path: &Path) -> Result<Self> {
        Self::from_dataframe(&io::parquet::read_parquet(path)?)
    }

    #[cfg(not(feature = "parquet"))]
    pub fn read_parquet(path: &Path) -> Result<Self> {
        bail!("[mask::io] Parquet support is disabled; cannot read {}", path.display())
    }

    /// Write the structured-grid JSON layout.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("[mask::io] Failed to write JSON to {}", path.display()))
    }

    /// Read the structured-grid JSON layout.
    pub fn read_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("[mask::io] Failed to read {}", path.display()))?;
        Self::from_json(&json)
    }
}
