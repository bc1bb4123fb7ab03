use std::{fmt, sync::Arc};

/// Stable key for a region, e.g. a county FIPS code such as "31001".
/// Keeps the original text (with leading zeros) but avoids repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(Arc<str>);

impl RegionId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Render a numeric attribute value as an identifier.
    /// Integral values drop the fractional part so `1001.0` and `"1001"` agree.
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            Self::new(format!("{}", value as i64))
        } else {
            Self::new(value.to_string())
        }
    }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self { Self(Arc::from(id)) }
}

impl From<i64> for RegionId {
    fn from(id: i64) -> Self { Self::new(id.to_string()) }
}
