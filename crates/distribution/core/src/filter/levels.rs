//! Inclusive level ranges.

/// Inclusive range with optional bounds.
///
/// A missing bound is open-ended, so `LevelRange::default()` matches every
/// value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelRange {
    pub min: Option<u16>,
    pub max: Option<u16>,
}

impl LevelRange {
    pub const fn new(min: Option<u16>, max: Option<u16>) -> Self {
        Self { min, max }
    }

    pub const fn at_least(min: u16) -> Self {
        Self::new(Some(min), None)
    }

    pub const fn between(min: u16, max: u16) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: u16) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl core::fmt::Display for LevelRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{min}-{max}"),
            (Some(min), None) => write!(f, "{min}+"),
            (None, Some(max)) => write!(f, "-{max}"),
            (None, None) => f.write_str("any"),
        }
    }
}
