//! Distributable entries.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::env::RngOracle;
use crate::filter::{Filter, FilterContext, Filters};
use crate::form::FormRef;

/// Inclusive random count range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomCount {
    pub min: u32,
    pub max: u32,
}

impl RandomCount {
    pub const fn fixed(count: u32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    pub fn roll(&self, rng: &dyn RngOracle) -> u32 {
        rng.range(self.min, self.max.max(self.min))
    }
}

impl Default for RandomCount {
    fn default() -> Self {
        Self::fixed(1)
    }
}

impl core::fmt::Display for RandomCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Placement index for ordered kinds or count for countable ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexOrCount {
    Index(i32),
    Count(RandomCount),
}

impl IndexOrCount {
    pub fn index(&self) -> i32 {
        match self {
            IndexOrCount::Index(index) => *index,
            IndexOrCount::Count(_) => 0,
        }
    }

    /// Draws a count, once per grant.
    pub fn count(&self, rng: &dyn RngOracle) -> u32 {
        match self {
            IndexOrCount::Index(_) => 1,
            IndexOrCount::Count(count) => count.roll(rng),
        }
    }
}

impl Default for IndexOrCount {
    fn default() -> Self {
        IndexOrCount::Count(RandomCount::default())
    }
}

/// A resolved rule entry: what to grant, to whom, and how many.
#[derive(Debug)]
pub struct Distributable {
    pub form: FormRef,
    pub index_or_count: IndexOrCount,
    pub filters: Filters,
    /// Rule file the entry was read from.
    pub path: String,
    /// Outfit entries only: the outfit cannot be replaced by a regular one.
    pub is_final: bool,
    granted: AtomicU32,
}

impl Distributable {
    pub fn new(form: FormRef, filters: Filters, path: impl Into<String>) -> Self {
        Self {
            form,
            index_or_count: IndexOrCount::default(),
            filters,
            path: path.into(),
            is_final: false,
            granted: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_index_or_count(mut self, index_or_count: IndexOrCount) -> Self {
        self.index_or_count = index_or_count;
        self
    }

    #[must_use]
    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// Times this entry was granted since load.
    pub fn granted(&self) -> u32 {
        self.granted.load(Ordering::Relaxed)
    }

    pub(crate) fn record_grant(&self) {
        self.granted.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns true if the entry has a level or skill range.
    pub fn has_level_filters(&self) -> bool {
        self.filters.any_leaf(&Filter::is_level_scaled)
    }

    pub fn is_valid(&self) -> bool {
        self.filters.is_valid::<FilterContext<'_>>()
    }
}

impl core::fmt::Display for Distributable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} @ {} <- {}", self.form, self.path, self.filters)
    }
}
