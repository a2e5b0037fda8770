//! Sizing and growth configuration.

use serde::Deserialize;

use crate::error::TableError;

/// Capacity used when a table is allocated with a hint of 0.
pub const DEFAULT_CAPACITY: usize = 16;

/// Configuration for table sizing and growth.
///
/// A table's insertion budget is `floor(capacity * max_load_factor)`. Once it
/// runs out, capacity is multiplied by `growth_factor` until load falls to
/// `min_load_factor` or below.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Capacity used for a hint of 0
    pub default_capacity: usize,
    /// High-water mark; strictly less than 1
    pub max_load_factor: f64,
    /// Low-water target after growth
    pub min_load_factor: f64,
    /// Capacity multiplier per growth step
    pub growth_factor: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            max_load_factor: 0.9,
            min_load_factor: 0.5,
            growth_factor: 2,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }

    pub fn with_max_load_factor(mut self, factor: f64) -> Self {
        self.max_load_factor = factor;
        self
    }

    pub fn with_min_load_factor(mut self, factor: f64) -> Self {
        self.min_load_factor = factor;
        self
    }

    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.default_capacity == 0 {
            return Err(TableError::InvalidConfig("default_capacity must be non-zero"));
        }
        // NaN fails every comparison below.
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(TableError::InvalidConfig(
                "max_load_factor must lie strictly between 0 and 1",
            ));
        }
        if !(self.min_load_factor > 0.0 && self.min_load_factor < self.max_load_factor) {
            return Err(TableError::InvalidConfig(
                "min_load_factor must lie strictly between 0 and max_load_factor",
            ));
        }
        if self.growth_factor < 2 {
            return Err(TableError::InvalidConfig("growth_factor must be at least 2"));
        }
        Ok(())
    }

    /// Resolve a capacity hint; 0 selects `default_capacity`.
    #[inline]
    pub(crate) fn resolve_capacity(&self, hint: usize) -> usize {
        if hint == 0 {
            self.default_capacity
        } else {
            hint
        }
    }

    /// Insertions a freshly allocated table of `capacity` allows before
    /// growing. Always below `capacity`.
    #[inline]
    pub(crate) fn budget(&self, capacity: usize) -> usize {
        let high = (capacity as f64 * self.max_load_factor) as usize;
        high.min(capacity.saturating_sub(1))
    }

    #[inline]
    pub(crate) fn above_low_water(&self, occupancy: usize, capacity: usize) -> bool {
        occupancy as f64 / capacity as f64 > self.min_load_factor
    }
}
