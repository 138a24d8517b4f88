//! Simulator configuration.
//!
//! Each policy selects between the corrected behaviour (the default) and the
//! legacy behaviour of the classic buddy simulator, so traces can be replayed
//! either way.

/// Default pool size in units.
pub const DEFAULT_TOTAL_UNITS: usize = 1024;

/// Which allocations a tick reclaims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Reclaim every allocation with `end_time <= now`.
    #[default]
    Sweep,
    /// Reclaim only allocations with `end_time == now`; a skipped end time leaks.
    ExactMatch,
}

/// How a reclaimed block is returned to the free lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReclaimPolicy {
    /// Reinsert at the granted offset and merge with free buddies.
    #[default]
    Coalesce,
    /// Reinsert at offset zero at the allocation's order, no merging.
    Legacy,
}

/// What happens when a process with an active allocation asks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail the request with `DuplicateProcess`.
    #[default]
    Reject,
    /// Replace the record; the earlier block is never returned.
    Overwrite,
}

/// Simulator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Pool size in units, a power of two.
    pub total_units: usize,
    pub expiry: ExpiryPolicy,
    pub reclaim: ReclaimPolicy,
    pub on_duplicate: DuplicatePolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_units: DEFAULT_TOTAL_UNITS,
            expiry: ExpiryPolicy::default(),
            reclaim: ReclaimPolicy::default(),
            on_duplicate: DuplicatePolicy::default(),
        }
    }
}

impl SimConfig {
    /// Create a builder.
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Reproduce the classic simulator: exact-match expiry, zero-offset
    /// reclaim without merging, and silent overwrite of repeated ids.
    pub const fn legacy(total_units: usize) -> Self {
        Self {
            total_units,
            expiry: ExpiryPolicy::ExactMatch,
            reclaim: ReclaimPolicy::Legacy,
            on_duplicate: DuplicatePolicy::Overwrite,
        }
    }
}

/// Builder for `SimConfig`.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    total_units: Option<usize>,
    expiry: Option<ExpiryPolicy>,
    reclaim: Option<ReclaimPolicy>,
    on_duplicate: Option<DuplicatePolicy>,
}

impl SimConfigBuilder {
    /// Set the pool size in units.
    pub const fn total_units(mut self, value: usize) -> Self {
        self.total_units = Some(value);
        self
    }

    /// Set the expiry policy.
    pub const fn expiry(mut self, value: ExpiryPolicy) -> Self {
        self.expiry = Some(value);
        self
    }

    /// Set the reclaim policy.
    pub const fn reclaim(mut self, value: ReclaimPolicy) -> Self {
        self.reclaim = Some(value);
        self
    }

    /// Set the duplicate-process policy.
    pub const fn on_duplicate(mut self, value: DuplicatePolicy) -> Self {
        self.on_duplicate = Some(value);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SimConfig {
        let default = SimConfig::default();
        SimConfig {
            total_units: self.total_units.unwrap_or(default.total_units),
            expiry: self.expiry.unwrap_or(default.expiry),
            reclaim: self.reclaim.unwrap_or(default.reclaim),
            on_duplicate: self.on_duplicate.unwrap_or(default.on_duplicate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.total_units, 1024);
        assert_eq!(config.expiry, ExpiryPolicy::Sweep);
        assert_eq!(config.reclaim, ReclaimPolicy::Coalesce);
        assert_eq!(config.on_duplicate, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_builder_overrides_only_given_fields() {
        let config = SimConfig::builder()
            .total_units(64)
            .expiry(ExpiryPolicy::ExactMatch)
            .build();
        assert_eq!(config.total_units, 64);
        assert_eq!(config.expiry, ExpiryPolicy::ExactMatch);
        assert_eq!(config.reclaim, ReclaimPolicy::Coalesce);
        assert_eq!(config.on_duplicate, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_legacy_preset() {
        let config = SimConfig::legacy(1024);
        assert_eq!(config.expiry, ExpiryPolicy::ExactMatch);
        assert_eq!(config.reclaim, ReclaimPolicy::Legacy);
        assert_eq!(config.on_duplicate, DuplicatePolicy::Overwrite);
    }
}
