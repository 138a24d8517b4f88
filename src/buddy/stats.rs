//! Statistics and debugging for the buddy pool
//!
//! Provides pool statistics snapshots and failure reporting.

use super::order::{size_for_order, MAX_SUPPORTED_ORDER};

/// Buddy pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total_units: usize,
    pub free_units: usize,
    pub allocated_units: usize,
    pub active_allocations: usize,
    pub max_order: usize,
    pub free_blocks_by_order: [usize; MAX_SUPPORTED_ORDER + 1],
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolStats {
    pub const fn new() -> Self {
        Self {
            total_units: 0,
            free_units: 0,
            allocated_units: 0,
            active_allocations: 0,
            max_order: 0,
            free_blocks_by_order: [0; MAX_SUPPORTED_ORDER + 1],
        }
    }

    /// Whether free and allocated units add up to the pool size
    pub const fn is_conserved(&self) -> bool {
        self.free_units + self.allocated_units == self.total_units
    }

    /// Size of the largest free block, zero when nothing is free
    pub fn largest_free_block(&self) -> usize {
        (0..=self.max_order)
            .rev()
            .find(|&order| self.free_blocks_by_order[order] > 0)
            .map_or(0, size_for_order)
    }
}

/// Detailed memory statistics reporter
pub struct MemoryStatsReporter;

impl MemoryStatsReporter {
    /// Print detailed allocation failure statistics
    /// This is a standalone function to keep allocation logic clean
    #[allow(unused_variables)]
    pub fn print_alloc_failure_stats(stats: &PoolStats, process_id: u32, request_units: usize) {
        #[cfg(feature = "log")]
        use log::error;
        error!("========================================");
        error!(
            "Request: process {} for {} units (largest free block: {})",
            process_id,
            request_units,
            stats.largest_free_block()
        );
        error!("Pool State:");
        error!("  Total units: {}", stats.total_units);
        error!("  Free units: {}", stats.free_units);
        error!(
            "  Allocated units: {} across {} allocations",
            stats.allocated_units, stats.active_allocations
        );
        error!("  Free blocks by order:");

        for order in (0..=stats.max_order).rev() {
            let count = stats.free_blocks_by_order[order];
            if count > 0 {
                error!(
                    "    Order {}: {} blocks ({} units each, {} units total)",
                    order,
                    count,
                    size_for_order(order),
                    count * size_for_order(order)
                );
            }
        }
        error!("========================================");
    }
}
