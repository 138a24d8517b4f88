//! Buddy pool with timed allocations
//!
//! Owns the free lists and the allocation table of one simulated pool and
//! exposes the allocate / deallocate / tick operations the driver replays
//! requests against.

use alloc::vec::Vec;

#[cfg(feature = "tracking")]
use crate::buddy::MemoryStatsReporter;
use crate::buddy::{order_for_units, Block, BlockPool, NodePoolStats, PoolStats, PooledListIter};
use crate::{AllocError, AllocResult, ProcessId, Tick};

#[cfg(feature = "log")]
use log::{debug, warn};

use super::allocation::{AllocationRecord, AllocationTable};
use super::config::{DuplicatePolicy, ReclaimPolicy, SimConfig};

/// A simulated buddy pool driven by an external clock
///
/// Time only moves forward: `tick` and `allocate` reject a timestamp earlier
/// than the latest one the pool has seen.
pub struct BuddyPool {
    config: SimConfig,
    blocks: BlockPool,
    allocations: AllocationTable,
    now: Tick,
}

impl BuddyPool {
    pub fn new(config: SimConfig) -> AllocResult<Self> {
        Ok(Self {
            config,
            blocks: BlockPool::new(config.total_units)?,
            allocations: AllocationTable::new(),
            now: 0,
        })
    }

    /// Pool of `total_units` with the default policies
    pub fn with_total_units(total_units: usize) -> AllocResult<Self> {
        Self::new(SimConfig::builder().total_units(total_units).build())
    }

    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Latest simulated time seen by the pool
    pub const fn now(&self) -> Tick {
        self.now
    }

    pub const fn max_order(&self) -> usize {
        self.blocks.max_order()
    }

    fn advance_clock(&mut self, requested: Tick) -> AllocResult {
        if requested < self.now {
            warn!(
                "buddy pool: time went backwards from {} to {}",
                self.now, requested
            );
            return Err(AllocError::TimeWentBackwards {
                now: self.now,
                requested,
            });
        }
        self.now = requested;
        Ok(())
    }

    /// Serve a request of `units` for `process_id`, held for `duration` ticks
    ///
    /// The request is rounded up to the next power of two. On success the
    /// granted block is returned and recorded with
    /// `end_time = current_time + duration`.
    pub fn allocate(
        &mut self,
        process_id: ProcessId,
        units: usize,
        current_time: Tick,
        duration: Tick,
    ) -> AllocResult<Block> {
        self.advance_clock(current_time)?;

        let order = order_for_units(units)?;

        if self.config.on_duplicate == DuplicatePolicy::Reject
            && self.allocations.contains(process_id)
        {
            warn!(
                "buddy pool: process {} already holds an allocation",
                process_id
            );
            return Err(AllocError::DuplicateProcess(process_id));
        }

        let block = match self.blocks.alloc_block(order) {
            Ok(block) => block,
            Err(err) => {
                warn!(
                    "buddy pool: allocation failure for process {}: {} units ({})",
                    process_id, units, err
                );
                #[cfg(feature = "tracking")]
                MemoryStatsReporter::print_alloc_failure_stats(&self.stats(), process_id, units);
                return Err(err);
            }
        };

        let record = AllocationRecord::new(process_id, block, current_time, duration);
        if let Some(_previous) = self.allocations.insert(record) {
            warn!(
                "buddy pool: process {} overwritten, {} units at {} never returned",
                process_id, _previous.size, _previous.start
            );
        }

        debug!(
            "buddy pool: process {} granted [{}, {}) until {}",
            process_id,
            block.start,
            block.end(),
            record.end_time
        );
        Ok(block)
    }

    /// Return the allocation of `process_id` to the free lists
    ///
    /// Unknown ids are ignored. Returns the reclaimed record.
    pub fn deallocate(&mut self, process_id: ProcessId) -> Option<AllocationRecord> {
        let record = self.allocations.remove(process_id)?;
        let block = record.block();

        match self.config.reclaim {
            ReclaimPolicy::Coalesce => {
                if let Some(_merged) = self.blocks.free_block_coalescing(block) {
                    debug!(
                        "buddy pool: process {} returned order {} block, merged up to order {} at {}",
                        process_id, block.order, _merged.order, _merged.start
                    );
                }
            }
            ReclaimPolicy::Legacy => {
                // The granted offset is dropped; the block re-enters at offset zero.
                let inserted = self.blocks.free_block(Block::new(block.order, 0));
                debug_assert!(inserted, "recorded block of order {} rejected", block.order);
                debug!(
                    "buddy pool: process {} returned order {} block at offset 0",
                    process_id, block.order
                );
            }
        }

        Some(record)
    }

    /// Advance the clock to `current_time` and reclaim expired allocations
    ///
    /// Returns the reclaimed records, earliest end time first.
    pub fn tick(&mut self, current_time: Tick) -> AllocResult<Vec<AllocationRecord>> {
        self.advance_clock(current_time)?;

        let expired = self.allocations.expired(current_time, self.config.expiry);
        Ok(expired
            .into_iter()
            .filter_map(|process_id| self.deallocate(process_id))
            .collect())
    }

    /// Active allocation of `process_id`, if any
    pub fn allocation(&self, process_id: ProcessId) -> Option<&AllocationRecord> {
        self.allocations.get(process_id)
    }

    /// Active allocations in process id order
    pub fn allocations(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.allocations.iter()
    }

    pub fn active_allocations(&self) -> usize {
        self.allocations.len()
    }

    /// Get the number of free blocks in a specific order
    pub fn free_block_count(&self, order: usize) -> usize {
        self.blocks.free_block_count(order)
    }

    /// Get free blocks of a specific order, in selection order
    pub fn free_blocks(&self, order: usize) -> PooledListIter<'_> {
        self.blocks.free_blocks(order)
    }

    /// Snapshot of free-list and allocation statistics
    pub fn stats(&self) -> PoolStats {
        let mut stats = self.blocks.stats();
        stats.allocated_units = self.allocations.allocated_units();
        stats.active_allocations = self.allocations.len();
        stats
    }

    pub fn node_pool_stats(&self) -> NodePoolStats {
        self.blocks.node_pool_stats()
    }

    /// Drop every allocation and return to a single free block at time zero
    pub fn reset(&mut self) {
        self.blocks.reset();
        self.allocations.clear();
        self.now = 0;
    }
}
