//! Block pool: the per-order free lists of a single buddy pool
//!
//! Implements the splitting and merging core of the buddy system over a
//! pool of `2^max_order` units, using pooled linked lists that draw nodes
//! from one shared node pool.

use crate::{AllocError, AllocResult};

#[cfg(feature = "log")]
use log::{debug, error, info};

use super::{
    buddy_block::Block,
    node_pool::{NodePool, NodePoolStats},
    order::{exact_order, size_for_order, MAX_SUPPORTED_ORDER},
    pooled_list::{PooledLinkedList, PooledListIter},
    stats::PoolStats,
};

/// Free-block bookkeeping for one power-of-two pool
pub struct BlockPool {
    total_units: usize,
    max_order: usize,
    node_pool: NodePool,
    /// Free lists for each order
    free_lists: [PooledLinkedList; MAX_SUPPORTED_ORDER + 1],
}

impl BlockPool {
    /// Create a pool of `total_units` units seeded with one block spanning it
    ///
    /// `total_units` must be a power of two no larger than `2^MAX_SUPPORTED_ORDER`.
    pub fn new(total_units: usize) -> AllocResult<Self> {
        let max_order = match exact_order(total_units) {
            Some(order) if order <= MAX_SUPPORTED_ORDER => order,
            _ => {
                error!(
                    "block pool: size {} is not a power of two up to 2^{}",
                    total_units, MAX_SUPPORTED_ORDER
                );
                return Err(AllocError::InvalidPoolSize(total_units));
            }
        };

        let mut pool = Self {
            total_units,
            max_order,
            node_pool: NodePool::with_capacity(max_order + 1),
            free_lists: [const { PooledLinkedList::new() }; MAX_SUPPORTED_ORDER + 1],
        };
        pool.free_lists[max_order].push_back(&mut pool.node_pool, Block::new(max_order, 0));

        info!(
            "block pool: initialized {} units, max order {}",
            total_units, max_order
        );
        Ok(pool)
    }

    pub const fn max_order(&self) -> usize {
        self.max_order
    }

    pub const fn total_units(&self) -> usize {
        self.total_units
    }

    /// Empty every free list and reseed the single block spanning the pool
    pub fn reset(&mut self) {
        for list in &mut self.free_lists {
            list.clear(&mut self.node_pool);
        }
        self.free_lists[self.max_order]
            .push_back(&mut self.node_pool, Block::new(self.max_order, 0));
    }

    /// Remove and return the first free block of `order`
    pub fn take_block_of_order(&mut self, order: usize) -> Option<Block> {
        if order > self.max_order {
            return None;
        }
        self.free_lists[order].pop_front(&mut self.node_pool)
    }

    /// Append a block to the free list for `order`
    ///
    /// Returns `false`, leaving the lists untouched, when the block does not
    /// belong at `order`.
    #[must_use]
    pub fn insert_block(&mut self, order: usize, block: Block) -> bool {
        if order > self.max_order {
            error!(
                "block pool: order {} exceeds maximum order {}",
                order, self.max_order
            );
            return false;
        }
        if block.order != order {
            error!(
                "block pool: block of order {} filed under order {}",
                block.order, order
            );
            return false;
        }

        self.free_lists[order].push_back(&mut self.node_pool, block);
        true
    }

    /// Remove the free block of `order` starting at `start`, if any
    pub fn take_block_at(&mut self, order: usize, start: usize) -> Option<Block> {
        if order > self.max_order {
            return None;
        }
        let (node_idx, prev_idx) = self.free_lists[order].find_by_start(&self.node_pool, start)?;
        self.free_lists[order].remove_with_prev(&mut self.node_pool, node_idx, prev_idx)
    }

    /// Carve a block of exactly `order` out of the first non-empty list at or above it
    ///
    /// Nothing is removed unless a usable block exists, so a failed attempt
    /// leaves every free list untouched.
    pub fn alloc_block(&mut self, order: usize) -> AllocResult<Block> {
        if order > self.max_order {
            return Err(AllocError::RequestTooLarge {
                order,
                max_order: self.max_order,
            });
        }

        let found = (order..=self.max_order).find(|&i| !self.free_lists[i].is_empty());
        let Some(found) = found else {
            return Err(AllocError::OutOfMemory {
                units: size_for_order(order),
            });
        };

        let Some(mut block) = self.take_block_of_order(found) else {
            error!("block pool: free list for order {} emptied under us", found);
            return Err(AllocError::OutOfMemory {
                units: size_for_order(order),
            });
        };

        // Split down to required order, keeping the lower half
        while block.order > order {
            let buddy = block.split();
            debug!(
                "block pool: split order {} at {}, buddy at {}",
                block.order + 1,
                block.start,
                buddy.start
            );
            let inserted = self.insert_block(buddy.order, buddy);
            debug_assert!(inserted, "split buddy of order {} rejected", buddy.order);
        }

        Ok(block)
    }

    /// Return a block to its free list as-is, without looking for its buddy
    #[must_use]
    pub fn free_block(&mut self, block: Block) -> bool {
        self.insert_block(block.order, block)
    }

    /// Return a block and merge it upward with every free buddy
    ///
    /// Returns the block that finally lands in a free list.
    pub fn free_block_coalescing(&mut self, block: Block) -> Option<Block> {
        if block.order > self.max_order || block.end() > self.total_units {
            error!(
                "block pool: block [{}, {}) outside pool of {} units",
                block.start,
                block.end(),
                self.total_units
            );
            return None;
        }
        if block.start % block.size() != 0 {
            error!(
                "block pool: block at {} is not aligned for order {}",
                block.start, block.order
            );
            return None;
        }

        let mut merged = block;
        while merged.order < self.max_order {
            let buddy_start = merged.buddy_start();
            if self.take_block_at(merged.order, buddy_start).is_none() {
                break;
            }
            debug!(
                "block pool: merged order {} blocks at {} and {}",
                merged.order, merged.start, buddy_start
            );
            merged = Block::new(merged.order + 1, merged.start & buddy_start);
        }

        let inserted = self.insert_block(merged.order, merged);
        debug_assert!(inserted, "merged block of order {} rejected", merged.order);
        Some(merged)
    }

    /// Get the number of blocks in a specific order
    pub fn free_block_count(&self, order: usize) -> usize {
        if order <= self.max_order {
            self.free_lists[order].len()
        } else {
            0
        }
    }

    /// Get free blocks of a specific order, head first
    pub fn free_blocks(&self, order: usize) -> PooledListIter<'_> {
        let list = &self.free_lists[order.min(MAX_SUPPORTED_ORDER)];
        list.iter(&self.node_pool)
    }

    /// Total units held in free lists
    pub fn free_units(&self) -> usize {
        (0..=self.max_order)
            .map(|order| self.free_lists[order].len() * size_for_order(order))
            .sum()
    }

    /// Free-list part of the statistics; allocation counters are left at zero
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats::new();
        stats.total_units = self.total_units;
        stats.max_order = self.max_order;

        for order in 0..=self.max_order {
            let block_count = self.free_lists[order].len();
            stats.free_blocks_by_order[order] = block_count;
            stats.free_units += block_count * size_for_order(order);
        }
        stats
    }

    /// Get node pool statistics
    pub fn node_pool_stats(&self) -> NodePoolStats {
        self.node_pool.get_stats()
    }
}
