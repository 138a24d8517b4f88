//! Buddy block metadata
//!
//! Represents a block of the simulated pool with order and offset information.

use super::order::size_for_order;

/// A block of `2^order` units starting at `start` within the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub order: usize,
    pub start: usize,
}

impl Block {
    /// Create a new block
    pub const fn new(order: usize, start: usize) -> Self {
        Self { order, start }
    }

    /// Size of the block in units
    #[inline]
    pub const fn size(&self) -> usize {
        size_for_order(self.order)
    }

    /// One past the last unit covered by this block
    #[inline]
    pub const fn end(&self) -> usize {
        self.start + self.size()
    }

    /// Offset of this block's buddy
    /// The buddy is the other half of the parent block at the next higher order
    pub const fn buddy_start(&self) -> usize {
        self.start ^ self.size()
    }

    /// Halve the block in place, returning the upper half
    pub fn split(&mut self) -> Block {
        self.order -= 1;
        Block::new(self.order, self.start + self.size())
    }

    /// Whether `[start, end)` of the two blocks overlap
    pub const fn overlaps(&self, other: &Block) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}
