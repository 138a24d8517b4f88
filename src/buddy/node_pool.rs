//! Node pool for the buddy free lists
//!
//! Provides a single arena of list nodes shared across all orders.
//! Released nodes are chained into a free list and recycled before the
//! arena grows, so a long simulation settles at a stable node count.

use alloc::vec::Vec;

use super::buddy_block::Block;

/// Simple linked list node stored in the node pool
#[derive(Debug, Clone, Copy)]
pub struct ListNode<T> {
    pub data: T,
    pub next: Option<usize>,
}

/// Node pool - all orders share nodes from this arena
///
/// Nodes are addressed by their index in the arena. A released node keeps
/// its slot and is threaded onto `free_head` through its `next` link.
pub struct NodePool {
    nodes: Vec<ListNode<Block>>,
    /// Free list head - index of the first reusable node
    free_head: Option<usize>,
    /// Current number of free nodes in the pool
    free_nodes: usize,
    /// Allocation statistics
    total_allocations: usize,
    total_deallocations: usize,
}

impl NodePool {
    /// Create an empty node pool
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_head: None,
            free_nodes: 0,
            total_allocations: 0,
            total_deallocations: 0,
        }
    }

    /// Create a pool with room for `capacity` nodes before the arena grows
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Allocate a node holding `data`
    ///
    /// Returns the index of the allocated node
    pub fn alloc_node(&mut self, data: Block) -> usize {
        self.total_allocations += 1;

        if let Some(idx) = self.free_head {
            let node = &mut self.nodes[idx];
            self.free_head = node.next;
            node.data = data;
            node.next = None;
            self.free_nodes -= 1;
            return idx;
        }

        self.nodes.push(ListNode { data, next: None });
        self.nodes.len() - 1
    }

    /// Deallocate a node back to the pool
    ///
    /// The node should not be part of any active list when freed
    pub fn dealloc_node(&mut self, node_idx: usize) {
        if let Some(node) = self.nodes.get_mut(node_idx) {
            node.next = self.free_head;
            self.free_head = Some(node_idx);
            self.total_deallocations += 1;
            self.free_nodes += 1;
        }
    }

    /// Get a reference to a node by index
    pub fn get_node(&self, node_idx: usize) -> Option<&ListNode<Block>> {
        self.nodes.get(node_idx)
    }

    /// Get a mutable reference to a node by index
    pub fn get_node_mut(&mut self, node_idx: usize) -> Option<&mut ListNode<Block>> {
        self.nodes.get_mut(node_idx)
    }

    /// Get the number of free nodes in the pool
    pub fn free_node_count(&self) -> usize {
        self.free_nodes
    }

    /// Get the number of nodes currently linked into lists
    pub fn allocated_node_count(&self) -> usize {
        self.nodes.len() - self.free_nodes
    }

    /// Get pool statistics
    pub fn get_stats(&self) -> NodePoolStats {
        NodePoolStats {
            total_nodes: self.nodes.len(),
            free_nodes: self.free_nodes,
            allocated_nodes: self.allocated_node_count(),
            total_allocations: self.total_allocations,
            total_deallocations: self.total_deallocations,
        }
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Node pool statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodePoolStats {
    pub total_nodes: usize,
    pub free_nodes: usize,
    pub allocated_nodes: usize,
    pub total_allocations: usize,
    pub total_deallocations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_dealloc() {
        let mut pool = NodePool::new();

        let idx1 = pool.alloc_node(Block::new(0, 0));
        assert_eq!(pool.allocated_node_count(), 1);
        assert_eq!(pool.free_node_count(), 0);

        let idx2 = pool.alloc_node(Block::new(0, 1));
        assert_ne!(idx1, idx2);

        pool.dealloc_node(idx1);
        assert_eq!(pool.free_node_count(), 1);
        assert_eq!(pool.allocated_node_count(), 1);

        pool.dealloc_node(idx2);
        assert_eq!(pool.free_node_count(), 2);
        assert_eq!(pool.allocated_node_count(), 0);
    }

    #[test]
    fn test_released_nodes_are_recycled() {
        let mut pool = NodePool::with_capacity(4);

        let idx = pool.alloc_node(Block::new(3, 8));
        pool.dealloc_node(idx);

        let again = pool.alloc_node(Block::new(5, 32));
        assert_eq!(again, idx);
        assert_eq!(pool.get_stats().total_nodes, 1);

        let node = pool.get_node(again).unwrap();
        assert_eq!(node.data, Block::new(5, 32));
        assert_eq!(node.next, None);
    }

    #[test]
    fn test_node_access() {
        let mut pool = NodePool::new();
        let idx = pool.alloc_node(Block::new(0, 0));

        if let Some(node) = pool.get_node_mut(idx) {
            node.data = Block::new(2, 0x10);
        }

        let node = pool.get_node(idx).unwrap();
        assert_eq!(node.data.order, 2);
        assert_eq!(node.data.start, 0x10);
        assert!(pool.get_node(idx + 1).is_none());
    }

    #[test]
    fn test_stats() {
        let mut pool = NodePool::new();

        let idx1 = pool.alloc_node(Block::new(0, 0));
        let _idx2 = pool.alloc_node(Block::new(0, 1));

        let stats = pool.get_stats();
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.free_nodes, 0);
        assert_eq!(stats.allocated_nodes, 2);
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_deallocations, 0);

        pool.dealloc_node(idx1);
        let stats2 = pool.get_stats();
        assert_eq!(stats2.free_nodes, 1);
        assert_eq!(stats2.total_deallocations, 1);
    }
}
