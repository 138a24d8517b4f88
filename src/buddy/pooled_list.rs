//! Pooled linked list implementation using the shared node pool
//!
//! Provides FIFO free lists that draw nodes from a shared pool: new blocks
//! are appended at the tail and allocation takes the head, which gives the
//! first-found selection policy within an order.

#[cfg(feature = "log")]
use log::{error, warn};

use super::{buddy_block::Block, node_pool::NodePool};

/// Pooled linked list - uses nodes from the shared pool
///
/// This maintains only the list structure (head/tail/len), while
/// all nodes are allocated from the pool.
pub struct PooledLinkedList {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl PooledLinkedList {
    /// Create a new empty pooled linked list
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Append an element at the tail of the list
    pub fn push_back(&mut self, pool: &mut NodePool, data: Block) {
        let new_node_idx = pool.alloc_node(data);

        match self.tail {
            Some(tail_idx) => match pool.get_node_mut(tail_idx) {
                Some(tail_node) => tail_node.next = Some(new_node_idx),
                None => {
                    error!("Tail node {} is corrupted", tail_idx);
                    pool.dealloc_node(new_node_idx);
                    return;
                }
            },
            None => self.head = Some(new_node_idx),
        }

        self.tail = Some(new_node_idx);
        self.len += 1;
    }

    /// Pop an element from the front of the list
    pub fn pop_front(&mut self, pool: &mut NodePool) -> Option<Block> {
        let head_idx = self.head?;

        if let Some(head_node) = pool.get_node(head_idx) {
            let data = head_node.data;
            self.head = head_node.next;
            if self.head.is_none() {
                self.tail = None;
            }

            // Return node to pool
            pool.dealloc_node(head_idx);
            self.len -= 1;

            Some(data)
        } else {
            error!("Head node {} is corrupted", head_idx);
            None
        }
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the length of the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// Find a node by start offset (for buddy lookup)
    ///
    /// Returns (node_idx, prev_idx) where prev_idx is the node before it (or None if head)
    pub fn find_by_start(&self, pool: &NodePool, start: usize) -> Option<(usize, Option<usize>)> {
        let mut prev_idx = None;
        let mut current_idx = self.head;
        let mut visited = 0;

        while let Some(idx) = current_idx {
            if visited > self.len {
                error!("Potential cycle detected during search");
                return None;
            }

            let node = pool.get_node(idx)?;
            if node.data.start == start {
                return Some((idx, prev_idx));
            }
            prev_idx = current_idx;
            current_idx = node.next;
            visited += 1;
        }

        None
    }

    /// Remove a node using known prev_idx (O(1) operation)
    ///
    /// This is used when we already know the previous node index from find_by_start(),
    /// avoiding a second traversal of the list.
    pub fn remove_with_prev(
        &mut self,
        pool: &mut NodePool,
        node_idx: usize,
        prev_idx: Option<usize>,
    ) -> Option<Block> {
        let (data, next_idx) = match pool.get_node(node_idx) {
            Some(node) => (node.data, node.next),
            None => {
                warn!("Invalid node index {} for remove_with_prev", node_idx);
                return None;
            }
        };

        // Verify prev_idx leads to node_idx if provided
        match prev_idx {
            Some(prev) => match pool.get_node_mut(prev) {
                Some(prev_node) if prev_node.next == Some(node_idx) => prev_node.next = next_idx,
                _ => {
                    warn!("prev_idx {} does not point to node_idx {}", prev, node_idx);
                    return None;
                }
            },
            None if self.head == Some(node_idx) => self.head = next_idx,
            None => {
                warn!("prev_idx is None but node_idx {} is not head", node_idx);
                return None;
            }
        }

        if self.tail == Some(node_idx) {
            self.tail = prev_idx;
        }

        // Return node to pool
        pool.dealloc_node(node_idx);
        self.len -= 1;
        Some(data)
    }

    /// Get iterator over elements, head first
    pub fn iter<'a>(&'a self, pool: &'a NodePool) -> PooledListIter<'a> {
        PooledListIter {
            pool,
            current: self.head,
        }
    }

    /// Clear all nodes from the list
    ///
    /// Returns all nodes to the pool
    pub fn clear(&mut self, pool: &mut NodePool) {
        while self.pop_front(pool).is_some() {}
    }
}

impl Default for PooledLinkedList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator for PooledLinkedList
pub struct PooledListIter<'a> {
    pool: &'a NodePool,
    current: Option<usize>,
}

impl<'a> Iterator for PooledListIter<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.and_then(|idx| {
            if let Some(node) = self.pool.get_node(idx) {
                self.current = node.next;
                Some(&node.data)
            } else {
                self.current = None;
                None
            }
        })
    }
}
