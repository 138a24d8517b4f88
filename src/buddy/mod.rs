//! Buddy block pool module
//!
//! This module provides the buddy system machinery behind the simulator:
//! - Order arithmetic for power-of-two block sizes
//! - FIFO free lists drawing nodes from a shared node pool
//! - Block splitting and buddy merging
//! - Statistics and failure reporting

pub mod block_pool;
pub mod buddy_block;
pub mod node_pool;
pub mod order;
pub mod pooled_list;
pub mod stats;

pub use block_pool::BlockPool;
pub use buddy_block::Block;
pub use node_pool::{ListNode, NodePool, NodePoolStats};
pub use order::{exact_order, order_for_units, size_for_order, MAX_SUPPORTED_ORDER};
pub use pooled_list::{PooledLinkedList, PooledListIter};
pub use stats::{MemoryStatsReporter, PoolStats};
