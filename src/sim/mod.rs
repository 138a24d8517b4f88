//! Timed allocation simulation on top of the buddy block pool
//!
//! - `BuddyPool`: allocate / deallocate / tick against one pool
//! - `Simulator`: replays a request stream and reports events
//! - `SimConfig`: pool size and the reclaim, expiry and duplicate policies

pub mod allocation;
pub mod buddy_pool;
pub mod config;
pub mod driver;

pub use allocation::{AllocationRecord, AllocationTable};
pub use buddy_pool::BuddyPool;
pub use config::{
    DuplicatePolicy, ExpiryPolicy, ReclaimPolicy, SimConfig, SimConfigBuilder,
    DEFAULT_TOTAL_UNITS,
};
pub use driver::{Event, Request, SimSummary, Simulator};
