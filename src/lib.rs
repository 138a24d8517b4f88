//! Buddy System Simulator
//!
//! This crate models a binary buddy-system memory allocator driven by a
//! simulated clock, featuring:
//! - Per-order free lists backed by an index-linked node pool
//! - Block splitting on allocation and optional buddy coalescing on reclaim
//! - Time-triggered reclamation of expired allocations
//! - A request driver and trace reader for replaying allocation workloads

#![no_std]

extern crate alloc;

// Logging support - conditionally import log crate
#[cfg(feature = "log")]
extern crate log;

// Stub macros when log is disabled - these become no-ops
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

use thiserror::Error;

/// Identifier of a simulated process.
pub type ProcessId = u32;

/// Simulated clock value.
pub type Tick = u64;

/// The error type used for allocation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// A request for zero (or negative) units.
    #[error("invalid request size: {units} units")]
    InvalidSize { units: usize },
    /// The rounded request does not fit in the pool at all.
    #[error("requested order {order} exceeds maximum order {max_order}")]
    RequestTooLarge { order: usize, max_order: usize },
    /// No free block at any sufficient order.
    #[error("out of memory: no free block for {units} units")]
    OutOfMemory { units: usize },
    /// The process already holds an unreclaimed allocation.
    #[error("process {0} already holds an active allocation")]
    DuplicateProcess(ProcessId),
    /// A tick or request arrived earlier than the pool clock.
    #[error("time went backwards: clock at {now}, request at {requested}")]
    TimeWentBackwards { now: Tick, requested: Tick },
    /// The pool size is not a power of two or is too large.
    #[error("invalid pool size: {0} units")]
    InvalidPoolSize(usize),
}

/// A [`Result`] type with [`AllocError`] as the error type.
pub type AllocResult<T = ()> = Result<T, AllocError>;

pub mod buddy;
pub use buddy::{Block, BlockPool, PoolStats, MAX_SUPPORTED_ORDER};

pub mod sim;
pub use sim::{
    AllocationRecord, BuddyPool, DuplicatePolicy, Event, ExpiryPolicy, ReclaimPolicy, Request,
    SimConfig, SimSummary, Simulator,
};

pub mod trace;
pub use trace::{parse_trace, TraceError, TraceReader, TraceResult};
