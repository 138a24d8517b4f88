//! Request driver
//!
//! Replays requests in arrival order against a [`BuddyPool`]: every request
//! first advances the clock (reclaiming whatever expired), then allocates.

use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "log")]
use log::{info, warn};

use super::buddy_pool::BuddyPool;
use super::config::SimConfig;
use crate::buddy::Block;
use crate::{AllocError, AllocResult, ProcessId, Tick};

/// One timed allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub process_id: ProcessId,
    pub units: usize,
    /// Arrival time; requests must arrive in non-decreasing time order.
    pub time: Tick,
    pub duration: Tick,
}

impl Request {
    pub const fn new(process_id: ProcessId, units: usize, time: Tick, duration: Tick) -> Self {
        Self {
            process_id,
            units,
            time,
            duration,
        }
    }
}

/// Outcome reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Allocated { process_id: ProcessId, block: Block },
    Failed { process_id: ProcessId, error: AllocError },
    Deallocated { process_id: ProcessId, size: usize },
    Completed,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Allocated { process_id, block } => {
                write!(f, "Allocated {} units to Process {}", block.size(), process_id)
            }
            Event::Failed { process_id, .. } => {
                write!(f, "Allocation failed for Process {}", process_id)
            }
            Event::Deallocated { process_id, .. } => write!(f, "Deallocated Process {}", process_id),
            Event::Completed => f.write_str("All requests processed."),
        }
    }
}

/// Running totals of a simulation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimSummary {
    pub requests: usize,
    pub served: usize,
    pub failed: usize,
    pub reclaimed: usize,
}

/// Drives a [`BuddyPool`] from a request stream.
pub struct Simulator {
    pool: BuddyPool,
    summary: SimSummary,
}

impl Simulator {
    pub fn new(config: SimConfig) -> AllocResult<Self> {
        Ok(Self {
            pool: BuddyPool::new(config)?,
            summary: SimSummary::default(),
        })
    }

    pub const fn pool(&self) -> &BuddyPool {
        &self.pool
    }

    pub const fn summary(&self) -> SimSummary {
        self.summary
    }

    /// Process one request: reclaim what expired by `request.time`, then allocate
    pub fn step(&mut self, request: &Request) -> Vec<Event> {
        self.summary.requests += 1;

        let mut events = match self.pool.tick(request.time) {
            Ok(reclaimed) => reclaimed
                .into_iter()
                .map(|record| Event::Deallocated {
                    process_id: record.process_id,
                    size: record.size,
                })
                .collect::<Vec<_>>(),
            Err(error) => {
                warn!(
                    "driver: rejecting request of process {}: {}",
                    request.process_id, error
                );
                self.summary.failed += 1;
                return alloc::vec![Event::Failed {
                    process_id: request.process_id,
                    error,
                }];
            }
        };
        self.summary.reclaimed += events.len();

        let outcome = match self.pool.allocate(
            request.process_id,
            request.units,
            request.time,
            request.duration,
        ) {
            Ok(block) => {
                self.summary.served += 1;
                Event::Allocated {
                    process_id: request.process_id,
                    block,
                }
            }
            Err(error) => {
                self.summary.failed += 1;
                Event::Failed {
                    process_id: request.process_id,
                    error,
                }
            }
        };
        events.push(outcome);
        events
    }

    /// Replay `requests` in order and append the completion event
    pub fn run<I>(&mut self, requests: I) -> Vec<Event>
    where
        I: IntoIterator<Item = Request>,
    {
        let mut events = Vec::new();
        for request in requests {
            events.extend(self.step(&request));
        }
        events.push(self.finish());
        events
    }

    /// Mark the end of the request stream
    ///
    /// Allocations still active stay in the pool.
    pub fn finish(&mut self) -> Event {
        info!(
            "driver: {} requests, {} served, {} failed, {} reclaimed, {} still active",
            self.summary.requests,
            self.summary.served,
            self.summary.failed,
            self.summary.reclaimed,
            self.pool.active_allocations()
        );
        Event::Completed
    }
}
