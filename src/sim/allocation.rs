//! Active allocation records, keyed by process id.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use super::config::ExpiryPolicy;
use crate::buddy::{exact_order, Block};
use crate::{ProcessId, Tick};

/// A granted allocation that has not been reclaimed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationRecord {
    pub process_id: ProcessId,
    /// Offset of the granted block.
    pub start: usize,
    /// Units granted, a power of two.
    pub size: usize,
    pub granted_at: Tick,
    /// Tick at which the allocation must be reclaimed.
    pub end_time: Tick,
}

impl AllocationRecord {
    pub fn new(process_id: ProcessId, block: Block, granted_at: Tick, duration: Tick) -> Self {
        Self {
            process_id,
            start: block.start,
            size: block.size(),
            granted_at,
            end_time: granted_at.saturating_add(duration),
        }
    }

    /// The granted block.
    pub fn block(&self) -> Block {
        // `size` comes from a block, so it is always a power of two.
        Block::new(exact_order(self.size).unwrap_or(0), self.start)
    }

    pub fn is_expired(&self, now: Tick, policy: ExpiryPolicy) -> bool {
        match policy {
            ExpiryPolicy::Sweep => self.end_time <= now,
            ExpiryPolicy::ExactMatch => self.end_time == now,
        }
    }
}

/// Allocation table with at most one record per process.
#[derive(Debug, Default)]
pub struct AllocationTable {
    records: BTreeMap<ProcessId, AllocationRecord>,
}

impl AllocationTable {
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    pub fn get(&self, process_id: ProcessId) -> Option<&AllocationRecord> {
        self.records.get(&process_id)
    }

    pub fn contains(&self, process_id: ProcessId) -> bool {
        self.records.contains_key(&process_id)
    }

    /// Store a record, returning the one it replaced.
    pub fn insert(&mut self, record: AllocationRecord) -> Option<AllocationRecord> {
        self.records.insert(record.process_id, record)
    }

    pub fn remove(&mut self, process_id: ProcessId) -> Option<AllocationRecord> {
        self.records.remove(&process_id)
    }

    /// Ids due for reclamation at `now`, earliest end time first.
    pub fn expired(&self, now: Tick, policy: ExpiryPolicy) -> Vec<ProcessId> {
        let mut due: Vec<&AllocationRecord> = self
            .records
            .values()
            .filter(|record| record.is_expired(now, policy))
            .collect();
        due.sort_by_key(|record| (record.end_time, record.process_id));
        due.into_iter().map(|record| record.process_id).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Units held by all active allocations.
    pub fn allocated_units(&self) -> usize {
        self.records.values().map(|record| record.size).sum()
    }

    /// Records in process id order.
    pub fn iter(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.records.values()
    }
}
