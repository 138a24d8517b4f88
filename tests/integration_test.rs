//! Integration tests for the simulator crate
//!
//! Replays the reference scenarios against both the default (coalescing,
//! sweeping) policies and the legacy policies, and drives whole traces
//! through the request driver.

#![no_std]

extern crate alloc;
extern crate buddy_sim;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use buddy_sim::{
    parse_trace, AllocError, Block, BuddyPool, Event, Request, SimConfig, Simulator,
};

const TOTAL_UNITS: usize = 1024;
const TRACE: &str = include_str!("../data/buddy.dat");

fn default_pool() -> BuddyPool {
    BuddyPool::with_total_units(TOTAL_UNITS).unwrap()
}

fn legacy_pool() -> BuddyPool {
    BuddyPool::new(SimConfig::legacy(TOTAL_UNITS)).unwrap()
}

fn free_starts(pool: &BuddyPool, order: usize) -> Vec<usize> {
    pool.free_blocks(order).map(|b| b.start).collect()
}

fn replay(config: SimConfig) -> Vec<String> {
    let requests = parse_trace(TRACE).unwrap();
    let mut sim = Simulator::new(config).unwrap();
    sim.run(requests).iter().map(|e| e.to_string()).collect()
}

/// The first request of the reference scenario, common to every policy.
fn check_first_grant(pool: &mut BuddyPool) {
    let block = pool.allocate(1, 100, 0, 5).unwrap();
    assert_eq!(block, Block::new(7, 0));
    assert_eq!(block.size(), 128);

    assert_eq!(free_starts(pool, 9), [512]);
    assert_eq!(free_starts(pool, 8), [256]);
    assert_eq!(free_starts(pool, 7), [128]);
    assert_eq!(pool.free_block_count(10), 0);

    let record = pool.allocation(1).unwrap();
    assert_eq!(record.size, 128);
    assert_eq!(record.end_time, 5);
}

#[test]
fn test_first_request_splits_down_to_order_7() {
    check_first_grant(&mut default_pool());
    check_first_grant(&mut legacy_pool());
}

#[test]
fn test_oversized_request_after_split_is_out_of_memory() {
    for mut pool in [default_pool(), legacy_pool()] {
        check_first_grant(&mut pool);
        assert_eq!(
            pool.allocate(2, 600, 0, 3),
            Err(AllocError::OutOfMemory { units: 1024 })
        );
        assert!(pool.allocation(2).is_none());
        assert_eq!(pool.stats().largest_free_block(), 512);
    }
}

#[test]
fn test_legacy_tick_returns_block_to_order_7() {
    let mut pool = legacy_pool();
    check_first_grant(&mut pool);

    let reclaimed = pool.tick(5).unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(reclaimed[0].process_id, 1);
    assert_eq!(pool.free_block_count(7), 2);
    assert_eq!(pool.free_block_count(10), 0);

    assert!(pool.tick(6).unwrap().is_empty());
    assert_eq!(pool.free_block_count(7), 2);
}

#[test]
fn test_coalescing_tick_restores_whole_pool() {
    let mut pool = default_pool();
    check_first_grant(&mut pool);

    let reclaimed = pool.tick(5).unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(free_starts(&pool, 10), [0]);
    for order in 0..10 {
        assert_eq!(pool.free_block_count(order), 0);
    }

    assert!(pool.tick(6).unwrap().is_empty());
    assert_eq!(pool.free_block_count(10), 1);
}

#[test]
fn test_split_leaves_one_block_per_order() {
    for max_order in 0..=12usize {
        for order in 0..=max_order {
            let mut pool = BuddyPool::with_total_units(1 << max_order).unwrap();
            let block = pool.allocate(1, 1 << order, 0, 1).unwrap();
            assert_eq!(block.order, order);

            for i in 0..=max_order {
                let expected = usize::from(i >= order && i < max_order);
                assert_eq!(pool.free_block_count(i), expected);
            }
            assert!(pool.stats().is_conserved());
        }
    }
}

#[test]
fn test_legacy_reclaim_hands_out_overlapping_blocks() {
    // Known gap of the legacy policy: units are conserved, addresses are not.
    let mut pool = legacy_pool();
    let first = pool.allocate(1, 128, 0, 10).unwrap();
    let second = pool.allocate(2, 128, 0, 1).unwrap();
    assert_eq!((first.start, second.start), (0, 128));

    pool.tick(1).unwrap();
    assert!(pool.stats().is_conserved());

    let third = pool.allocate(3, 128, 1, 1).unwrap();
    assert_eq!(third.start, 0);
    assert!(third.overlaps(&first));
}

#[test]
fn test_coalescing_never_overlaps() {
    let mut pool = default_pool();
    let mut time = 0;
    for pid in 0..64u32 {
        time += u64::from(pid % 3);
        pool.tick(time).unwrap();
        let units = 1 + (pid as usize * 37) % 200;
        let _ = pool.allocate(pid, units, time, u64::from(pid % 7));

        let live: Vec<Block> = pool.allocations().map(|r| r.block()).collect();
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
        assert!(pool.stats().is_conserved());
    }

    pool.tick(time + 10).unwrap();
    assert_eq!(pool.active_allocations(), 0);
    assert_eq!(free_starts(&pool, 10), [0]);
}

#[test]
fn test_exact_match_leak_is_permanent() {
    let mut pool = legacy_pool();
    pool.allocate(1, 512, 0, 3).unwrap();
    pool.tick(4).unwrap();
    pool.tick(100).unwrap();

    assert!(pool.allocation(1).is_some());
    assert_eq!(pool.stats().free_units, 512);
}

#[test]
fn test_trace_replay_default() {
    let lines = replay(SimConfig::default());
    assert_eq!(
        lines,
        [
            "Allocated 128 units to Process 1",
            "Allocation failed for Process 2",
            "Allocated 256 units to Process 3",
            "Deallocated Process 1",
            "Allocated 64 units to Process 4",
            "Deallocated Process 3",
            "Allocated 512 units to Process 5",
            "Deallocated Process 4",
            "Allocated 32 units to Process 6",
            "Deallocated Process 6",
            "Deallocated Process 5",
            "Allocated 1024 units to Process 7",
            "All requests processed.",
        ]
    );
}

#[test]
fn test_trace_replay_legacy() {
    let lines = replay(SimConfig::legacy(TOTAL_UNITS));
    assert_eq!(
        lines,
        [
            "Allocated 128 units to Process 1",
            "Allocation failed for Process 2",
            "Allocated 256 units to Process 3",
            "Deallocated Process 1",
            "Allocated 64 units to Process 4",
            "Deallocated Process 3",
            "Allocated 512 units to Process 5",
            "Deallocated Process 4",
            "Allocated 32 units to Process 6",
            "Allocation failed for Process 7",
            "All requests processed.",
        ]
    );
}

#[test]
fn test_failed_requests_carry_their_error() {
    let mut sim = Simulator::new(SimConfig::default()).unwrap();
    let events = sim.run([
        Request::new(1, 0, 0, 1),
        Request::new(2, 4096, 0, 1),
        Request::new(3, 8, 0, 9),
        Request::new(3, 8, 1, 9),
    ]);

    let errors: Vec<AllocError> = events
        .iter()
        .filter_map(|e| match e {
            Event::Failed { error, .. } => Some(*error),
            _ => None,
        })
        .collect();
    assert_eq!(
        errors,
        [
            AllocError::InvalidSize { units: 0 },
            AllocError::RequestTooLarge {
                order: 12,
                max_order: 10
            },
            AllocError::DuplicateProcess(3),
        ]
    );
    assert_eq!(sim.summary().served, 1);
    assert_eq!(sim.summary().failed, 3);
    assert_eq!(
        AllocError::DuplicateProcess(3).to_string(),
        "process 3 already holds an active allocation"
    );
}

#[test]
fn test_invalid_pool_size() {
    assert_eq!(
        Simulator::new(SimConfig::builder().total_units(1000).build()).err(),
        Some(AllocError::InvalidPoolSize(1000))
    );
}
