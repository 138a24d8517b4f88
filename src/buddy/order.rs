//! Order arithmetic
//!
//! Maps unit counts to the power-of-two orders used by the free lists.

use crate::{AllocError, AllocResult};

/// Largest order the free-list array can hold (pools up to 2^28 units).
pub const MAX_SUPPORTED_ORDER: usize = 28;

/// Smallest order `k` such that `2^k >= units`.
///
/// Zero units is not a valid request and yields [`AllocError::InvalidSize`].
pub fn order_for_units(units: usize) -> AllocResult<usize> {
    if units == 0 {
        return Err(AllocError::InvalidSize { units });
    }

    let order = if units.is_power_of_two() {
        units.trailing_zeros() as usize
    } else {
        match units.checked_next_power_of_two() {
            Some(rounded) => rounded.trailing_zeros() as usize,
            // Past the top bit of usize: larger than any pool we can build.
            None => usize::BITS as usize,
        }
    };
    Ok(order)
}

/// Size in units of a block at `order`.
#[inline]
pub const fn size_for_order(order: usize) -> usize {
    1 << order
}

/// `Some(log2(total))` when `total` is a non-zero power of two.
pub const fn exact_order(total: usize) -> Option<usize> {
    if total.is_power_of_two() {
        Some(total.trailing_zeros() as usize)
    } else {
        None
    }
}
