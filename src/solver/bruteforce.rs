//! Exhaustive subset enumeration.

use super::{Item, Limits, Selection, SolverError};

/// Find the most profitable subset of `items` within `capacity` workers.
///
/// Subsets are visited as bitmasks in increasing order and an incumbent is
/// replaced only by a strictly larger profit, so among equal optima the
/// first mask wins. Chosen items keep their input order.
pub fn solve_bruteforce(
    items: &[Item],
    capacity: u32,
    limits: Limits,
) -> Result<Selection, SolverError> {
    let n = items.len();
    if n > limits.max_bruteforce_items {
        return Err(SolverError::TooManyItems {
            count: n,
            max: limits.max_bruteforce_items,
        });
    }

    let capacity = u64::from(capacity);
    let mut best_mask = 0u64;
    let mut best_profit = 0u64;

    for mask in 0..(1u64 << n) {
        let mut workers = 0u64;
        let mut profit = 0u64;
        let mut bits = mask;
        while bits != 0 {
            let j = bits.trailing_zeros() as usize;
            workers += u64::from(items[j].workers);
            profit += u64::from(items[j].profit);
            bits &= bits - 1;
        }

        if workers <= capacity && profit > best_profit {
            best_profit = profit;
            best_mask = mask;
        }
    }

    let mut selection = Selection::default();
    for (j, item) in items.iter().enumerate() {
        if best_mask & (1u64 << j) != 0 {
            selection.push(item.clone());
        }
    }
    Ok(selection)
}
