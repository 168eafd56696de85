//! Greedy by profit.

use super::{Item, Selection};

/// Take items in descending profit order while they still fit.
///
/// The sort is stable, so equal profits keep their input order. An item
/// that does not fit is skipped and the scan continues.
pub fn solve_greedy(items: &[Item], capacity: u32) -> Selection {
    let mut sorted: Vec<&Item> = items.iter().collect();
    sorted.sort_by(|a, b| b.profit.cmp(&a.profit));

    let capacity = u64::from(capacity);
    let mut selection = Selection::default();
    for item in sorted {
        if selection.total_workers + u64::from(item.workers) <= capacity {
            selection.push(item.clone());
        }
    }
    selection
}
