//! 0/1 knapsack solvers over stored projects.
//!
//! A project is an item whose weight is its worker count and whose value is
//! its profit. Two solvers are provided and compared:
//! - [`solve_bruteforce`]: exact, enumerates every subset (exponential)
//! - [`solve_greedy`]: heuristic, takes the most profitable items first
//!
//! [`compare`] runs both over the items that individually fit the limit.

mod bruteforce;
mod greedy;
mod input;

pub use bruteforce::solve_bruteforce;
pub use greedy::solve_greedy;
pub use input::{load_items, parse_items, solve_file};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on the number of candidates fed to the exact solver.
pub const DEFAULT_MAX_BRUTEFORCE_ITEMS: usize = 20;

/// Hard ceiling for [`Limits::max_bruteforce_items`].
pub const MAX_BRUTEFORCE_ITEMS_CEILING: usize = 30;

/// Errors raised by the solvers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("too many candidate projects for exhaustive search: {count} (max {max})")]
    TooManyItems { count: usize, max: usize },
}

/// A knapsack item: one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub workers: u32,
    pub profit: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, workers: u32, profit: u32) -> Self {
        Self {
            name: name.into(),
            workers,
            profit,
        }
    }
}

/// A chosen subset of items and its totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub total_profit: u64,
    pub total_workers: u64,
    pub items: Vec<Item>,
}

impl Selection {
    fn push(&mut self, item: Item) {
        self.total_workers += u64::from(item.workers);
        self.total_profit += u64::from(item.profit);
        self.items.push(item);
    }

    /// Re-check the totals against the items and the capacity.
    pub fn verify(&self, capacity: u32) -> anyhow::Result<()> {
        let workers: u64 = self.items.iter().map(|i| u64::from(i.workers)).sum();
        let profit: u64 = self.items.iter().map(|i| u64::from(i.profit)).sum();

        if workers != self.total_workers {
            anyhow::bail!(
                "Total workers ({}) does not match items ({})",
                self.total_workers,
                workers
            );
        }
        if profit != self.total_profit {
            anyhow::bail!(
                "Total profit ({}) does not match items ({})",
                self.total_profit,
                profit
            );
        }
        if workers > u64::from(capacity) {
            anyhow::bail!(
                "Total workers ({}) exceeded worker limit ({})",
                workers,
                capacity
            );
        }
        Ok(())
    }
}

/// Solver bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_bruteforce_items: usize,
}

impl Limits {
    /// Build limits, clamping to `1..=MAX_BRUTEFORCE_ITEMS_CEILING`.
    pub fn new(max_bruteforce_items: usize) -> Self {
        Self {
            max_bruteforce_items: max_bruteforce_items.clamp(1, MAX_BRUTEFORCE_ITEMS_CEILING),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BRUTEFORCE_ITEMS)
    }
}

/// Side-by-side result of both solvers
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// The limit as requested; may be negative when it comes from the API
    pub worker_limit: i64,
    /// Items whose own worker count fits the limit
    pub candidates: usize,
    /// Items dropped because they alone exceed the limit
    pub excluded: usize,
    pub bruteforce: Selection,
    pub greedy: Selection,
    pub greedy_is_optimal: bool,
    pub profit_gap: u64,
}

/// Run both solvers over the items that individually fit `worker_limit`.
pub fn compare(
    items: Vec<Item>,
    worker_limit: u32,
    limits: Limits,
) -> Result<Comparison, SolverError> {
    let total = items.len();
    let candidates: Vec<Item> = items
        .into_iter()
        .filter(|item| item.workers <= worker_limit)
        .collect();

    if candidates.len() > limits.max_bruteforce_items {
        return Err(SolverError::TooManyItems {
            count: candidates.len(),
            max: limits.max_bruteforce_items,
        });
    }

    let bruteforce = solve_bruteforce(&candidates, worker_limit, limits)?;
    let greedy = solve_greedy(&candidates, worker_limit);
    let profit_gap = bruteforce.total_profit.saturating_sub(greedy.total_profit);

    Ok(Comparison {
        worker_limit: i64::from(worker_limit),
        candidates: candidates.len(),
        excluded: total - candidates.len(),
        greedy_is_optimal: profit_gap == 0,
        profit_gap,
        bruteforce,
        greedy,
    })
}
