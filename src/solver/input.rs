//! Loading items from a YAML or JSON file for offline solving.

use super::{compare, Comparison, Item, Limits};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Read a list of `{name, workers, profit}` entries.
///
/// YAML is a superset of JSON, so both formats go through `serde_yaml`.
/// Entries must have a non-empty name and positive workers and profit.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_items(&contents).with_context(|| format!("Invalid project list in {}", path.display()))
}

pub fn parse_items(contents: &str) -> Result<Vec<Item>> {
    let items: Vec<Item> = serde_yaml::from_str(contents)?;

    for (i, item) in items.iter().enumerate() {
        if item.name.trim().is_empty() {
            anyhow::bail!("entry {}: name is empty", i);
        }
        if item.workers == 0 || item.profit == 0 {
            anyhow::bail!(
                "entry {} ({}): workers and profit must be positive",
                i,
                item.name
            );
        }
    }

    Ok(items)
}

/// Load `path`, compare both solvers at `limit` and write the result to
/// `out` as pretty JSON followed by a newline.
pub fn solve_file<W: Write>(
    path: &Path,
    limit: u32,
    limits: Limits,
    out: &mut W,
) -> Result<Comparison> {
    let items = load_items(path)?;
    tracing::info!("Loaded {} projects from {}", items.len(), path.display());

    let comparison = compare(items, limit, limits)?;
    serde_json::to_writer_pretty(&mut *out, &comparison)?;
    writeln!(out)?;
    Ok(comparison)
}
