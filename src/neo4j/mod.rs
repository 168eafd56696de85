//! Neo4j client and models for users and their projects

pub mod client;
mod impl_graph_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::{GraphStore, StoreError};

#[cfg(test)]
pub(crate) mod mock;
