//! Document store layer: schemaless documents keyed by generated identifiers
//! or slugs, with merge-upsert writes and cursor pagination.

use std::sync::Arc;

use anyhow::bail;

pub mod document;
pub mod memory;
pub mod paging;
pub mod slug;
pub mod store;

pub use document::{now_rfc3339, rfc3339, Document};
pub use memory::MemoryStore;
pub use paging::{Direction, ListOptions, Page};
pub use store::{get_by_slug, DocumentStore};

/// Open a document store for the given endpoint.
///
/// Only the in-process `memory://` engine ships with this workspace; a managed
/// store client plugs in behind the same [`DocumentStore`] trait.
pub async fn connect(endpoint: &str) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if endpoint.starts_with("memory://") {
        tracing::info!(target: "mehfil-db", %endpoint, "opening in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    bail!("unsupported document store endpoint '{endpoint}'; expected memory://")
}
