use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::paging::{ListOptions, Page};

/// Narrow interface to the document database.
///
/// Implementations are constructed once at bootstrap and injected into the
/// request handlers; store errors (connectivity, permissions) propagate to the
/// caller without retries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Make sure a collection exists. Idempotent.
    async fn ensure_collection(&self, collection: &str) -> anyhow::Result<()>;

    /// Primary-key lookup. `Ok(None)` for an unknown id, never an error.
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>>;

    /// First document whose `field` equals `value`, scanning in id order.
    async fn find_first(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Option<Document>>;

    /// Insert-or-merge keyed by `id`: present fields overwrite, absent fields
    /// are preserved. Returns the merged document as read back after write.
    async fn upsert_merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> anyhow::Result<Document>;

    /// One page of an ordered scan; see [`ListOptions`] for cursor semantics.
    async fn list_page(&self, collection: &str, opts: &ListOptions) -> anyhow::Result<Page>;
}

/// Slug-addressed lookup: primary key first, then fall back to the first
/// document whose `slug` field matches. Unknown slugs are `Ok(None)`.
pub async fn get_by_slug(
    store: &dyn DocumentStore,
    collection: &str,
    slug: &str,
) -> anyhow::Result<Option<Document>> {
    if let Some(doc) = store.get(collection, slug).await? {
        return Ok(Some(doc));
    }
    store
        .find_first(collection, "slug", &Value::String(slug.to_string()))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn slug_lookup_prefers_primary_key() {
        let store = MemoryStore::new();
        store
            .upsert_merge("poems", "dastak", fields(&[("title", json!("Dastak"))]))
            .await
            .unwrap();

        let doc = get_by_slug(&store, "poems", "dastak").await.unwrap().unwrap();
        assert_eq!(doc.id, "dastak");
    }

    #[tokio::test]
    async fn slug_lookup_falls_back_to_slug_field() {
        let store = MemoryStore::new();
        // Document keyed by a generated id, addressable through its slug field.
        store
            .upsert_merge(
                "poems",
                "doc-0193",
                fields(&[("slug", json!("shab-e-gham")), ("title", json!("Shab-e-Gham"))]),
            )
            .await
            .unwrap();

        let doc = get_by_slug(&store, "poems", "shab-e-gham")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.id, "doc-0193");
    }

    #[tokio::test]
    async fn unknown_slug_is_none_not_error() {
        let store = MemoryStore::new();
        let doc = get_by_slug(&store, "poems", "unknown").await.unwrap();
        assert!(doc.is_none());
    }
}
