use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::document::Document;
use crate::paging::{Direction, ListOptions, Page};
use crate::store::DocumentStore;

/// In-process document store engine.
///
/// Collections are ordered maps keyed by document id, guarded by one RwLock;
/// request handlers hold the lock only for the duration of a single call.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort key: ordering field as string, tie-broken by document id so that
/// identical timestamps still scan deterministically.
fn order_key<'a>(doc: &'a Document, field: &str) -> (&'a str, &'a str) {
    (doc.str_field(field).unwrap_or(""), doc.id.as_str())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self, collection: &str) -> anyhow::Result<()> {
        let mut guard = self.collections.write().await;
        guard.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard.get(collection).and_then(|coll| coll.get(id)).cloned())
    }

    async fn find_first(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Option<Document>> {
        let guard = self.collections.read().await;
        let Some(coll) = guard.get(collection) else {
            return Ok(None);
        };
        Ok(coll
            .values()
            .find(|doc| doc.fields.get(field) == Some(value))
            .cloned())
    }

    async fn upsert_merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> anyhow::Result<Document> {
        let mut guard = self.collections.write().await;
        let coll = guard.entry(collection.to_string()).or_default();
        match coll.get_mut(id) {
            Some(existing) => {
                existing.merge_from(&fields);
                Ok(existing.clone())
            }
            None => {
                let doc = Document::new(id, fields);
                coll.insert(id.to_string(), doc.clone());
                Ok(doc)
            }
        }
    }

    async fn list_page(&self, collection: &str, opts: &ListOptions) -> anyhow::Result<Page> {
        let guard = self.collections.read().await;
        let Some(coll) = guard.get(collection) else {
            return Ok(Page::empty());
        };

        let mut docs: Vec<&Document> = coll.values().collect();
        if let Some(bound) = &opts.start_at {
            docs.retain(|doc| doc.str_field(&opts.order_by).unwrap_or("") >= bound.as_str());
        }
        docs.sort_by(|a, b| {
            let (ka, kb) = (order_key(a, &opts.order_by), order_key(b, &opts.order_by));
            match opts.direction {
                Direction::Asc => ka.cmp(&kb),
                Direction::Desc => kb.cmp(&ka),
            }
        });

        // A cursor that no longer resolves restarts the scan from the top.
        let start = match &opts.cursor {
            Some(cursor) => docs
                .iter()
                .position(|doc| &doc.id == cursor)
                .map(|idx| idx + 1)
                .unwrap_or(0),
            None => 0,
        };

        let page: Vec<Document> = docs
            .into_iter()
            .skip(start)
            .take(opts.page_size)
            .cloned()
            .collect();
        let next_cursor = if page.len() == opts.page_size && opts.page_size > 0 {
            page.last().map(|doc| doc.id.clone())
        } else {
            None
        };

        Ok(Page {
            docs: page,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn seed_poems(store: &MemoryStore, count: usize) {
        for i in 0..count {
            store
                .upsert_merge(
                    "poems",
                    &format!("poem-{i:03}"),
                    fields(&[
                        ("title", json!(format!("Poem {i}"))),
                        ("createdAt", json!(format!("2026-01-{:02}T00:00:00Z", i % 28 + 1))),
                    ]),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn upsert_then_get_is_a_superset_merge() {
        let store = MemoryStore::new();
        store
            .upsert_merge(
                "poems",
                "raat",
                fields(&[("title", json!("Raat")), ("language", json!("ur"))]),
            )
            .await
            .unwrap();
        let merged = store
            .upsert_merge("poems", "raat", fields(&[("excerpt", json!("pehli raat"))]))
            .await
            .unwrap();

        // Returned document reflects the write.
        assert_eq!(merged.str_field("excerpt"), Some("pehli raat"));

        let read = store.get("poems", "raat").await.unwrap().unwrap();
        assert_eq!(read.str_field("title"), Some("Raat"));
        assert_eq!(read.str_field("language"), Some("ur"));
        assert_eq!(read.str_field("excerpt"), Some("pehli raat"));
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("poems", "unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pages_concatenate_to_the_full_set() {
        let store = MemoryStore::new();
        seed_poems(&store, 25).await;

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        let mut sizes = Vec::new();
        loop {
            let opts = ListOptions::new("createdAt", 10).with_cursor(cursor.clone());
            let page = store.list_page("poems", &opts).await.unwrap();
            sizes.push(page.docs.len());
            seen.extend(page.docs.into_iter().map(|d| d.id));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(seen.len(), 25);
        let mut dedup = seen.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 25, "pages must not repeat documents");
    }

    #[tokio::test]
    async fn identical_timestamps_order_by_id() {
        let store = MemoryStore::new();
        for id in ["b", "a", "c"] {
            store
                .upsert_merge(
                    "poems",
                    id,
                    fields(&[("createdAt", json!("2026-05-01T00:00:00Z"))]),
                )
                .await
                .unwrap();
        }

        let page = store
            .list_page("poems", &ListOptions::new("createdAt", 10))
            .await
            .unwrap();
        let ids: Vec<&str> = page.docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn stale_cursor_restarts_from_the_beginning() {
        let store = MemoryStore::new();
        seed_poems(&store, 5).await;

        let first = store
            .list_page("poems", &ListOptions::new("createdAt", 2))
            .await
            .unwrap();
        let opts = ListOptions::new("createdAt", 2)
            .with_cursor(Some("poem-deleted-since".to_string()));
        let retried = store.list_page("poems", &opts).await.unwrap();

        assert_eq!(retried.docs[0].id, first.docs[0].id);
    }

    #[tokio::test]
    async fn ascending_scan_with_lower_bound() {
        let store = MemoryStore::new();
        for (id, date) in [
            ("past", "2026-01-01T20:00:00Z"),
            ("soon", "2026-09-10T20:00:00Z"),
            ("later", "2026-11-02T20:00:00Z"),
        ] {
            store
                .upsert_merge("shows", id, fields(&[("date", json!(date))]))
                .await
                .unwrap();
        }

        let opts = ListOptions::new("date", 10)
            .ascending()
            .starting_at("2026-08-24T00:00:00Z");
        let page = store.list_page("shows", &opts).await.unwrap();
        let ids: Vec<&str> = page.docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "later"]);
    }

    #[tokio::test]
    async fn find_first_matches_field_value() {
        let store = MemoryStore::new();
        seed_poems(&store, 3).await;
        let hit = store
            .find_first("poems", "title", &json!("Poem 1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "poem-001");

        let miss = store
            .find_first("poems", "title", &json!("Poem 99"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}
