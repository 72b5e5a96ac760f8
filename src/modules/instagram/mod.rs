use async_trait::async_trait;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use mehfil_http::error::AppError;
use mehfil_kernel::{AppState, Module};

/// Instagram module: aggregates the account's media across API pages.
pub struct InstagramModule;

impl InstagramModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for InstagramModule {
    fn name(&self) -> &'static str {
        "instagram"
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/", get(list_media))
    }
}

/// Walk the paginated media feed until it ends, the item cap fills, or the
/// page-fetch bound trips.
pub async fn list_media(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let max_items = state.settings.instagram.max_items;
    let max_fetches = state.settings.instagram.max_page_fetches;

    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    for fetch in 0..max_fetches {
        let page = state
            .media
            .fetch_page(cursor.as_deref())
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        items.extend(page.items);

        if items.len() >= max_items {
            tracing::debug!(fetches = fetch + 1, "media item cap reached");
            items.truncate(max_items);
            break;
        }
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(Json(json!({
        "items": items,
        "count": items.len(),
    })))
}

/// Create a new instance of the instagram module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(InstagramModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::{media_item, state_with_feed, FakeFeed};
    use mehfil_services::MediaPage;
    use std::collections::HashMap;

    #[tokio::test]
    async fn follows_pages_to_the_end() {
        let mut pages = HashMap::new();
        pages.insert(
            None,
            MediaPage {
                items: vec![media_item("a"), media_item("b")],
                next: Some("p2".to_string()),
            },
        );
        pages.insert(
            Some("p2".to_string()),
            MediaPage {
                items: vec![media_item("c")],
                next: None,
            },
        );

        let state = state_with_feed(FakeFeed { pages });
        let Json(body) = list_media(State(state)).await.unwrap();
        assert_eq!(body["count"], 3);
        assert_eq!(body["items"][2]["id"], "c");
    }

    #[tokio::test]
    async fn self_referencing_feed_stops_at_the_fetch_bound() {
        // One page that always advertises itself as next.
        let mut pages = HashMap::new();
        let looping = MediaPage {
            items: vec![media_item("loop")],
            next: Some("again".to_string()),
        };
        pages.insert(None, looping.clone());
        pages.insert(Some("again".to_string()), looping);

        let state = state_with_feed(FakeFeed { pages });
        let max_fetches = state.settings.instagram.max_page_fetches;

        let Json(body) = list_media(State(state)).await.unwrap();
        assert_eq!(body["count"], max_fetches);
    }

    #[tokio::test]
    async fn item_cap_truncates_large_pages() {
        let mut pages = HashMap::new();
        let bulk: Vec<_> = (0..600).map(|i| media_item(&format!("m{i}"))).collect();
        pages.insert(
            None,
            MediaPage {
                items: bulk.clone(),
                next: Some("p2".to_string()),
            },
        );
        pages.insert(
            Some("p2".to_string()),
            MediaPage {
                items: bulk,
                next: Some("p3".to_string()),
            },
        );

        let state = state_with_feed(FakeFeed { pages });
        let Json(body) = list_media(State(state)).await.unwrap();
        assert_eq!(body["count"], 1000);
    }
}
