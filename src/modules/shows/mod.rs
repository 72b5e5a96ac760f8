use async_trait::async_trait;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use mehfil_db::{now_rfc3339, ListOptions};
use mehfil_http::error::AppError;
use mehfil_kernel::{AppState, Module};

/// Upper bound on one upcoming listing; the show calendar is small.
const UPCOMING_LIMIT: usize = 100;

/// Shows module: upcoming live events.
pub struct ShowsModule;

impl ShowsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for ShowsModule {
    fn name(&self) -> &'static str {
        "shows"
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/upcoming", get(upcoming_shows))
    }

    fn collections(&self) -> Vec<&'static str> {
        vec!["shows"]
    }
}

/// Future-dated shows, soonest first.
pub async fn upcoming_shows(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let now = now_rfc3339()?;
    let opts = ListOptions::new("date", UPCOMING_LIMIT)
        .ascending()
        .starting_at(now);
    let page = state.store.list_page("shows", &opts).await?;

    Ok(Json(json!({ "shows": page.docs })))
}

/// Create a new instance of the shows module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ShowsModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support;
    use serde_json::{Map, Value};

    async fn seed_show(state: &AppState, id: &str, date: &str) {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(format!("Mehfil at {id}")));
        fields.insert("date".to_string(), Value::String(date.to_string()));
        state.store.upsert_merge("shows", id, fields).await.unwrap();
    }

    #[tokio::test]
    async fn past_shows_are_excluded_and_order_is_ascending() {
        let state = test_support::state();
        seed_show(&state, "lahore", "2020-01-01T19:00:00Z").await;
        seed_show(&state, "delhi", "2099-06-01T19:00:00Z").await;
        seed_show(&state, "karachi", "2099-02-01T19:00:00Z").await;

        let Json(body) = upcoming_shows(State(state)).await.unwrap();
        let ids: Vec<&str> = body["shows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|show| show["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["karachi", "delhi"]);
    }
}
