use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use mehfil_db::ListOptions;
use mehfil_http::error::AppError;
use mehfil_kernel::{AppState, Module};

/// Poems per treasury page.
const PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
pub struct TreasuryQuery {
    pub cursor: Option<String>,
}

/// Treasury module: the cursor-paginated poem listing.
pub struct TreasuryModule;

impl TreasuryModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for TreasuryModule {
    fn name(&self) -> &'static str {
        "treasury"
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/", get(list_treasury))
    }

    fn collections(&self) -> Vec<&'static str> {
        vec!["poems"]
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Paginated poem listing, newest first",
                        "tags": ["Treasury"],
                        "parameters": [
                            {
                                "name": "cursor",
                                "in": "query",
                                "required": false,
                                "description": "Opaque continuation token from the previous page",
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of poems",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "docs": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/Poem" }
                                                },
                                                "nextCursor": {
                                                    "type": "string",
                                                    "nullable": true
                                                }
                                            },
                                            "required": ["docs"]
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }))
    }
}

/// One page of poems ordered by creation time descending.
pub async fn list_treasury(
    State(state): State<AppState>,
    Query(query): Query<TreasuryQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let opts = ListOptions::new("createdAt", PAGE_SIZE).with_cursor(query.cursor);
    let page = state.store.list_page("poems", &opts).await?;

    Ok(Json(json!({
        "docs": page.docs,
        "nextCursor": page.next_cursor,
    })))
}

/// Create a new instance of the treasury module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(TreasuryModule::new())
}
