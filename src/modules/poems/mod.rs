pub mod models;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use mehfil_db::slug::slugify_all;
use mehfil_db::{get_by_slug, now_rfc3339, Document};
use mehfil_http::error::AppError;
use mehfil_kernel::{AppState, InitCtx, Module};

use models::{CreatePoem, PoemQuery};

/// Poems module: slug-addressed create and read.
pub struct PoemsModule;

impl PoemsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for PoemsModule {
    fn name(&self) -> &'static str {
        "poems"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "poems module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/", post(create_poem).get(read_poem))
    }

    fn collections(&self) -> Vec<&'static str> {
        vec!["poems"]
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create or merge-update a poem",
                        "tags": ["Poems"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreatePoem" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Merged poem document",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Poem" }
                                    }
                                }
                            },
                            "400": {
                                "description": "No slug derivable from the input",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "get": {
                        "summary": "Read a poem by slug",
                        "tags": ["Poems"],
                        "parameters": [
                            {
                                "name": "slug",
                                "in": "query",
                                "required": true,
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Poem document",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Poem" }
                                    }
                                }
                            },
                            "404": {
                                "description": "Unknown slug",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Poem": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "slug": { "type": "string" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "category": { "type": "string" },
                            "lines": { "type": "array", "items": { "type": "string" } },
                            "language": { "type": "string" },
                            "excerpt": { "type": "string" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "publishedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "slug", "title", "author", "category"]
                    },
                    "CreatePoem": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "category": { "type": "string" },
                            "lines": { "type": "array", "items": { "type": "string" } },
                            "language": { "type": "string" },
                            "excerpt": { "type": "string" },
                            "publishedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["title", "author", "category"]
                    }
                }
            }
        }))
    }
}

/// Create or merge-update a poem, keyed by its derived slug.
pub async fn create_poem(
    State(state): State<AppState>,
    Json(req): Json<CreatePoem>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let slug = slugify_all([req.title.as_str(), req.author.as_str(), req.category.as_str()]);
    if slug.is_empty() {
        return Err(AppError::validation(
            vec![json!({
                "fields": ["title", "author", "category"],
                "error": "must contain at least one alphanumeric character"
            })],
            "could not derive a slug from title/author/category",
        ));
    }

    let mut fields = Map::new();
    fields.insert("slug".to_string(), Value::String(slug.clone()));
    fields.insert("title".to_string(), Value::String(req.title));
    fields.insert("author".to_string(), Value::String(req.author));
    fields.insert("category".to_string(), Value::String(req.category));
    if !req.lines.is_empty() {
        fields.insert("lines".to_string(), json!(req.lines));
    }
    if let Some(language) = req.language {
        fields.insert("language".to_string(), Value::String(language));
    }
    if let Some(excerpt) = req.excerpt {
        fields.insert("excerpt".to_string(), Value::String(excerpt));
    }
    if let Some(published_at) = req.published_at {
        fields.insert("publishedAt".to_string(), Value::String(published_at));
    }

    // createdAt is set once; re-upserts must not move a poem in the ordering.
    if state.store.get("poems", &slug).await?.is_none() {
        fields.insert("createdAt".to_string(), Value::String(now_rfc3339()?));
    }

    let doc = state.store.upsert_merge("poems", &slug, fields).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// Read a poem by slug; unknown slugs answer 404.
pub async fn read_poem(
    State(state): State<AppState>,
    Query(query): Query<PoemQuery>,
) -> Result<Json<Document>, AppError> {
    let slug = query
        .slug
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("slug query parameter is required"))?;

    match get_by_slug(state.store.as_ref(), "poems", &slug).await? {
        Some(doc) => Ok(Json(doc)),
        None => Err(AppError::not_found(format!("no poem with slug '{slug}'"))),
    }
}

/// Create a new instance of the poems module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(PoemsModule::new())
}
