use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use mehfil_db::slug::slugify;
use mehfil_db::{now_rfc3339, Document};
use mehfil_http::error::AppError;
use mehfil_kernel::{AppState, Module};

/// Request model for creating a poet profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePoet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
}

/// Poets module: profile creation keyed by name slug.
pub struct PoetsModule;

impl PoetsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for PoetsModule {
    fn name(&self) -> &'static str {
        "poets"
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/", post(create_poet))
    }

    fn collections(&self) -> Vec<&'static str> {
        vec!["poets"]
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create a poet profile",
                        "tags": ["Poets"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreatePoet" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Poet document",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Poet" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing name, bio, or image",
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
                    "Poet": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "slug": { "type": "string" },
                            "name": { "type": "string" },
                            "bio": { "type": "string" },
                            "image": { "type": "string", "format": "uri" },
                            "createdAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "slug", "name", "bio", "image"]
                    },
                    "CreatePoet": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "bio": { "type": "string" },
                            "image": { "type": "string", "format": "uri" }
                        },
                        "required": ["name", "bio", "image"]
                    }
                }
            }
        }))
    }
}

/// Create (or merge-update) a poet. All of name/bio/image must be present.
pub async fn create_poet(
    State(state): State<AppState>,
    Json(req): Json<CreatePoet>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let mut missing = Vec::new();
    for (field, value) in [("name", &req.name), ("bio", &req.bio), ("image", &req.image)] {
        if value.trim().is_empty() {
            missing.push(json!({"field": field, "error": "required"}));
        }
    }
    if !missing.is_empty() {
        return Err(AppError::validation(
            missing,
            "name, bio, and image are all required",
        ));
    }

    let slug = slugify(&req.name);
    if slug.is_empty() {
        return Err(AppError::validation(
            vec![json!({"field": "name", "error": "must contain at least one alphanumeric character"})],
            "could not derive a slug from the name",
        ));
    }

    let mut fields = Map::new();
    fields.insert("slug".to_string(), Value::String(slug.clone()));
    fields.insert("name".to_string(), Value::String(req.name));
    fields.insert("bio".to_string(), Value::String(req.bio));
    fields.insert("image".to_string(), Value::String(req.image));
    if state.store.get("poets", &slug).await?.is_none() {
        fields.insert("createdAt".to_string(), Value::String(now_rfc3339()?));
    }

    let doc = state.store.upsert_merge("poets", &slug, fields).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// Create a new instance of the poets module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(PoetsModule::new())
}
