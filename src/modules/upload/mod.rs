use async_trait::async_trait;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use mehfil_http::error::AppError;
use mehfil_kernel::{AppState, Module};

/// Upload module: proxies a multipart file to the image host.
pub struct UploadModule;

impl UploadModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for UploadModule {
    fn name(&self) -> &'static str {
        "upload"
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/", post(upload_image))
    }
}

/// Forward the `file` field to the image host and answer with its URL.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("failed to read file field: {e}")))?;

        let url = state
            .images
            .upload(&filename, &content_type, bytes.to_vec())
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        return Ok(Json(json!({ "url": url })));
    }

    Err(AppError::bad_request("multipart field 'file' is required"))
}

/// Create a new instance of the upload module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(UploadModule::new())
}
