use async_trait::async_trait;

use crate::ServiceError;

/// Pushes an uploaded file to the image host and hands back its public URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError>;
}

/// Image host reached over its multipart upload endpoint.
pub struct HttpImageHost {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpImageHost {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| ServiceError::Upstream(format!("invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("key", self.api_key.clone())
            .part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!(
                "image host answered {status}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        // Hosts differ on envelope shape; accept both `data.url` and `url`.
        let url = body["data"]["url"]
            .as_str()
            .or_else(|| body["url"].as_str())
            .ok_or_else(|| ServiceError::Upstream("upload response carried no url".to_string()))?;

        tracing::debug!(%url, "image uploaded");
        Ok(url.to_string())
    }
}
