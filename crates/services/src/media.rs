use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// One media entry from the social account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub media_url: String,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One fetched page; `next` is the opaque token for the following page, if any.
#[derive(Debug, Clone)]
pub struct MediaPage {
    pub items: Vec<MediaItem>,
    pub next: Option<String>,
}

/// Page-at-a-time access to the social account's media. Loop bounds are the
/// caller's responsibility.
#[async_trait]
pub trait MediaFeed: Send + Sync {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<MediaPage, ServiceError>;
}

/// Media feed backed by the social platform's graph API.
pub struct GraphMediaFeed {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GraphMediaFeed {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphPage {
    #[serde(default)]
    data: Vec<MediaItem>,
    #[serde(default)]
    paging: Option<GraphPaging>,
}

#[derive(Debug, Deserialize)]
struct GraphPaging {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    cursors: Option<GraphCursors>,
}

#[derive(Debug, Deserialize)]
struct GraphCursors {
    #[serde(default)]
    after: Option<String>,
}

#[async_trait]
impl MediaFeed for GraphMediaFeed {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<MediaPage, ServiceError> {
        let mut query = vec![
            ("fields", "id,media_url,permalink,caption,timestamp"),
            ("access_token", self.access_token.as_str()),
        ];
        if let Some(after) = cursor {
            query.push(("after", after));
        }

        let response = self
            .client
            .get(format!("{}/me/media", self.base_url))
            .query(&query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!(
                "media API answered {status}"
            )));
        }

        let page: GraphPage = response.json().await?;
        // A further page exists only when the API advertises `paging.next`.
        let next = page.paging.and_then(|p| match p.next {
            Some(_) => p.cursors.and_then(|c| c.after),
            None => None,
        });

        Ok(MediaPage {
            items: page.data,
            next,
        })
    }
}
