use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Claims extracted from a verified id token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Verifies end-user credentials. Token validation itself stays delegated to
/// the provider; this side only forwards and interprets the verdict.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityClaims, ServiceError>;
}

/// Identity provider reached over its HTTP verification endpoint.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpIdentityProvider {
    pub fn new(verify_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url: verify_url.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityClaims, ServiceError> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ServiceError::Rejected);
        }
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!(
                "identity provider answered {status}"
            )));
        }

        let claims: IdentityClaims = response.json().await?;
        tracing::debug!(uid = %claims.uid, "id token verified");
        Ok(claims)
    }
}
