//! HTTP server facade for mehfil: Axum router assembly, error handling, and
//! OpenAPI support.

use anyhow::Context;
use axum::routing::get;

use mehfil_kernel::{AppState, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server with the given module registry and shared state.
pub async fn start_server(registry: &ModuleRegistry, state: AppState) -> anyhow::Result<()> {
    let host = state.settings.server.host.clone();
    let port = state.settings.server.port;

    let app = build_router(registry, state).context("failed to build HTTP router")?;

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .context("failed to bind to address")?;

    tracing::info!("HTTP server listening on http://{host}:{port}");

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes mounted.
pub fn build_router(registry: &ModuleRegistry, state: AppState) -> anyhow::Result<axum::Router> {
    let mut builder = RouterBuilder::new()
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(state.settings.server.request_timeout_ms)
        .route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            "mounting module routes under /api/{}",
            module.name()
        );
        builder = builder
            .mount_module(module.name(), module.routes())
            .merge_public(module.public_routes());
    }

    builder = builder.with_openapi(registry);

    Ok(builder.build(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use mehfil_db::MemoryStore;
    use mehfil_kernel::settings::Settings;
    use mehfil_kernel::AppState;
    use mehfil_services::{
        IdentityClaims, IdentityProvider, ImageHost, MediaFeed, MediaPage, ServiceError,
    };

    struct NoIdentity;

    #[async_trait]
    impl IdentityProvider for NoIdentity {
        async fn verify_id_token(&self, _: &str) -> Result<IdentityClaims, ServiceError> {
            Err(ServiceError::Rejected)
        }
    }

    struct NoImages;

    #[async_trait]
    impl ImageHost for NoImages {
        async fn upload(&self, _: &str, _: &str, _: Vec<u8>) -> Result<String, ServiceError> {
            Err(ServiceError::Upstream("unavailable".to_string()))
        }
    }

    struct NoMedia;

    #[async_trait]
    impl MediaFeed for NoMedia {
        async fn fetch_page(&self, _: Option<&str>) -> Result<MediaPage, ServiceError> {
            Ok(MediaPage {
                items: vec![],
                next: None,
            })
        }
    }

    pub fn test_state() -> AppState {
        AppState::new(
            Settings::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(NoIdentity),
            Arc::new(NoImages),
            Arc::new(NoMedia),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mehfil_kernel::ModuleRegistry;

    #[tokio::test]
    async fn empty_registry_builds_a_router() {
        let registry = ModuleRegistry::new();
        let _router = build_router(&registry, test_support::test_state()).unwrap();
    }
}
