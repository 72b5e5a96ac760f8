use async_trait::async_trait;
use axum::Router;

use crate::state::AppState;

/// Context provided to modules during initialization and startup.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub state: &'a AppState,
}

/// Core module trait implemented by every content module.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module.
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context.
    /// Called during application startup before collections are ensured.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Router for this module's API routes, mounted under `/api/{module_name}`.
    fn routes(&self) -> Router<AppState> {
        Router::new()
    }

    /// Routes mounted at the server root rather than under `/api`.
    /// Used for non-JSON surfaces such as the RSS feed.
    fn public_routes(&self) -> Router<AppState> {
        Router::new()
    }

    /// OpenAPI specification fragment for this module as JSON.
    /// Merged with other modules' specs.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Document collections this module reads or writes.
    /// The bootstrap ensures each exists before the server starts.
    fn collections(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Start background work for this module, after collections exist.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources during shutdown.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
