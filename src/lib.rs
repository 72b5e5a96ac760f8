//! Mehfil application library.
//!
//! Content modules (poems, poets, treasury, shows, feed, auth, payments,
//! upload, instagram) plus the bootstrap sequence that wires them to the
//! document store and the external SaaS clients.

use std::sync::Arc;

use anyhow::Context;

use mehfil_kernel::settings::Settings;
use mehfil_kernel::{AppState, InitCtx, ModuleRegistry};
use mehfil_services::{GraphMediaFeed, HttpIdentityProvider, HttpImageHost};

pub mod modules;
pub mod utils;

/// Load settings, wire up the store and service clients, and serve HTTP until
/// the process is stopped.
pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load mehfil settings")?;
    mehfil_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.endpoint,
        "mehfil bootstrap starting"
    );

    let store = mehfil_db::connect(&settings.database.endpoint)
        .await
        .context("failed to open document store")?;
    let identity = Arc::new(HttpIdentityProvider::new(&settings.identity.verify_url));
    let images = Arc::new(HttpImageHost::new(
        &settings.images.endpoint,
        &settings.images.api_key,
    ));
    let media = Arc::new(GraphMediaFeed::new(
        &settings.instagram.api_url,
        &settings.instagram.access_token,
    ));

    let state = AppState::new(settings, store, identity, images, media);

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    let ctx = InitCtx {
        settings: state.settings.as_ref(),
        state: &state,
    };
    registry.init_all(&ctx).await?;
    for collection in registry.collect_collections() {
        state.store.ensure_collection(collection).await?;
    }
    registry.start_all(&ctx).await?;

    tracing::info!("mehfil bootstrap complete");
    mehfil_http::start_server(&registry, state).await
}
