use std::sync::Arc;

use mehfil_db::DocumentStore;
use mehfil_services::{IdentityProvider, ImageHost, MediaFeed};

use crate::settings::Settings;

/// Shared application state handed to every request handler.
///
/// All clients are constructed once at bootstrap and injected here; no module
/// owns a global SDK instance.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub images: Arc<dyn ImageHost>,
    pub media: Arc<dyn MediaFeed>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        images: Arc<dyn ImageHost>,
        media: Arc<dyn MediaFeed>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
            identity,
            images,
            media,
        }
    }
}
