use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};

/// Module registry: lifecycle management in registration order.
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module; registration order is lifecycle order.
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Initialize all modules in registration order.
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");
            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start all modules in registration order.
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");
            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop all modules in reverse registration order.
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");
            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Every collection declared by any module, deduplicated, in a stable
    /// order.
    pub fn collect_collections(&self) -> Vec<&'static str> {
        let mut collections: Vec<&'static str> = self
            .modules
            .iter()
            .flat_map(|module| module.collections())
            .collect();
        collections.sort_unstable();
        collections.dedup();
        collections
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::state::AppState;
    use async_trait::async_trait;
    use mehfil_db::MemoryStore;
    use mehfil_services::{
        IdentityClaims, IdentityProvider, ImageHost, MediaFeed, MediaPage, ServiceError,
    };

    struct TestModule {
        name: &'static str,
        collections: Vec<&'static str>,
    }

    #[async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn collections(&self) -> Vec<&'static str> {
            self.collections.clone()
        }
    }

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

    fn test_state() -> AppState {
        AppState::new(
            Settings::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(NoIdentity),
            Arc::new(NoImages),
            Arc::new(NoMedia),
        )
    }

    #[test]
    fn empty_registry() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_collections().is_empty());
    }

    #[test]
    fn collections_are_deduplicated() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule {
            name: "poems",
            collections: vec!["poems"],
        }));
        registry.register(Arc::new(TestModule {
            name: "treasury",
            collections: vec!["poems"],
        }));

        assert_eq!(registry.collect_collections(), vec!["poems"]);
    }

    #[tokio::test]
    async fn module_lifecycle() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule {
            name: "test",
            collections: vec![],
        }));

        let state = test_state();
        let ctx = InitCtx {
            settings: state.settings.as_ref(),
            state: &state,
        };

        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();

        assert!(registry.get_module("test").is_some());
        assert!(registry.get_module("missing").is_none());
    }
}
