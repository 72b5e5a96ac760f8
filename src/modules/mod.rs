pub mod auth;
pub mod feed;
pub mod instagram;
pub mod payments;
pub mod poems;
pub mod poets;
pub mod shows;
pub mod treasury;
pub mod upload;

use mehfil_kernel::ModuleRegistry;

/// Register all content modules with the registry.
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(auth::create_module());
    registry.register(poems::create_module());
    registry.register(poets::create_module());
    registry.register(treasury::create_module());
    registry.register(shows::create_module());
    registry.register(feed::create_module());
    registry.register(payments::create_module());
    registry.register(upload::create_module());
    registry.register(instagram::create_module());
}
