pub mod books;

use std::sync::Arc;

use bookstore_db::DocumentStore;
use bookstore_kernel::{settings::DatabaseSettings, ModuleRegistry};

/// Register all service modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: Arc<dyn DocumentStore>,
    database: &DatabaseSettings,
) {
    registry.register(books::create_module(store, &database.collection));
}
