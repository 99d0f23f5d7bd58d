pub mod books;
pub mod categories;
pub mod web;

use bookstore_kernel::ModuleRegistry;

use crate::app::Catalog;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, catalog: &Catalog) {
    registry.register(books::create_module(catalog.books.clone()));
    registry.register(categories::create_module(catalog.categories.clone()));
    registry.register(web::create_module(catalog.clone()));
}
