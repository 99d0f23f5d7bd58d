//! Bookstore catalogue: books and categories over a JSON API and HTML pages.

pub mod app;
pub mod error;
pub mod modules;
pub mod store;
pub mod utils;

pub use app::{build_registry, Application, Catalog};
pub use error::{CatalogError, CatalogResult};
