//! Catalog implementations for looking up app versions

pub mod app_store;
pub mod community;

pub use app_store::AppStoreCatalog;
pub use community::CommunityCatalog;
