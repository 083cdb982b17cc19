//! Version lookup layer for installed apps
//!
//! This module provides the core functionality for fetching, comparing and
//! remembering app versions published by the catalogs (community store,
//! app store).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │────▶│  Catalogs   │────▶│   Compare   │
//! │ (http, 302) │     │(community,  │     │ (x.y.z cmp) │
//! └─────────────┘     │  app store) │     └─────────────┘
//!                     └─────────────┘            │
//!                                                ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Store     │◀────│  Settings   │◀────│   Ledger    │
//! │  (SQLite)   │     │ (typed keys)│     │  (dedup)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Catalog trait for looking up an app's published versions
//! - [`catalogs`]: Concrete catalogs (community store, app store)
//! - [`compare`]: Dotted numeric version comparison
//! - [`error`]: Error types for fetching, catalogs, settings and inventory
//! - [`fetcher`]: HTTP fetch with status classification and one redirect follow
//! - [`inventory`]: Installed-app provider trait and JSON file implementation
//! - [`ledger`]: Already reported versions, one per app and source
//! - [`settings`]: Typed access to the host settings keys
//! - [`store`]: Key/value settings trait and SQLite implementation
//! - [`types`]: Common types like `InstalledComponent`

pub mod catalog;
pub mod catalogs;
pub mod compare;
pub mod error;
pub mod fetcher;
pub mod inventory;
pub mod ledger;
pub mod settings;
pub mod store;
pub mod types;
