//! Catalog trait for looking up the published versions of an installed app

#[cfg(test)]
use mockall::automock;

use crate::version::types::{InstalledComponent, StoreVersionInfo};

/// Kind of catalog an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogSource {
    /// Structured JSON catalog maintained by the community
    Community,
    /// Scraped pages of the primary app store
    AppStore,
}

impl CatalogSource {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogSource::Community => "Community Store",
            CatalogSource::AppStore => "Athom Store",
        }
    }
}

/// Trait for looking up an app in a catalog
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Looks up the published versions of `component`
    ///
    /// # Returns
    /// * `Some(StoreVersionInfo)` - The catalog knows the app
    /// * `None` - Unknown app, or the catalog could not be read; failures are
    ///   logged and never propagated so one app cannot abort a run
    async fn version_info(&self, component: &InstalledComponent) -> Option<StoreVersionInfo>;
}
