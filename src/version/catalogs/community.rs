//! Community store catalog: one JSON listing per run, looked up locally per app

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::CommunityConfig;
use crate::version::catalog::CatalogClient;
use crate::version::error::CatalogError;
use crate::version::fetcher::{FetchOptions, Fetcher};
use crate::version::types::{InstalledComponent, StoreVersionInfo};

/// Header carrying the static API key
const API_KEY_HEADER: &str = "x-api-key";

/// Entry of the community store listing
#[derive(Debug, Clone, Deserialize)]
struct CommunityApp {
    id: String,
    version: String,
}

/// Snapshot of the community store listing for one run
pub struct CommunityCatalog {
    /// `None` when the listing could not be fetched this run
    apps: Option<Vec<CommunityApp>>,
    app_url: String,
}

impl CommunityCatalog {
    /// Fetches the whole listing once
    pub async fn fetch(
        fetcher: &dyn Fetcher,
        config: &CommunityConfig,
    ) -> Result<Self, CatalogError> {
        let options = FetchOptions::default().with_header(API_KEY_HEADER, &config.api_key);
        let body = fetcher
            .fetch(&config.url, &options)
            .await
            .map_err(CatalogError::Unavailable)?;

        let apps: Vec<CommunityApp> = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse community store listing: {}", e);
            CatalogError::Parse(e.to_string())
        })?;
        debug!("Community store lists {} apps", apps.len());

        Ok(Self {
            apps: Some(apps),
            app_url: config.app_url.clone(),
        })
    }

    /// A catalog that answers nothing, used when the listing is not available
    pub fn unavailable(config: &CommunityConfig) -> Self {
        Self {
            apps: None,
            app_url: config.app_url.clone(),
        }
    }

    /// Fetches the listing, degrading to [`CommunityCatalog::unavailable`] on failure
    pub async fn fetch_or_unavailable(fetcher: &dyn Fetcher, config: &CommunityConfig) -> Self {
        if !config.enabled {
            debug!("Community store disabled");
            return Self::unavailable(config);
        }

        match Self::fetch(fetcher, config).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Community store not available this run: {}", e);
                Self::unavailable(config)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.apps.is_some()
    }

    pub fn lookup(&self, component_id: &str) -> Option<StoreVersionInfo> {
        let app = self.apps.as_ref()?.iter().find(|app| app.id == component_id)?;
        Some(StoreVersionInfo {
            release_version: app.version.clone(),
            test_version: app.version.clone(),
            url: format!("{}/{}", self.app_url, app.id),
        })
    }
}

#[async_trait::async_trait]
impl CatalogClient for CommunityCatalog {
    async fn version_info(&self, component: &InstalledComponent) -> Option<StoreVersionInfo> {
        self.lookup(&component.id)
    }
}
