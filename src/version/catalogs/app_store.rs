//! App store catalog scraped from the public app pages
//!
//! The release page embeds `hy_app_version=1.2.3`; the test-channel page
//! (`<page>test/`) embeds `hy-app-version="1.2.4"`.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::version::catalog::CatalogClient;
use crate::version::error::CatalogError;
use crate::version::fetcher::{FetchOptions, Fetched, Fetcher, fetch_following_redirect};
use crate::version::types::{InstalledComponent, StoreVersionInfo};

static RELEASE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"hy_app_version=([0-9.]+)").expect("valid release marker"));

static TEST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"hy-app-version="([0-9.]+)""#).expect("valid test marker"));

/// Catalog implementation reading app store pages
pub struct AppStoreCatalog {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl AppStoreCatalog {
    /// Creates a catalog for the store at `base_url` (scheme and host, no trailing slash)
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Canonical page of an app: the display name with spaces replaced by hyphens
    pub fn page_url(&self, component: &InstalledComponent) -> String {
        format!(
            "{}/en-us/app/{}/{}/",
            self.base_url,
            component.id,
            slugify(&component.name)
        )
    }

    async fn release_page(
        &self,
        component: &InstalledComponent,
    ) -> Result<(Fetched, String), CatalogError> {
        let page = fetch_following_redirect(
            &*self.fetcher,
            &self.page_url(component),
            &FetchOptions::default(),
            &self.base_url,
        )
        .await?;

        let release = extract_version(&RELEASE_MARKER, &page.body).ok_or_else(|| {
            CatalogError::Parse(format!("no release version marker at {}", page.url))
        })?;

        Ok((page, release))
    }

    async fn test_version(&self, page_url: &str) -> Option<String> {
        let url = test_page_url(page_url);
        match self.fetcher.fetch(&url, &FetchOptions::default()).await {
            Ok(body) => extract_version(&TEST_MARKER, &body),
            Err(e) => {
                // Most apps have no test channel
                debug!("No test channel at {}: {}", url, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl CatalogClient for AppStoreCatalog {
    async fn version_info(&self, component: &InstalledComponent) -> Option<StoreVersionInfo> {
        let (page, release_version) = match self.release_page(component).await {
            Ok(found) => found,
            Err(e) => {
                warn!("App store lookup failed for {}: {}", component.id, e);
                return None;
            }
        };

        let test_version = self
            .test_version(&page.url)
            .await
            .unwrap_or_else(|| release_version.clone());

        Some(StoreVersionInfo {
            release_version,
            test_version,
            url: page.url,
        })
    }
}

/// URL of the test-channel page for a resolved app page
pub fn test_page_url(page_url: &str) -> String {
    if page_url.ends_with('/') {
        format!("{}test/", page_url)
    } else {
        format!("{}/test/", page_url)
    }
}

fn slugify(name: &str) -> String {
    name.replace(' ', "-")
}

fn extract_version(marker: &Regex, body: &str) -> Option<String> {
    marker
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
