//! Catalog test utilities backed by a mockito server

use mockito::{Mock, ServerGuard};

use app_update_checker::config::{AppStoreConfig, CatalogsConfig, CommunityConfig};

pub const TEST_API_KEY: &str = "test-key";

/// Catalog configuration pointing both catalogs at `server`
pub fn catalogs_config(server: &ServerGuard) -> CatalogsConfig {
    CatalogsConfig {
        community: CommunityConfig {
            enabled: true,
            url: format!("{}/api/apps", server.url()),
            api_key: TEST_API_KEY.to_string(),
            app_url: format!("{}/community/app", server.url()),
        },
        app_store: AppStoreConfig {
            enabled: true,
            base_url: server.url(),
        },
    }
}

/// Serve the community listing
pub async fn mock_community_listing(server: &mut ServerGuard, body: &str) -> Mock {
    server
        .mock("GET", "/api/apps")
        .match_header("x-api-key", TEST_API_KEY)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Serve an app store release page embedding `version`
pub async fn mock_store_page(server: &mut ServerGuard, path: &str, version: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_body(format!(
            "<html><script>window.hy_app_version={};</script></html>",
            version
        ))
        .create_async()
        .await
}

/// Serve an app store test-channel page embedding `version`
#[allow(dead_code)]
pub async fn mock_store_test_page(server: &mut ServerGuard, path: &str, version: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_body(format!(
            r#"<html><div class="app" hy-app-version="{}"></div></html>"#,
            version
        ))
        .create_async()
        .await
}

/// Answer `path` with the given status
pub async fn mock_status(server: &mut ServerGuard, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .create_async()
        .await
}
