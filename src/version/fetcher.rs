//! HTTP fetch layer with status classification and a single redirect follow

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_MS, USER_AGENT};
use crate::version::error::FetchError;

/// Extra request options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub headers: Vec<(String, String)>,
}

impl FetchOptions {
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A successful fetch and the URL that actually served it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: String,
    pub url: String,
}

/// Trait for fetching a URL as text
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a GET and returns the buffered body on 200
    ///
    /// Any other status is returned as a classified [`FetchError`];
    /// redirects are never followed here.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError>;
}

/// [`Fetcher`] backed by reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            FetchError::from(e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            return Ok(response.text().await?);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Drain the body so the connection can be reused
        let _ = response.bytes().await;

        debug!("{} returned status {}", url, status);
        Err(FetchError::from_status(status.as_u16(), location))
    }
}

/// Fetch `url`, following at most one redirect.
///
/// A 302 is retried once against `redirect_base + location`; whatever that
/// second request returns (including another redirect) is final.
pub async fn fetch_following_redirect(
    fetcher: &dyn Fetcher,
    url: &str,
    options: &FetchOptions,
    redirect_base: &str,
) -> Result<Fetched, FetchError> {
    match fetcher.fetch(url, options).await {
        Ok(body) => Ok(Fetched {
            body,
            url: url.to_string(),
        }),
        Err(FetchError::Redirect { location }) => {
            let target = format!("{}{}", redirect_base, location);
            debug!("Following redirect from {} to {}", url, target);
            let body = fetcher.fetch(&target, options).await?;
            Ok(Fetched { body, url: target })
        }
        Err(e) => Err(e),
    }
}
