use thiserror::Error;

/// Failure of a single HTTP GET
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("No data (204)")]
    NoData,

    #[error("Redirect (302) to '{location}'")]
    Redirect { location: String },

    #[error("Bad request (400)")]
    BadRequest,

    #[error("Unauthorized (401)")]
    Unauthorized,

    #[error("Forbidden (403)")]
    Forbidden,

    #[error("Not found (404)")]
    NotFound,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status: {0}")]
    OtherStatus(u16),
}

impl FetchError {
    /// Classify a non-200 status. `location` is only used for 302.
    pub fn from_status(code: u16, location: Option<String>) -> Self {
        match code {
            204 => Self::NoData,
            302 => Self::Redirect {
                location: location.unwrap_or_default(),
            },
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            other => Self::OtherStatus(other),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(FetchError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid setting value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Failed to read inventory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid inventory: {0}")]
    Parse(#[from] serde_json::Error),
}
