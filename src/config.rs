use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each per-app lookup to avoid hammering the store (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// Delay before the first check after startup so the host can finish loading (5 seconds)
pub const INITIAL_CHECK_DELAY_MS: u64 = 5_000;

/// Default daily check time (08:00 local time)
pub const DEFAULT_UPDATE_HOUR: u32 = 8;
pub const DEFAULT_UPDATE_MINUTE: u32 = 0;

// =============================================================================
// Catalog defaults
// =============================================================================

const DEFAULT_COMMUNITY_URL: &str = "https://api.homey.community/v1/apps";
const DEFAULT_COMMUNITY_APP_URL: &str = "https://store.homey.community/app";
const DEFAULT_APP_STORE_BASE_URL: &str = "https://homey.app";

/// User agent sent with every catalog request
pub const USER_AGENT: &str = "app-update-checker";

/// Top-level configuration, read from `config.json` in the data directory
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    pub catalogs: CatalogsConfig,
}

/// Catalog-specific configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogsConfig {
    pub community: CommunityConfig,
    pub app_store: AppStoreConfig,
}

/// Structured JSON catalog (community store)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CommunityConfig {
    pub enabled: bool,
    /// Endpoint returning the list of `{id, version}` entries
    pub url: String,
    /// Static API key sent in the `x-api-key` header
    pub api_key: String,
    /// Base of the per-app page link shown in the update list
    pub app_url: String,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_COMMUNITY_URL.to_string(),
            api_key: String::new(),
            app_url: DEFAULT_COMMUNITY_APP_URL.to_string(),
        }
    }
}

/// Scraped HTML catalog (primary app store)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppStoreConfig {
    pub enabled: bool,
    /// Scheme and host of the store; redirects are resolved against it
    pub base_url: String,
}

impl Default for AppStoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_APP_STORE_BASE_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    /// Load configuration from a JSON file, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Returns the path to the data directory for app-update-checker.
/// Uses $XDG_DATA_HOME/app-update-checker if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/app-update-checker,
/// or ./app-update-checker if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the settings database.
pub fn db_path() -> PathBuf {
    data_dir().join("settings.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("app-update-checker.log")
}

/// Returns the default path of the configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the default path of the installed-apps inventory.
pub fn inventory_path() -> PathBuf {
    data_dir().join("installed.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("app-update-checker")
}
