//! Inventory of installed apps

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use tracing::debug;

use crate::version::error::InventoryError;
use crate::version::types::{InstalledComponent, Origin};

/// Trait for listing the apps installed on the host
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Inventory: Send + Sync {
    async fn installed_components(&self) -> Result<Vec<InstalledComponent>, InventoryError>;
}

/// App record as published by the host, keyed by app id
#[derive(Debug, Deserialize)]
struct AppRecord {
    name: String,
    version: String,
    #[serde(default)]
    origin: Origin,
}

/// Parses a host inventory document: `{"<id>": {"name", "version", "origin"}}`
pub fn parse_inventory(content: &str) -> Result<Vec<InstalledComponent>, InventoryError> {
    let records: IndexMap<String, AppRecord> = serde_json::from_str(content)?;
    Ok(records
        .into_iter()
        .map(|(id, record)| InstalledComponent {
            id,
            name: record.name,
            version: record.version,
            origin: record.origin,
        })
        .collect())
}

/// [`Inventory`] read from a JSON file on every run
pub struct JsonFileInventory {
    path: PathBuf,
}

impl JsonFileInventory {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Inventory for JsonFileInventory {
    async fn installed_components(&self) -> Result<Vec<InstalledComponent>, InventoryError> {
        debug!("Reading inventory from {:?}", self.path);
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_inventory(&content)
    }
}
