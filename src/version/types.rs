//! Data types shared by the catalogs, the ledger and the update resolver

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_UPDATE_HOUR, DEFAULT_UPDATE_MINUTE};

/// Where an installed app was installed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The primary app store, which also publishes a test channel
    AppStore,
    #[default]
    #[serde(other)]
    Other,
}

/// An app reported by the inventory for the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledComponent {
    pub id: String,
    pub name: String,
    pub version: String,
    pub origin: Origin,
}

/// Versions a catalog reports for one app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreVersionInfo {
    pub release_version: String,
    /// Same as `release_version` when the catalog has no test channel
    pub test_version: String,
    /// Page of the app in the catalog
    pub url: String,
}

/// An already reported version, keyed by `(component_id, source)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedEntry {
    pub component_id: String,
    pub source: String,
    pub version: String,
}

/// One outstanding update shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListEntry {
    pub url: String,
    pub display_name: String,
}

/// Wall-clock time of the daily check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
}

impl ScheduleConfig {
    /// Out-of-range values are clamped to 23:59
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    pub fn time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_HOUR, DEFAULT_UPDATE_MINUTE)
    }
}
