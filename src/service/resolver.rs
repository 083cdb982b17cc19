//! One update-check run: look every installed app up in the catalogs,
//! rebuild the update list and report new versions through the ledger

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::{CatalogsConfig, FETCH_STAGGER_DELAY_MS};
use crate::service::events::{EventSink, StatusUpdate, UpdateAvailableEvent};
use crate::version::catalog::{CatalogClient, CatalogSource};
use crate::version::catalogs::app_store::test_page_url;
use crate::version::catalogs::{AppStoreCatalog, CommunityCatalog};
use crate::version::compare::is_older;
use crate::version::error::{InventoryError, StoreError};
use crate::version::fetcher::Fetcher;
use crate::version::inventory::Inventory;
use crate::version::ledger::NotificationLedger;
use crate::version::settings;
use crate::version::store::SettingsStore;
use crate::version::types::{InstalledComponent, Origin, StoreVersionInfo, UpdateListEntry};

/// Failure that aborts a whole run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Settings error: {0}")]
    Store(#[from] StoreError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Release channel an update was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateChannel {
    Community,
    StoreProduction,
    StoreTest,
}

impl UpdateChannel {
    /// Source key used in the notification ledger
    pub fn ledger_key(&self) -> &'static str {
        match self {
            UpdateChannel::Community => "Community",
            UpdateChannel::StoreProduction => "Athom-Production",
            UpdateChannel::StoreTest => "Athom-Test",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpdateChannel::Community => CatalogSource::Community.label(),
            UpdateChannel::StoreProduction => CatalogSource::AppStore.label(),
            UpdateChannel::StoreTest => "Athom Store (test)",
        }
    }
}

/// A newer version found for one app on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedUpdate {
    pub channel: UpdateChannel,
    pub new_version: String,
    pub url: String,
}

impl DetectedUpdate {
    fn list_entry(&self, component: &InstalledComponent) -> UpdateListEntry {
        UpdateListEntry {
            url: self.url.clone(),
            display_name: format!(
                "{} {} ({})",
                component.name,
                self.new_version,
                self.channel.label()
            ),
        }
    }

    fn event(&self, component: &InstalledComponent) -> UpdateAvailableEvent {
        UpdateAvailableEvent {
            component_name: component.name.clone(),
            store_label: self.channel.label().to_string(),
            old_version: component.version.clone(),
            new_version: self.new_version.clone(),
        }
    }

    fn notification_text(&self, component: &InstalledComponent) -> String {
        format!(
            "Update available for {} on {} from {} to {}",
            component.name,
            self.channel.label(),
            component.version,
            self.new_version
        )
    }
}

/// Compares an installed app against what the catalogs report
///
/// The community answer is checked for every app. The store answer only
/// counts for apps installed from the store: a newer release wins over a
/// newer test version, which is only reported when the release is not newer.
pub fn detect_updates(
    component: &InstalledComponent,
    community: Option<&StoreVersionInfo>,
    store: Option<&StoreVersionInfo>,
) -> Vec<DetectedUpdate> {
    let mut updates = Vec::new();

    if let Some(info) = community.filter(|info| is_older(&component.version, &info.release_version))
    {
        updates.push(DetectedUpdate {
            channel: UpdateChannel::Community,
            new_version: info.release_version.clone(),
            url: info.url.clone(),
        });
    }

    if component.origin != Origin::AppStore {
        return updates;
    }

    if let Some(info) = store.filter(|info| is_older(&component.version, &info.test_version)) {
        if is_older(&component.version, &info.release_version) {
            updates.push(DetectedUpdate {
                channel: UpdateChannel::StoreProduction,
                new_version: info.release_version.clone(),
                url: info.url.clone(),
            });
        } else {
            updates.push(DetectedUpdate {
                channel: UpdateChannel::StoreTest,
                new_version: info.test_version.clone(),
                url: test_page_url(&info.url),
            });
        }
    }

    updates
}

/// Checks every app and returns the new update list.
///
/// Catalog lookups run concurrently and all of them settle before anything
/// is reported. Reporting then walks the apps in inventory order: every
/// detected update goes to the list, and only updates the ledger has not
/// seen trigger an event (plus a notification when `notify` is set).
pub async fn resolve_updates(
    components: &[InstalledComponent],
    community: &dyn CatalogClient,
    store: Option<&dyn CatalogClient>,
    notify: bool,
    ledger: &mut NotificationLedger,
    sink: &dyn EventSink,
) -> Vec<UpdateListEntry> {
    let lookups = components.iter().enumerate().map(|(i, component)| {
        let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
        async move {
            sleep(delay).await;
            let community_info = community.version_info(component).await;
            let store_info = match store {
                Some(store) if component.origin == Origin::AppStore => {
                    store.version_info(component).await
                }
                _ => None,
            };
            (component, community_info, store_info)
        }
    });

    let results = join_all(lookups).await;

    let mut update_list = Vec::new();
    for (component, community_info, store_info) in results {
        for update in detect_updates(component, community_info.as_ref(), store_info.as_ref()) {
            update_list.push(update.list_entry(component));

            if ledger.should_suppress(&component.id, update.channel.ledger_key(), &update.new_version)
            {
                debug!(
                    "{} {} on {} already reported",
                    component.id,
                    update.new_version,
                    update.channel.ledger_key()
                );
                continue;
            }

            info!(
                "New update for {}: {} -> {} ({})",
                component.id,
                component.version,
                update.new_version,
                update.channel.ledger_key()
            );
            sink.trigger_update_available(update.event(component)).await;
            if notify {
                sink.register_notification(update.notification_text(component))
                    .await;
            }
        }
    }

    update_list
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub updates: Vec<UpdateListEntry>,
    /// Empty on success, otherwise the message of the error that aborted the run
    pub status: String,
}

/// Runs complete update checks against the configured catalogs
pub struct UpdateResolver<S: SettingsStore> {
    settings: Arc<S>,
    inventory: Arc<dyn Inventory>,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn EventSink>,
    catalogs: CatalogsConfig,
}

impl<S: SettingsStore> UpdateResolver<S> {
    pub fn new(
        settings: Arc<S>,
        inventory: Arc<dyn Inventory>,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn EventSink>,
        catalogs: CatalogsConfig,
    ) -> Self {
        Self {
            settings,
            inventory,
            fetcher,
            sink,
            catalogs,
        }
    }

    pub fn settings(&self) -> &Arc<S> {
        &self.settings
    }

    /// Performs one run. Never fails: a run-level error ends up in the report status.
    pub async fn run_once(&self, notify: bool) -> RunReport {
        let (updates, status) = match self.try_run(notify).await {
            Ok(updates) => {
                info!("Update check finished: {} updates outstanding", updates.len());
                (updates, String::new())
            }
            Err(e) => {
                error!("Update check failed: {}", e);
                (Vec::new(), e.to_string())
            }
        };

        self.sink
            .push_status(StatusUpdate::Status(status.clone()))
            .await;

        RunReport { updates, status }
    }

    async fn try_run(&self, notify: bool) -> Result<Vec<UpdateListEntry>, RunError> {
        let mut ledger = NotificationLedger::from_entries(settings::notified_entries(
            &*self.settings,
        )?);

        self.push_phase(CatalogSource::Community.label()).await;
        let community =
            CommunityCatalog::fetch_or_unavailable(&*self.fetcher, &self.catalogs.community).await;

        self.push_phase("Installed apps").await;
        let components = self.inventory.installed_components().await?;
        info!("Checking {} installed apps", components.len());

        self.push_phase(CatalogSource::AppStore.label()).await;
        let app_store = self
            .catalogs
            .app_store
            .enabled
            .then(|| AppStoreCatalog::new(self.fetcher.clone(), &self.catalogs.app_store.base_url));

        let updates = resolve_updates(
            &components,
            &community,
            app_store.as_ref().map(|c| c as &dyn CatalogClient),
            notify,
            &mut ledger,
            &*self.sink,
        )
        .await;

        settings::publish_run(&*self.settings, &ledger, &updates)?;

        Ok(updates)
    }

    async fn push_phase(&self, label: &str) {
        self.sink
            .push_status(StatusUpdate::Fetching(label.to_string()))
            .await;
    }
}
