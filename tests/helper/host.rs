//! Host-side test doubles: settings, inventory and event sink

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use app_update_checker::service::events::{EventSink, StatusUpdate, UpdateAvailableEvent};
use app_update_checker::version::error::InventoryError;
use app_update_checker::version::inventory::Inventory;
use app_update_checker::version::store::SqliteSettings;
use app_update_checker::version::types::{InstalledComponent, Origin};

/// Create a settings store backed by a temporary database
pub fn create_test_settings() -> (TempDir, Arc<SqliteSettings>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("settings.db");
    let settings = SqliteSettings::new(&db_path).unwrap();
    (temp_dir, Arc::new(settings))
}

pub fn component(id: &str, name: &str, version: &str, origin: Origin) -> InstalledComponent {
    InstalledComponent {
        id: id.to_string(),
        name: name.to_string(),
        version: version.to_string(),
        origin,
    }
}

/// Inventory returning a fixed list, optionally after a delay
pub struct StaticInventory {
    components: Vec<InstalledComponent>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticInventory {
    pub fn new(components: Vec<InstalledComponent>) -> Self {
        Self {
            components,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Inventory for StaticInventory {
    async fn installed_components(&self) -> Result<Vec<InstalledComponent>, InventoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.components.clone())
    }
}

/// Inventory that always fails
#[allow(dead_code)]
pub struct BrokenInventory;

#[async_trait]
impl Inventory for BrokenInventory {
    async fn installed_components(&self) -> Result<Vec<InstalledComponent>, InventoryError> {
        Err(InventoryError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "installed.json missing",
        )))
    }
}

/// Event sink recording everything it receives
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<UpdateAvailableEvent>>,
    notifications: Mutex<Vec<String>>,
    statuses: Mutex<Vec<StatusUpdate>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<UpdateAvailableEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<StatusUpdate> {
        self.statuses.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn trigger_update_available(&self, event: UpdateAvailableEvent) {
        self.events.lock().unwrap().push(event);
    }

    async fn register_notification(&self, excerpt: String) {
        self.notifications.lock().unwrap().push(excerpt);
    }

    async fn push_status(&self, status: StatusUpdate) {
        self.statuses.lock().unwrap().push(status);
    }
}
