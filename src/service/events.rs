//! Events delivered to the host

#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use tracing::info;

/// Payload of the "update available" trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvailableEvent {
    pub component_name: String,
    pub store_label: String,
    pub old_version: String,
    pub new_version: String,
}

/// Real-time status pushed while a run progresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusUpdate {
    /// `{"fetching": label}` while a phase is running
    Fetching(String),
    /// `{"status": message}` when the run ends; empty on success
    Status(String),
}

/// Trait for delivering events to the host
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn trigger_update_available(&self, event: UpdateAvailableEvent);

    async fn register_notification(&self, excerpt: String);

    async fn push_status(&self, status: StatusUpdate);
}

/// [`EventSink`] writing one JSON document per line to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn emit(kind: &str, payload: serde_json::Value) {
        println!("{}", serde_json::json!({ "event": kind, "data": payload }));
    }
}

#[async_trait::async_trait]
impl EventSink for ConsoleSink {
    async fn trigger_update_available(&self, event: UpdateAvailableEvent) {
        info!(
            "Update available for {} on {}: {} -> {}",
            event.component_name, event.store_label, event.old_version, event.new_version
        );
        Self::emit(
            "updateAvailable",
            serde_json::to_value(&event).unwrap_or_default(),
        );
    }

    async fn register_notification(&self, excerpt: String) {
        Self::emit("notification", serde_json::json!({ "excerpt": excerpt }));
    }

    async fn push_status(&self, status: StatusUpdate) {
        Self::emit("status", serde_json::to_value(&status).unwrap_or_default());
    }
}
