//! Typed access to the host settings used by the checker

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::{DEFAULT_UPDATE_HOUR, DEFAULT_UPDATE_MINUTE};
use crate::version::error::StoreError;
use crate::version::ledger::NotificationLedger;
use crate::version::store::SettingsStore;
use crate::version::types::{NotifiedEntry, ScheduleConfig, UpdateListEntry};

pub const AUTO_NOTIFY: &str = "autoNotify";
pub const AUTO_UPDATE: &str = "autoUpdate";
pub const UPDATE_HOUR: &str = "updateHr";
pub const UPDATE_MINUTE: &str = "updateMin";
pub const UPDATE_LIST: &str = "updateList";
pub const NOTIFIED_LIST: &str = "notifiedList";

fn read<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: SettingsStore + ?Sized,
{
    match store.get(key)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

pub fn auto_notify<S: SettingsStore + ?Sized>(store: &S) -> Result<bool, StoreError> {
    Ok(read(store, AUTO_NOTIFY)?.unwrap_or(false))
}

pub fn auto_update<S: SettingsStore + ?Sized>(store: &S) -> Result<bool, StoreError> {
    Ok(read(store, AUTO_UPDATE)?.unwrap_or(false))
}

/// Current daily check time; missing values fall back to the defaults
pub fn schedule<S: SettingsStore + ?Sized>(store: &S) -> Result<ScheduleConfig, StoreError> {
    let hour = read(store, UPDATE_HOUR)?.unwrap_or(DEFAULT_UPDATE_HOUR);
    let minute = read(store, UPDATE_MINUTE)?.unwrap_or(DEFAULT_UPDATE_MINUTE);
    Ok(ScheduleConfig::new(hour, minute))
}

/// Writes the default check time for any part that was never configured
pub fn ensure_schedule_defaults<S: SettingsStore + ?Sized>(
    store: &S,
) -> Result<ScheduleConfig, StoreError> {
    if read::<u32, _>(store, UPDATE_HOUR)?.is_none() {
        store.set(UPDATE_HOUR, json!(DEFAULT_UPDATE_HOUR))?;
    }
    if read::<u32, _>(store, UPDATE_MINUTE)?.is_none() {
        store.set(UPDATE_MINUTE, json!(DEFAULT_UPDATE_MINUTE))?;
    }
    schedule(store)
}

pub fn notified_entries<S: SettingsStore + ?Sized>(
    store: &S,
) -> Result<Vec<NotifiedEntry>, StoreError> {
    Ok(read(store, NOTIFIED_LIST)?.unwrap_or_default())
}

pub fn update_list<S: SettingsStore + ?Sized>(
    store: &S,
) -> Result<Vec<UpdateListEntry>, StoreError> {
    Ok(read(store, UPDATE_LIST)?.unwrap_or_default())
}

/// Replaces the stored ledger and update list in one write
pub fn publish_run<S: SettingsStore + ?Sized>(
    store: &S,
    ledger: &NotificationLedger,
    updates: &[UpdateListEntry],
) -> Result<(), StoreError> {
    store.set_many(vec![
        (
            NOTIFIED_LIST.to_string(),
            serde_json::to_value(ledger.entries())?,
        ),
        (UPDATE_LIST.to_string(), serde_json::to_value(updates)?),
    ])
}
