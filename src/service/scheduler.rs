//! Daily re-check scheduler
//!
//! Owns the single in-flight flag and the one pending timer. A check that
//! arrives while another is running is dropped, not queued. Every check that
//! actually runs re-arms the timer for the next configured wall-clock time,
//! until [`Scheduler::shutdown`] is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::INITIAL_CHECK_DELAY_MS;
use crate::service::resolver::{RunReport, UpdateResolver};
use crate::version::error::StoreError;
use crate::version::settings;
use crate::version::store::SettingsStore;
use crate::version::types::ScheduleConfig;

/// Next time the daily check should fire
///
/// Today at the configured time if that minute has not started yet,
/// otherwise tomorrow at the same time.
pub fn next_fire_time(now: NaiveDateTime, schedule: ScheduleConfig) -> NaiveDateTime {
    let still_today = now.hour() < schedule.hour
        || (now.hour() == schedule.hour && now.minute() < schedule.minute);

    let date = if still_today {
        now.date()
    } else {
        now.date().succ_opt().unwrap_or(now.date())
    };

    date.and_time(schedule.time())
}

/// Real time to wait from `now` until [`next_fire_time`]
///
/// The target is resolved in the time zone of `now`, so a DST change before
/// the target shortens or lengthens the wait. An ambiguous target fires at
/// its first occurrence; a target inside a DST gap fires an hour later.
pub fn delay_until_next<Tz: TimeZone>(now: &DateTime<Tz>, schedule: ScheduleConfig) -> Duration {
    let local = now.naive_local();
    let next = next_fire_time(local, schedule);
    let tz = now.timezone();

    let wait = match tz
        .from_local_datetime(&next)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(next + TimeDelta::hours(1))).earliest())
    {
        Some(target) => target.signed_duration_since(now),
        None => next - local,
    };
    wait.to_std().unwrap_or_default()
}

/// Holds the in-flight flag for the duration of a run
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Scheduler<S: SettingsStore> {
    resolver: UpdateResolver<S>,
    checking: AtomicBool,
    /// Set by `shutdown`; no timer is armed while it holds
    stopped: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
    last_report: Mutex<Option<RunReport>>,
}

impl<S: SettingsStore> Scheduler<S> {
    pub fn new(resolver: UpdateResolver<S>) -> Arc<Self> {
        Arc::new(Self {
            resolver,
            checking: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            timer: Mutex::new(None),
            last_report: Mutex::new(None),
        })
    }

    /// Writes the default check time if needed and arms the first check
    pub fn start(self: &Arc<Self>) -> Result<(), StoreError> {
        let schedule = settings::ensure_schedule_defaults(&**self.resolver.settings())?;
        self.stopped.store(false, Ordering::Release);
        info!(
            "Scheduler started, daily check at {:02}:{:02}",
            schedule.hour, schedule.minute
        );
        self.arm(Duration::from_millis(INITIAL_CHECK_DELAY_MS));
        Ok(())
    }

    /// Runs a check now unless one is already running.
    ///
    /// Returns whether a check actually ran. `update` is accepted for the
    /// host contract but never acts: nothing is ever installed.
    pub async fn check_now(self: &Arc<Self>, notify: bool, update: bool) -> bool {
        let Some(guard) = RunGuard::acquire(&self.checking) else {
            info!("Update check already running, skipping");
            return false;
        };

        debug!("Starting update check (notify: {}, update: {})", notify, update);
        let report = self.resolver.run_once(notify).await;
        *lock(&self.last_report) = Some(report);
        drop(guard);

        self.schedule_next();
        true
    }

    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    pub fn has_pending_timer(&self) -> bool {
        lock(&self.timer)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Report of the most recent completed check
    pub fn last_report(&self) -> Option<RunReport> {
        lock(&self.last_report).clone()
    }

    /// Cancels the pending timer and stops re-arming.
    ///
    /// A check already running is left to finish but does not schedule
    /// another one. [`Scheduler::start`] resumes scheduling.
    pub fn shutdown(&self) {
        let mut timer = lock(&self.timer);
        self.stopped.store(true, Ordering::Release);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        info!("Scheduler stopped");
    }

    fn schedule_next(self: &Arc<Self>) {
        let schedule = settings::schedule(&**self.resolver.settings()).unwrap_or_else(|e| {
            warn!("Failed to read schedule, using default: {}", e);
            ScheduleConfig::default()
        });

        let now = Local::now();
        let delay = delay_until_next(&now, schedule);
        if self.arm(delay) {
            info!(
                "Next update check at {}",
                next_fire_time(now.naive_local(), schedule).format("%Y-%m-%d %H:%M")
            );
        }
    }

    /// Replaces the pending timer with one firing after `delay`.
    ///
    /// Returns false without arming once the scheduler is stopped.
    fn arm(self: &Arc<Self>, delay: Duration) -> bool {
        let mut timer = lock(&self.timer);
        if self.stopped.load(Ordering::Acquire) {
            debug!("Scheduler stopped, not arming timer");
            return false;
        }

        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            // Run detached so re-arming from the check never aborts this task mid-run
            tokio::spawn(async move {
                scheduler.scheduled_check().await;
            });
        });

        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
        true
    }

    async fn scheduled_check(self: Arc<Self>) {
        let store = self.resolver.settings();
        let notify = settings::auto_notify(&**store).unwrap_or_else(|e| {
            warn!("Failed to read autoNotify: {}", e);
            false
        });
        let update = settings::auto_update(&**store).unwrap_or(false);

        if !self.check_now(notify, update).await {
            // The running check re-arms the timer when it finishes
            debug!("Scheduled check skipped");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
