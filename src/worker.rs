// Background reminder worker
// Fires due timers and re-syncs the timer table whenever the `tasks` key changes

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::alarms::LocalAlarms;
use crate::commands::common::now;
use crate::error::Result;
use crate::notifications::Notifier;
use crate::reminders::ReminderScheduler;
use crate::storage::StorageState;
use crate::store::{StorageChange, TASKS_KEY};

pub struct ReminderWorker {
    storage: StorageState,
    alarms: Arc<LocalAlarms>,
    reminders: ReminderScheduler,
    notifier: Arc<dyn Notifier>,
    tickInterval: Duration,
}

impl ReminderWorker {
    pub fn new(state: &AppState) -> Self {
        let tickSecs = state.storage.currentSettings().tickIntervalSecs.max(1);
        Self {
            storage: state.storage.clone(),
            alarms: state.alarms.clone(),
            reminders: state.reminders.clone(),
            notifier: state.notifier.clone(),
            tickInterval: Duration::from_secs(tickSecs),
        }
    }

    pub fn withTickInterval(mut self, tickInterval: Duration) -> Self {
        self.tickInterval = tickInterval;
        self
    }

    /// Rebuild timers from the persisted list: drop strays, then reschedule
    /// every active task. Returns the number of live timers.
    pub fn syncOnStart(&self) -> Result<usize> {
        self.syncFromStore()?;
        Ok(self.alarms.len())
    }

    /// Sync the timer table against a fresh read of `tasks`.
    /// Returns the cancelled task ids.
    pub fn syncFromStore(&self) -> Result<Vec<i64>> {
        let tasks = self.storage.readTasks()?;
        Ok(self.reminders.sync(&tasks, now()))
    }

    /// Fire every timer due at `at`. Returns the number of notifications sent.
    pub fn fireDue(&self, at: i64) -> usize {
        let mut sent = 0;
        for alarm in self.alarms.takeDue(at) {
            match self.reminders.handleAlarm(&alarm.name, &self.storage, self.notifier.as_ref(), at) {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => error!("[fireDue] {} failed: {}", alarm.name, e),
            }
        }
        sent
    }

    /// Re-sync after a `tasks` change. Other keys are ignored.
    /// The event payload may already be stale when it is handled, so the
    /// store is re-read instead. Returns the cancelled task ids.
    pub fn onStorageChange(&self, change: &StorageChange) -> Vec<i64> {
        if change.key != TASKS_KEY {
            return Vec::new();
        }

        self.syncFromStore().unwrap_or_else(|e| {
            warn!("[onStorageChange] Failed to read tasks, skipping sync: {}", e);
            Vec::new()
        })
    }

    /// Start the worker loop. Runs until `cancel` fires.
    pub fn run(self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        // Subscribe before spawning so no write between here and the first poll is missed
        let mut changes = self.storage.store().subscribe();

        tokio::spawn(async move {
            match self.syncOnStart() {
                Ok(count) => info!("reminder worker started with {} timer(s)", count),
                Err(e) => error!("reminder worker could not read tasks on start: {}", e),
            }

            let mut interval = tokio::time::interval(self.tickInterval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("reminder worker cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        self.fireDue(now());
                    }
                    change = changes.recv() => match change {
                        Ok(change) => {
                            self.onStorageChange(&change);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("reminder worker missed {} store change(s), rescanning", skipped);
                            if let Err(e) = self.syncFromStore() {
                                error!("[run] Rescan failed: {}", e);
                            }
                        }
                        Err(RecvError::Closed) => {
                            debug!("store change channel closed, stopping");
                            break;
                        }
                    },
                }
            }

            info!("reminder worker stopped");
        })
    }
}
