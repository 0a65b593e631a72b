// Allow non-snake_case names for JSON serialization compatibility with the stored task format
#![allow(non_snake_case)]

pub mod alarms;
pub mod board;
pub mod commands;
pub mod error;
pub mod models;
pub mod notifications;
pub mod reminders;
pub mod storage;
pub mod store;
pub mod worker;

#[cfg(test)]
mod testutil;

use parking_lot::RwLock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::alarms::LocalAlarms;
use crate::error::{RemindoError, Result};
use crate::notifications::{LogNotifier, Notifier};
use crate::reminders::ReminderScheduler;
use crate::storage::StorageState;
use crate::worker::ReminderWorker;

/// Everything a command needs: storage, the timer table and the notifier
#[derive(Clone)]
pub struct AppState {
    pub storage: StorageState,
    pub alarms: Arc<LocalAlarms>,
    pub reminders: ReminderScheduler,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(storage: StorageState, alarms: Arc<LocalAlarms>, notifier: Arc<dyn Notifier>) -> Self {
        let reminders = ReminderScheduler::new(alarms.clone());
        Self {
            storage,
            alarms,
            reminders,
            notifier,
        }
    }
}

// Reminder worker state
pub struct WorkerManager {
    is_running: Arc<RwLock<bool>>,
    cancel_token: Arc<RwLock<Option<CancellationToken>>>,
    handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self {
            is_running: Arc::new(RwLock::new(false)),
            cancel_token: Arc::new(RwLock::new(None)),
            handle: RwLock::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }

    /// Spawn the reminder worker. Must be called inside a tokio runtime.
    pub fn start(&self, state: &AppState) -> Result<()> {
        if *self.is_running.read() {
            return Err(RemindoError::Worker("Reminder worker is already running".to_string()));
        }

        let ct = CancellationToken::new();
        *self.cancel_token.write() = Some(ct.clone());
        *self.is_running.write() = true;

        let worker = ReminderWorker::new(state).run(ct);
        let is_running = self.is_running.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = worker.await {
                tracing::error!("[WorkerManager] Worker task failed: {}", e);
            }
            *is_running.write() = false;
        });
        *self.handle.write() = Some(handle);

        tracing::info!("[WorkerManager] Worker started");
        Ok(())
    }

    /// Cancel the worker and wait for it to finish
    pub async fn stop(&self) {
        tracing::info!("[WorkerManager] Stopping worker...");
        if let Some(ct) = self.cancel_token.write().take() {
            ct.cancel();
        }
        let handle = self.handle.write().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        *self.is_running.write() = false;
    }
}

impl Default for WorkerManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the fmt subscriber; RUST_LOG overrides the default filter
pub fn initTracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("remindo=info,remindo_lib=info")),
        )
        .try_init();
}

/// Daemon entry point: open the store, run the reminder worker until Ctrl-C
pub fn run() -> Result<()> {
    initTracing();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (storage, fileStore) = storage::initStorage()?;
        let _watcher = fileStore.watch()?;

        let state = AppState::new(storage, Arc::new(LocalAlarms::new()), Arc::new(LogNotifier));
        let manager = WorkerManager::new();
        manager.start(&state)?;

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down");
        manager.stop().await;
        Ok::<(), RemindoError>(())
    })
}
