// Trash commands - move to trash, restore, erase
// Ids that are not where a transition expects them are ignored, never errors

use crate::AppState;
use crate::error::Result;
use crate::models::{Task, TrashedTask};
use super::common::now;

/// Active -> Trashed. `None` when the task is not active.
pub fn moveToTrash(state: &AppState, id: i64) -> Result<Option<TrashedTask>> {
    let mut board = state.storage.loadBoard()?;
    let Some(trashed) = board.moveToTrash(id, now()) else {
        tracing::debug!("[moveToTrash] Task {} not active, ignoring", id);
        return Ok(None);
    };

    state.storage.saveBoard(&board).inspect_err(|e| {
        tracing::error!("[moveToTrash] ERROR saving store: {}", e);
    })?;
    state.reminders.cancel(id);

    tracing::info!("[moveToTrash] Moved task {} to trash", id);
    Ok(Some(trashed))
}

/// Trashed tasks, most recently deleted first
pub fn listTrash(state: &AppState) -> Result<Vec<TrashedTask>> {
    state.storage.readTrash()
}

#[derive(Debug, serde::Serialize)]
pub struct TrashCounts {
    pub tasks: usize,
}

pub fn getTrashCounts(state: &AppState) -> Result<TrashCounts> {
    Ok(TrashCounts { tasks: state.storage.readTrash()?.len() })
}

/// Trashed -> Active. `None` when the id is not in the trash.
pub fn restoreFromTrash(state: &AppState, id: i64) -> Result<Option<Task>> {
    let mut board = state.storage.loadBoard()?;
    let Some(restored) = board.restoreFromTrash(id) else {
        tracing::debug!("[restoreFromTrash] Task {} not in trash, ignoring", id);
        return Ok(None);
    };

    state.storage.saveBoard(&board)?;
    state.reminders.reschedule(&restored, now());

    tracing::info!("[restoreFromTrash] Restored task {}", id);
    Ok(Some(restored))
}

/// Restore everything in the trash. Returns how many tasks came back.
pub fn restoreAllFromTrash(state: &AppState) -> Result<usize> {
    let mut board = state.storage.loadBoard()?;
    if board.trash.is_empty() {
        return Ok(0);
    }

    let restored = board.restoreAll();
    state.storage.saveBoard(&board)?;
    state.reminders.rescheduleAll(&restored, now());

    tracing::info!("[restoreAllFromTrash] Restored {} task(s)", restored.len());
    Ok(restored.len())
}

/// Trashed -> Erased. Returns whether anything was erased.
pub fn permanentlyDeleteFromTrash(state: &AppState, id: i64) -> Result<bool> {
    let mut board = state.storage.loadBoard()?;
    if board.eraseFromTrash(id).is_none() {
        tracing::debug!("[permanentlyDeleteFromTrash] Task {} not in trash, ignoring", id);
        return Ok(false);
    }

    state.storage.saveTrash(&board)?;
    state.reminders.cancel(id);

    tracing::info!("[permanentlyDeleteFromTrash] Erased task {}", id);
    Ok(true)
}

/// Erase every trashed task. Returns how many were erased.
pub fn emptyTrash(state: &AppState) -> Result<usize> {
    let mut board = state.storage.loadBoard()?;
    if board.trash.is_empty() {
        tracing::debug!("[emptyTrash] Trash already empty");
        return Ok(0);
    }

    let erased = board.emptyTrash();
    state.storage.saveTrash(&board)?;
    for item in &erased {
        state.reminders.cancel(item.id());
    }

    tracing::info!("[emptyTrash] Erased {} task(s)", erased.len());
    Ok(erased.len())
}
