// Task commands - create, edit, complete, prioritise, reorder, query
// Each mutation: fresh read -> mutate -> persist -> reschedule

use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{RemindoError, Result};
use crate::models::{Priority, Task, TaskFilter};
use super::common::{now, parseReminderInput};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskInput {
    pub text: String,
    pub color: Option<String>,
    pub priority: Option<String>,
    pub reminder: Option<String>,
}

#[tracing::instrument(skip_all)]
pub fn createTask(state: &AppState, input: CreateTaskInput) -> Result<Task> {
    let text = input.text.trim().to_string();
    if text.is_empty() {
        return Err(RemindoError::InvalidInput("Please enter a task.".to_string()));
    }

    let reminderAt = match input.reminder.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => Some(parseReminderInput(r)?),
        _ => None,
    };

    let settings = state.storage.currentSettings();
    let mut board = state.storage.loadBoard()?;
    let createdAt = now();

    let id = board.nextId(createdAt)
        .ok_or_else(|| RemindoError::InvalidInput("No task ids left.".to_string()))?;
    let mut task = Task::new(id, text, createdAt);
    task.color = input.color
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(settings.defaultColor);
    task.priority = input.priority
        .and_then(|p| Priority::fromInput(&p))
        .unwrap_or(settings.defaultPriority);
    task.reminderAt = reminderAt;

    board.addTask(task.clone());
    state.storage.saveTasks(&board)?;
    state.reminders.reschedule(&task, now());

    tracing::info!("[createTask] Created task {}", task.id);
    Ok(task)
}

/// What an edit does to the reminder
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "lowercase")]
pub enum ReminderEdit {
    #[default]
    Keep,
    Clear,
    Set(String),
}

/// Edit request; the result is the updated task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditTaskInput {
    pub id: i64,
    pub text: Option<String>,
    pub color: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub reminder: ReminderEdit,
}

/// Apply an edit. Blank text and unknown priorities leave those fields alone;
/// an unparseable reminder rejects the whole edit. `None` when the task is gone.
#[tracing::instrument(skip(state, input), fields(id = input.id))]
pub fn updateTask(state: &AppState, input: EditTaskInput) -> Result<Option<Task>> {
    // Validate before touching the store so a bad date changes nothing
    let reminderAt = match &input.reminder {
        ReminderEdit::Keep => None,
        ReminderEdit::Clear => Some(None),
        ReminderEdit::Set(value) if value.trim().is_empty() => Some(None),
        ReminderEdit::Set(value) => Some(Some(parseReminderInput(value)?)),
    };

    let mut board = state.storage.loadBoard()?;
    let Some(task) = board.findTaskMut(input.id) else {
        tracing::debug!("[updateTask] Task {} not active, ignoring", input.id);
        return Ok(None);
    };

    if let Some(text) = input.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        task.text = text.to_string();
    }
    if let Some(color) = input.color.filter(|c| !c.trim().is_empty()) {
        task.color = color;
    }
    if let Some(priority) = input.priority.as_deref().and_then(Priority::fromInput) {
        task.priority = priority;
    }
    let reminderChanged = reminderAt.is_some();
    if let Some(reminderAt) = reminderAt {
        task.reminderAt = reminderAt;
    }
    let updated = task.clone();

    state.storage.saveTasks(&board)?;
    if reminderChanged {
        state.reminders.reschedule(&updated, now());
    }

    tracing::info!("[updateTask] Updated task {}", updated.id);
    Ok(Some(updated))
}

/// Quick action: set a reminder from user input
pub fn setReminder(state: &AppState, id: i64, input: &str) -> Result<Option<Task>> {
    if input.trim().is_empty() {
        return Err(RemindoError::InvalidDate(String::new()));
    }
    updateTask(state, EditTaskInput {
        id,
        reminder: ReminderEdit::Set(input.to_string()),
        ..Default::default()
    })
}

/// Quick action: drop the reminder and its timer
pub fn clearReminder(state: &AppState, id: i64) -> Result<Option<Task>> {
    updateTask(state, EditTaskInput {
        id,
        reminder: ReminderEdit::Clear,
        ..Default::default()
    })
}

pub fn toggleTask(state: &AppState, id: i64) -> Result<Option<Task>> {
    let mut board = state.storage.loadBoard()?;
    let Some(task) = board.findTaskMut(id) else {
        return Ok(None);
    };
    task.completed = !task.completed;
    let updated = task.clone();

    state.storage.saveTasks(&board)?;
    Ok(Some(updated))
}

/// low -> medium -> high -> low
pub fn cyclePriority(state: &AppState, id: i64) -> Result<Option<Task>> {
    let mut board = state.storage.loadBoard()?;
    let Some(task) = board.findTaskMut(id) else {
        return Ok(None);
    };
    task.priority = task.priority.next();
    let updated = task.clone();

    state.storage.saveTasks(&board)?;
    Ok(Some(updated))
}

/// Move a task to `newIndex` in the active list
pub fn moveTask(state: &AppState, id: i64, newIndex: usize) -> Result<bool> {
    let mut board = state.storage.loadBoard()?;
    if !board.moveTask(id, newIndex) {
        return Ok(false);
    }
    state.storage.saveTasks(&board)?;
    Ok(true)
}

/// Drop one task onto another (drag and drop)
pub fn moveTaskOnto(state: &AppState, draggedId: i64, targetId: i64) -> Result<bool> {
    let mut board = state.storage.loadBoard()?;
    if !board.moveTaskOnto(draggedId, targetId) {
        return Ok(false);
    }
    state.storage.saveTasks(&board)?;
    tracing::debug!("[moveTaskOnto] Moved {} onto {}", draggedId, targetId);
    Ok(true)
}

/// Active tasks matching a filter and a case-insensitive text query, in list order
pub fn getTasks(state: &AppState, filter: TaskFilter, query: &str) -> Result<Vec<Task>> {
    let q = query.trim().to_lowercase();
    let tasks = state.storage.readTasks()?;
    Ok(tasks
        .into_iter()
        .filter(|t| filter.matches(t.completed))
        .filter(|t| q.is_empty() || t.text.to_lowercase().contains(&q))
        .collect())
}

pub fn getTaskById(state: &AppState, id: i64) -> Result<Option<Task>> {
    Ok(state.storage.readTasks()?.into_iter().find(|t| t.id == id))
}

/// Why a filtered view came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyState {
    NoTasks,
    NoMatches,
    NoCompleted,
    NoPending,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoTasks => "No saved tasks. Add a new task to get started!",
            Self::NoMatches => "No tasks match your search. Try a different query.",
            Self::NoCompleted => "No completed tasks. Complete some tasks to see them here.",
            Self::NoPending => "No pending tasks.",
        }
    }
}

/// `None` when the filtered view has something to show
pub fn emptyState(totalTasks: usize, visibleTasks: usize, filter: TaskFilter, query: &str) -> Option<EmptyState> {
    if visibleTasks > 0 {
        return None;
    }
    if totalTasks == 0 {
        return Some(EmptyState::NoTasks);
    }
    if !query.trim().is_empty() {
        return Some(EmptyState::NoMatches);
    }
    match filter {
        TaskFilter::Completed => Some(EmptyState::NoCompleted),
        TaskFilter::Pending => Some(EmptyState::NoPending),
        TaskFilter::All => Some(EmptyState::NoTasks),
    }
}
