// Task model for key-value storage
// Integer id from creation time, list position for ordering, reminder as epoch millis

use serde::{Deserialize, Serialize};
use super::common::Priority;

/// Task record stored under the `tasks` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,  // Stable identifier, unique across active and trashed tasks
    pub text: String,
    #[serde(default = "default_task_color")]
    pub color: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub reminderAt: Option<i64>,
    pub createdAt: i64,
}

pub fn default_task_color() -> String {
    "#5A9".to_string()
}

impl Task {
    pub fn new(id: i64, text: String, createdAt: i64) -> Self {
        Self {
            id,
            text,
            color: default_task_color(),
            priority: Priority::default(),
            completed: false,
            reminderAt: None,
            createdAt,
        }
    }

    /// True when the reminder fires strictly after `now`
    pub fn hasFutureReminder(&self, now: i64) -> bool {
        matches!(self.reminderAt, Some(at) if at > now)
    }
}

/// Task moved to the recycle bin, stored under the `trash` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashedTask {
    #[serde(flatten)]
    pub task: Task,
    pub deletedAt: i64,
}

impl TrashedTask {
    pub fn fromTask(task: Task, deletedAt: i64) -> Self {
        Self { task, deletedAt }
    }

    /// Strip `deletedAt` and hand back the active task
    pub fn intoTask(self) -> Task {
        self.task
    }

    pub fn id(&self) -> i64 {
        self.task.id
    }
}
