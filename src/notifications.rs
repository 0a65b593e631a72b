// Reminder notifications
// Delivery is behind the Notifier trait; the daemon logs them

use crate::error::Result;
use crate::models::Task;

const MESSAGE_LIMIT: usize = 120;
const MESSAGE_KEEP: usize = 117;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub priority: u8,
}

/// Notification collaborator
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Task text for a notification body: texts over 120 characters keep their
/// first 117 characters plus "..."
pub fn reminderMessage(text: &str) -> String {
    if text.chars().count() > MESSAGE_LIMIT {
        let kept: String = text.chars().take(MESSAGE_KEEP).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

pub fn reminderNotification(task: &Task, title: &str, firedAt: i64) -> Notification {
    Notification {
        id: format!("rem-{}-{}", task.id, firedAt),
        title: title.to_string(),
        message: reminderMessage(&task.text),
        priority: 2,
    }
}

/// Writes notifications to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            id = %notification.id,
            "[notify] {}: {}",
            notification.title,
            notification.message
        );
        Ok(())
    }
}
