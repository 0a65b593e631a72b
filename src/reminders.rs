// Reminder scheduler
// Keeps exactly one timer per active task with a future reminder, and none otherwise

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::alarms::{AlarmHost, alarmName, parseAlarmName};
use crate::error::Result;
use crate::models::{Settings, Task};
use crate::notifications::{Notifier, reminderNotification};
use crate::storage::Storage;

#[derive(Clone)]
pub struct ReminderScheduler {
    alarms: Arc<dyn AlarmHost>,
}

impl ReminderScheduler {
    pub fn new(alarms: Arc<dyn AlarmHost>) -> Self {
        Self { alarms }
    }

    /// Bring the timer for `task` in line with its reminder. Safe to repeat.
    pub fn reschedule(&self, task: &Task, now: i64) {
        let name = alarmName(task.id);
        self.alarms.clear(&name);

        if let Some(when) = task.reminderAt.filter(|_| task.hasFutureReminder(now)) {
            self.alarms.create(&name, when);
            tracing::debug!("[reschedule] {} fires at {}", name, when);
        }
    }

    /// Remove any timer for `id`
    pub fn cancel(&self, id: i64) {
        if self.alarms.clear(&alarmName(id)) {
            tracing::debug!("[cancel] Cleared reminder for task {}", id);
        }
    }

    pub fn rescheduleAll(&self, tasks: &[Task], now: i64) {
        for task in tasks {
            self.reschedule(task, now);
        }
    }

    /// Cancel every reminder timer that has no active task with a future
    /// reminder behind it. Never creates timers. Returns the cancelled ids.
    pub fn reconcile(&self, tasks: &[Task], now: i64) -> Vec<i64> {
        let wanted: HashSet<i64> = tasks
            .iter()
            .filter(|t| t.hasFutureReminder(now))
            .map(|t| t.id)
            .collect();

        let mut cancelled = Vec::new();
        for alarm in self.alarms.getAll() {
            let Some(id) = parseAlarmName(&alarm.name) else {
                continue;
            };
            if !wanted.contains(&id) && self.alarms.clear(&alarm.name) {
                cancelled.push(id);
            }
        }

        if !cancelled.is_empty() {
            tracing::info!("[reconcile] Cancelled {} orphaned reminder(s): {:?}", cancelled.len(), cancelled);
        }
        cancelled
    }

    /// Bring the whole timer table in line with `tasks`: cancel strays, then
    /// create or move timers for tasks whose reminder has none or a stale one.
    /// Returns the cancelled ids.
    pub fn sync(&self, tasks: &[Task], now: i64) -> Vec<i64> {
        let cancelled = self.reconcile(tasks, now);

        let scheduled: HashMap<String, i64> = self.alarms.getAll()
            .into_iter()
            .map(|a| (a.name, a.scheduledTime))
            .collect();
        for task in tasks.iter().filter(|t| t.hasFutureReminder(now)) {
            if scheduled.get(&alarmName(task.id)).copied() != task.reminderAt {
                self.reschedule(task, now);
            }
        }
        cancelled
    }

    /// Handle a fired timer: re-read the store, find the active task, notify.
    /// Foreign names and tasks that are gone are dropped without error.
    /// Returns whether a notification was sent.
    pub fn handleAlarm(
        &self,
        name: &str,
        storage: &Storage,
        notifier: &dyn Notifier,
        now: i64,
    ) -> Result<bool> {
        let Some(id) = parseAlarmName(name) else {
            tracing::debug!("[handleAlarm] Ignoring timer '{}'", name);
            return Ok(false);
        };

        let tasks = storage.readTasks()?;
        let Some(task) = tasks.iter().find(|t| t.id == id) else {
            tracing::debug!("[handleAlarm] Task {} no longer active, dropping", id);
            return Ok(false);
        };

        let settings: Settings = storage.currentSettings();
        if !settings.notificationsEnabled {
            tracing::debug!("[handleAlarm] Notifications disabled, skipping task {}", id);
            return Ok(false);
        }

        let notification = reminderNotification(task, &settings.notificationTitle, now);
        notifier.notify(&notification)?;
        tracing::info!("[handleAlarm] Reminder sent for task {}", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::LocalAlarms;
    use crate::board::TaskBoard;
    use crate::error::RemindoError;
    use crate::notifications::Notification;
    use crate::store::MemoryStore;
    use parking_lot::Mutex;
    use std::path::PathBuf;

    const NOW: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) -> Result<()> {
            self.sent.lock().push(notification.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _: &Notification) -> Result<()> {
            Err(RemindoError::Notify("no display".to_string()))
        }
    }

    fn setup() -> (Arc<LocalAlarms>, ReminderScheduler) {
        let alarms = Arc::new(LocalAlarms::new());
        let scheduler = ReminderScheduler::new(alarms.clone());
        (alarms, scheduler)
    }

    fn task(id: i64, reminderAt: Option<i64>) -> Task {
        let mut t = Task::new(id, format!("task {}", id), NOW - 1000);
        t.reminderAt = reminderAt;
        t
    }

    fn storageWith(tasks: Vec<Task>) -> Storage {
        let storage = Storage::new(
            PathBuf::from("config.md"),
            Settings::default(),
            Arc::new(MemoryStore::new()),
        );
        storage.saveTasks(&TaskBoard::new(tasks, Vec::new())).unwrap();
        storage
    }

    #[test]
    fn test_future_reminder_creates_one_timer() {
        let (alarms, scheduler) = setup();
        scheduler.reschedule(&task(1, Some(NOW + 60_000)), NOW);

        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms.get("reminder-1").unwrap().scheduledTime, NOW + 60_000);
    }

    #[test]
    fn test_reschedule_is_idempotent() {
        let (alarms, scheduler) = setup();
        let t = task(1, Some(NOW + 60_000));
        scheduler.reschedule(&t, NOW);
        scheduler.reschedule(&t, NOW);

        assert_eq!(alarms.getAll().len(), 1);
        assert_eq!(alarms.get("reminder-1").unwrap().scheduledTime, NOW + 60_000);
    }

    #[test]
    fn test_past_or_now_reminder_creates_no_timer() {
        let (alarms, scheduler) = setup();
        scheduler.reschedule(&task(1, Some(NOW - 10_000)), NOW);
        scheduler.reschedule(&task(2, Some(NOW)), NOW);
        scheduler.reschedule(&task(3, None), NOW);
        assert!(alarms.is_empty());
    }

    #[test]
    fn test_clearing_reminder_removes_timer() {
        let (alarms, scheduler) = setup();
        let mut t = task(1, Some(NOW + 60_000));
        scheduler.reschedule(&t, NOW);

        t.reminderAt = None;
        scheduler.reschedule(&t, NOW);
        assert!(alarms.is_empty());
    }

    #[test]
    fn test_cancel_without_timer_is_noop() {
        let (alarms, scheduler) = setup();
        scheduler.cancel(99);
        assert!(alarms.is_empty());
    }

    #[test]
    fn test_reconcile_cancels_stray_timer_only() {
        let (alarms, scheduler) = setup();
        let a = task(1, Some(NOW + 60_000));
        scheduler.reschedule(&a, NOW);
        alarms.create("reminder-26", NOW + 5_000);
        alarms.create("daily-backup", NOW + 5_000);

        let cancelled = scheduler.reconcile(&[a], NOW);

        assert_eq!(cancelled, vec![26]);
        assert_eq!(alarms.get("reminder-1").unwrap().scheduledTime, NOW + 60_000);
        assert!(alarms.get("reminder-26").is_none());
        assert!(alarms.get("daily-backup").is_some());
    }

    #[test]
    fn test_reconcile_cancels_timer_for_task_without_future_reminder() {
        let (alarms, scheduler) = setup();
        alarms.create("reminder-1", NOW + 1_000);
        alarms.create("reminder-2", NOW + 1_000);

        let cancelled = scheduler.reconcile(&[task(1, None), task(2, Some(NOW - 1))], NOW);
        let mut cancelled = cancelled;
        cancelled.sort();
        assert_eq!(cancelled, vec![1, 2]);
        assert!(alarms.is_empty());
    }

    #[test]
    fn test_reconcile_does_not_create_timers() {
        let (alarms, scheduler) = setup();
        scheduler.reconcile(&[task(1, Some(NOW + 60_000))], NOW);
        assert!(alarms.is_empty());
    }

    #[test]
    fn test_sync_creates_missing_and_moves_stale_timers() {
        let (alarms, scheduler) = setup();
        alarms.create("reminder-1", NOW + 1_000);
        alarms.create("reminder-9", NOW + 1_000);

        let tasks = [task(1, Some(NOW + 60_000)), task(2, Some(NOW + 30_000)), task(3, Some(NOW - 1))];
        let cancelled = scheduler.sync(&tasks, NOW);

        assert_eq!(cancelled, vec![9]);
        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms.get("reminder-1").unwrap().scheduledTime, NOW + 60_000);
        assert_eq!(alarms.get("reminder-2").unwrap().scheduledTime, NOW + 30_000);
    }

    #[test]
    fn test_handle_alarm_notifies_for_active_task() {
        let (_, scheduler) = setup();
        let mut t = task(5, Some(NOW));
        t.text = "x".repeat(200);
        let storage = storageWith(vec![t]);
        let notifier = RecordingNotifier::default();

        assert!(scheduler.handleAlarm("reminder-5", &storage, &notifier, NOW).unwrap());

        let sent = notifier.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Task reminder");
        assert_eq!(sent[0].message, format!("{}...", "x".repeat(117)));
    }

    #[test]
    fn test_handle_alarm_drops_missing_task_and_foreign_names() {
        let (_, scheduler) = setup();
        let storage = storageWith(vec![task(5, None)]);
        let notifier = RecordingNotifier::default();

        assert!(!scheduler.handleAlarm("reminder-6", &storage, &notifier, NOW).unwrap());
        assert!(!scheduler.handleAlarm("reminder-abc", &storage, &notifier, NOW).unwrap());
        assert!(!scheduler.handleAlarm("something-else", &storage, &notifier, NOW).unwrap());
        assert!(notifier.sent.lock().is_empty());
    }

    #[test]
    fn test_handle_alarm_ignores_trashed_task() {
        let (_, scheduler) = setup();
        let storage = storageWith(vec![task(5, Some(NOW))]);
        let mut board = storage.loadBoard().unwrap();
        board.moveToTrash(5, NOW);
        storage.saveBoard(&board).unwrap();

        let notifier = RecordingNotifier::default();
        assert!(!scheduler.handleAlarm("reminder-5", &storage, &notifier, NOW).unwrap());
    }

    #[test]
    fn test_handle_alarm_respects_disabled_notifications() {
        let (_, scheduler) = setup();
        let storage = storageWith(vec![task(5, Some(NOW))]);
        storage.settings.write().notificationsEnabled = false;

        let notifier = RecordingNotifier::default();
        assert!(!scheduler.handleAlarm("reminder-5", &storage, &notifier, NOW).unwrap());
        assert!(notifier.sent.lock().is_empty());
    }

    #[test]
    fn test_handle_alarm_surfaces_delivery_failure() {
        let (_, scheduler) = setup();
        let storage = storageWith(vec![task(5, Some(NOW))]);
        assert!(scheduler.handleAlarm("reminder-5", &storage, &FailingNotifier, NOW).is_err());
    }
}
