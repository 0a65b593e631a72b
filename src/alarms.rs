// Named one-shot timers ("alarms")
// Name format is reminder-<taskId>; the table is an explicit name -> fire time map

use parking_lot::RwLock;
use std::collections::HashMap;

pub const REMINDER_PREFIX: &str = "reminder-";

/// A registered timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub name: String,
    pub scheduledTime: i64, // Epoch millis
}

/// Timer collaborator: create, clear by name, list
pub trait AlarmHost: Send + Sync {
    /// Register `name` to fire at `when`, replacing any timer with that name
    fn create(&self, name: &str, when: i64);

    /// Remove `name`; returns whether a timer was removed
    fn clear(&self, name: &str) -> bool;

    fn getAll(&self) -> Vec<Alarm>;
}

/// Timer name for a task id
pub fn alarmName(taskId: i64) -> String {
    format!("{}{}", REMINDER_PREFIX, taskId)
}

/// Task id from a timer name. Foreign or malformed names give `None`.
pub fn parseAlarmName(name: &str) -> Option<i64> {
    let idStr = name.strip_prefix(REMINDER_PREFIX)?;
    if idStr.is_empty() || !idStr.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    idStr.parse().ok()
}

/// In-process timer table
#[derive(Debug, Default)]
pub struct LocalAlarms {
    alarms: RwLock<HashMap<String, Alarm>>,
}

impl LocalAlarms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Alarm> {
        self.alarms.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.alarms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.read().is_empty()
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn takeDue(&self, now: i64) -> Vec<Alarm> {
        let mut alarms = self.alarms.write();
        let dueNames: Vec<String> = alarms
            .values()
            .filter(|a| a.scheduledTime <= now)
            .map(|a| a.name.clone())
            .collect();

        let mut due: Vec<Alarm> = dueNames
            .iter()
            .filter_map(|name| alarms.remove(name))
            .collect();
        due.sort_by_key(|a| a.scheduledTime);
        due
    }
}

impl AlarmHost for LocalAlarms {
    fn create(&self, name: &str, when: i64) {
        self.alarms.write().insert(
            name.to_string(),
            Alarm { name: name.to_string(), scheduledTime: when },
        );
    }

    fn clear(&self, name: &str) -> bool {
        self.alarms.write().remove(name).is_some()
    }

    fn getAll(&self) -> Vec<Alarm> {
        let mut all: Vec<Alarm> = self.alarms.read().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
