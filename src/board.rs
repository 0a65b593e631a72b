// In-memory task board: the active list plus the recycle bin
// List and trash membership only change through the transitions below

use crate::models::{Task, TrashedTask};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    pub tasks: Vec<Task>,
    pub trash: Vec<TrashedTask>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>, trash: Vec<TrashedTask>) -> Self {
        Self { tasks, trash }
    }

    /// Id for a new task: the creation time, bumped past any id in use.
    /// `None` once the id space is exhausted.
    pub fn nextId(&self, now: i64) -> Option<i64> {
        let maxId = self.tasks.iter().map(|t| t.id)
            .chain(self.trash.iter().map(|t| t.id()))
            .max();
        match maxId {
            Some(m) if m >= now => m.checked_add(1),
            _ => Some(now),
        }
    }

    pub fn containsId(&self, id: i64) -> bool {
        self.tasks.iter().any(|t| t.id == id) || self.trash.iter().any(|t| t.id() == id)
    }

    pub fn findTaskMut(&mut self, id: i64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// New tasks go to the top of the list
    pub fn addTask(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    /// Active -> Trashed. `None` when the id is not active.
    pub fn moveToTrash(&mut self, id: i64, deletedAt: i64) -> Option<TrashedTask> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(idx);
        let trashed = TrashedTask::fromTask(removed, deletedAt);
        self.trash.insert(0, trashed.clone());
        Some(trashed)
    }

    /// Trashed -> Active. `None` when the id is not in the trash.
    pub fn restoreFromTrash(&mut self, id: i64) -> Option<Task> {
        let idx = self.trash.iter().position(|t| t.id() == id)?;
        let restored = self.trash.remove(idx).intoTask();
        self.tasks.insert(0, restored.clone());
        Some(restored)
    }

    /// Restore every trashed task; trash order is kept at the top of the list
    pub fn restoreAll(&mut self) -> Vec<Task> {
        let restored: Vec<Task> = self.trash.drain(..).map(TrashedTask::intoTask).collect();
        let mut tasks = restored.clone();
        tasks.append(&mut self.tasks);
        self.tasks = tasks;
        restored
    }

    /// Trashed -> Erased for one task
    pub fn eraseFromTrash(&mut self, id: i64) -> Option<TrashedTask> {
        let idx = self.trash.iter().position(|t| t.id() == id)?;
        Some(self.trash.remove(idx))
    }

    /// Trashed -> Erased for every task
    pub fn emptyTrash(&mut self) -> Vec<TrashedTask> {
        std::mem::take(&mut self.trash)
    }

    /// Move a task to `newIndex`, keeping the others in relative order.
    /// Indexes past the end move the task to the bottom.
    pub fn moveTask(&mut self, id: i64, newIndex: usize) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let moved = self.tasks.remove(idx);
        let target = newIndex.min(self.tasks.len());
        self.tasks.insert(target, moved);
        true
    }

    /// Drop `draggedId` onto `targetId`: the dragged task takes the target's index
    pub fn moveTaskOnto(&mut self, draggedId: i64, targetId: i64) -> bool {
        let Some(dropIdx) = self.tasks.iter().position(|t| t.id == targetId) else {
            return false;
        };
        self.moveTask(draggedId, dropIdx)
    }
}
