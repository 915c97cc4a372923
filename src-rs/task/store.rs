use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::types::{Task, TaskFailure, TaskOutput, TaskPayload, TaskStatus};

/// A status change applied through [`TaskStore::transition`]. A terminal
/// change carries its outcome; it is committed together with the status and
/// `completed_at` under a single write.
#[derive(Clone, Debug)]
pub enum Transition {
    Processing,
    Completed(TaskOutput),
    Failed(TaskFailure),
}

impl Transition {
    pub fn target(&self) -> TaskStatus {
        match self {
            Self::Processing => TaskStatus::Processing,
            Self::Completed(_) => TaskStatus::Completed,
            Self::Failed(_) => TaskStatus::Failed,
        }
    }
}

/// Sole owner of the `id -> record` map. All mutation goes through
/// [`create`](TaskStore::create) and [`transition`](TaskStore::transition);
/// read paths only ever see committed snapshots.
pub struct TaskStore {
    journal: Option<PathBuf>,
    tasks: RwLock<HashMap<String, Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            journal: None,
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Store backed by a JSON journal file. Existing records are reloaded so
    /// a restart does not drop terminal results.
    pub fn with_journal(path: PathBuf) -> Self {
        let tasks = match load_journal(&path) {
            Some(list) => list.into_iter().map(|task| (task.id.clone(), task)).collect(),
            None => HashMap::new(),
        };
        Self {
            journal: Some(path),
            tasks: RwLock::new(tasks),
        }
    }

    pub fn create(&self, payload: TaskPayload) -> Task {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            payload,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.tasks.write().insert(task.id.clone(), task.clone());
        self.save_if_needed();
        task
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().get(id).cloned()
    }

    /// Applies a status change, enforcing the monotonic ordering. A rejected
    /// move returns [`Error::Conflict`]; that is a bug in the caller, so it is
    /// also logged at error level.
    pub fn transition(&self, id: &str, change: Transition) -> Result<Task> {
        let updated = {
            let mut map = self.tasks.write();
            let task = map
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            let target = change.target();
            if !task.status.can_transition_to(target) {
                tracing::error!(id, from = %task.status, to = %target, "illegal task transition");
                return Err(Error::Conflict {
                    id: id.to_string(),
                    from: task.status,
                    to: target,
                });
            }
            task.status = target;
            match change {
                Transition::Processing => {}
                Transition::Completed(output) => {
                    task.result = Some(output);
                    task.completed_at = Some(Utc::now());
                }
                Transition::Failed(failure) => {
                    task.error = Some(failure);
                    task.completed_at = Some(Utc::now());
                }
            }
            task.clone()
        };
        self.save_if_needed();
        tracing::debug!(id, status = %updated.status, "task transitioned");
        Ok(updated)
    }

    /// Newest-first listing, truncated to `limit`.
    pub fn list(&self, limit: usize) -> Vec<Task> {
        let map = self.tasks.read();
        let mut items: Vec<Task> = map.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if items.len() > limit {
            items.truncate(limit);
        }
        items
    }

    pub fn count(&self) -> usize {
        self.tasks.read().len()
    }

    /// Drops terminal records whose `completed_at` lies outside the retention
    /// window. Non-terminal records are never purged.
    pub fn purge_expired(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let removed = {
            let mut map = self.tasks.write();
            let before = map.len();
            map.retain(|_, task| match task.completed_at {
                Some(done) => done > cutoff,
                None => true,
            });
            before - map.len()
        };
        if removed > 0 {
            self.save_if_needed();
            tracing::debug!(removed, "purged expired task records");
        }
        removed
    }

    fn save_if_needed(&self) {
        let path = match &self.journal {
            Some(path) => path.clone(),
            None => return,
        };
        let map = self.tasks.read();
        let list: Vec<&Task> = map.values().collect();
        match serde_json::to_string_pretty(&list) {
            Ok(serialized) => {
                if let Err(err) = fs::write(&path, serialized) {
                    tracing::warn!(path = %path.display(), %err, "failed to write task journal");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize task journal"),
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load_journal(path: &PathBuf) -> Option<Vec<Task>> {
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Vec<Task>>(&data) {
        Ok(list) => Some(list),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable task journal");
            None
        }
    }
}
