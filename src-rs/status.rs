use std::sync::Arc;

use crate::error::{Error, Result};
use crate::task::{Task, TaskStore};

const MAX_ID_LEN: usize = 64;

/// Read-only lookup shaped for polling clients. Every call is an independent
/// snapshot; there is no subscription state behind it.
pub struct StatusService {
    store: Arc<TaskStore>,
}

impl StatusService {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    pub fn status(&self, id: &str) -> Result<Task> {
        if !well_formed(id) {
            return Err(Error::InvalidIdentifier(id.to_string()));
        }
        self.store
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

// Ids are opaque tokens; this only filters out keys that could never have
// been handed out, before any store lookup happens.
fn well_formed(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
