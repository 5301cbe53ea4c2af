//! Persistent application state.
//!
//! [`AppStore`] owns the in-memory [`AppState`] together with the key-value
//! store it was loaded from. Every mutation that changes the state is written
//! back right away. A failed write is logged and otherwise ignored: the
//! in-memory state stays authoritative for the rest of the run.

use crate::error::Result;
use crate::query::{self, TaskFilter, TaskSort};
use crate::sessions::FocusStats;
use crate::storage::{codec, KeyValueStore, MemoryStore};
use crate::tasks::TaskStats;
use crate::types::{AppState, Badge, FocusSession, NewTask, SessionId, Task, TaskId};
use std::collections::BTreeSet;

/// Application state bound to its backing store
pub struct AppStore {
    state: AppState,
    kv: Box<dyn KeyValueStore>,
}

impl AppStore {
    /// Load state from `kv`, falling back to defaults field by field
    pub fn open<S: KeyValueStore + 'static>(kv: S) -> Self {
        let state = codec::load(&kv);
        Self {
            state,
            kv: Box::new(kv),
        }
    }

    /// Empty store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::open(MemoryStore::new())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn focus_sessions(&self) -> &[FocusSession] {
        &self.state.focus_sessions
    }

    pub fn earned_badges(&self) -> &BTreeSet<Badge> {
        &self.state.earned_badges
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.state.has_completed_onboarding
    }

    pub fn task_stats(&self) -> TaskStats {
        self.state.task_stats()
    }

    pub fn focus_stats(&self) -> FocusStats {
        self.state.focus_stats()
    }

    /// Filtered and sorted view over the tasks
    pub fn query(&self, filter: TaskFilter, sort: TaskSort) -> Vec<&Task> {
        query::query(&self.state.tasks, filter, sort)
    }

    pub fn complete_onboarding(&mut self) {
        if self.state.has_completed_onboarding {
            return;
        }
        self.state.has_completed_onboarding = true;
        self.persist();
    }

    pub fn add_task(&mut self, draft: NewTask) -> TaskId {
        let id = self.state.add_task(draft);
        self.persist();
        id
    }

    /// Returns false, without writing, when no task has `id`
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        let changed = self.state.toggle_task(id);
        if changed {
            self.persist();
        }
        changed
    }

    /// Returns false, without writing, when no task has `id`
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let changed = self.state.delete_task(id);
        if changed {
            self.persist();
        }
        changed
    }

    /// Record a finished focus session, unlocking badges as thresholds pass
    pub fn add_session(&mut self, duration_secs: u64) -> SessionId {
        let id = self.state.add_session(duration_secs);
        self.persist();
        id
    }

    /// Clear tasks, sessions and badges. Onboarding is kept.
    pub fn reset_progress(&mut self) {
        self.state.reset_progress();
        tracing::info!("Progress reset");
        self.persist();
    }

    /// Write the whole state, reporting failure to the caller
    pub fn save(&self) -> Result<()> {
        codec::save(self.kv.as_ref(), &self.state)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "Failed to persist state, keeping in-memory changes");
        }
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
