//! Task store operations on [`AppState`].
//!
//! Lookups by id that find nothing are silent no-ops: callers get `false`
//! back instead of an error.

use chrono::{DateTime, Utc};

use crate::types::{AppState, NewTask, Task, TaskId};

/// Snapshot of task counts for dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Open tasks past their due date
    pub overdue: usize,
    /// `completed / total`, or 0 when there are no tasks
    pub completion_ratio: f64,
}

impl TaskStats {
    /// Completion as a whole percentage, rounded down
    pub fn completion_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.completed * 100 / self.total) as u32
    }
}

impl AppState {
    /// Append a new open task and return its id
    pub fn add_task(&mut self, draft: NewTask) -> TaskId {
        self.add_task_at(draft, Utc::now())
    }

    /// [`AppState::add_task`] with an explicit creation time
    pub fn add_task_at(&mut self, draft: NewTask, now: DateTime<Utc>) -> TaskId {
        let task = Task::from_draft(draft, now);
        let id = task.id;
        tracing::debug!(task_id = %id, title = %task.title, "Adding task");
        self.tasks.push(task);
        id
    }

    /// Flip completion of the task with `id`. Returns false if there is none.
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            tracing::debug!(task_id = %id, "Toggle ignored, no such task");
            return false;
        };

        let completed = !task.is_completed;
        task.set_completed(completed, Utc::now());
        tracing::debug!(task_id = %id, completed, "Toggled task");
        true
    }

    /// Remove the task with `id`. Returns false if there is none.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::debug!(task_id = %id, "Deleted task");
        }
        removed
    }

    /// Drop all tasks, sessions and earned badges in one step
    pub fn reset_progress(&mut self) {
        self.tasks.clear();
        self.focus_sessions.clear();
        self.earned_badges.clear();
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks whose id starts with `prefix` (hyphens and case ignored)
    pub fn tasks_matching_prefix(&self, prefix: &str) -> Vec<&Task> {
        let needle: String = prefix
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if needle.is_empty() {
            return Vec::new();
        }
        self.tasks
            .iter()
            .filter(|t| t.id.simple().starts_with(&needle))
            .collect()
    }

    pub fn completed_tasks_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    pub fn total_tasks_count(&self) -> usize {
        self.tasks.len()
    }

    /// Fraction of tasks completed, 0 when there are none
    pub fn completion_percentage(&self) -> f64 {
        let total = self.total_tasks_count();
        if total == 0 {
            return 0.0;
        }
        self.completed_tasks_count() as f64 / total as f64
    }

    pub fn task_stats(&self) -> TaskStats {
        self.task_stats_at(Utc::now())
    }

    /// [`AppState::task_stats`] against an explicit clock
    pub fn task_stats_at(&self, now: DateTime<Utc>) -> TaskStats {
        let total = self.total_tasks_count();
        let completed = self.completed_tasks_count();
        TaskStats {
            total,
            completed,
            pending: total - completed,
            overdue: self.tasks.iter().filter(|t| t.is_overdue_at(now)).count(),
            completion_ratio: self.completion_percentage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_add_task() {
        let mut state = AppState::default();
        let id = state.add_task(NewTask::new("Buy milk").with_estimated_duration(15));

        assert_eq!(state.total_tasks_count(), 1);
        assert_eq!(state.completed_tasks_count(), 0);
        let task = state.task(id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.estimated_duration_text(), "15m");
    }

    #[test]
    fn test_tasks_keep_insertion_order() {
        let mut state = AppState::default();
        state.add_task(NewTask::new("first"));
        state.add_task(NewTask::new("second"));
        state.add_task(NewTask::new("third"));

        let titles: Vec<&str> = state.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_toggle_twice_restores_task() {
        let mut state = AppState::default();
        let id = state.add_task(NewTask::new("Stretch"));

        assert!(state.toggle_task(id));
        let task = state.task(id).unwrap();
        assert!(task.is_completed);
        assert!(task.completed_at.is_some());

        assert!(state.toggle_task(id));
        let task = state.task(id).unwrap();
        assert!(!task.is_completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let mut state = AppState::default();
        state.add_task(NewTask::new("Keep me"));
        let before = state.clone();

        assert!(!state.toggle_task(TaskId::new()));
        assert!(!state.delete_task(TaskId::new()));
        assert_eq!(state, before);
    }

    #[test]
    fn test_delete_task() {
        let mut state = AppState::default();
        let keep = state.add_task(NewTask::new("keep"));
        let drop = state.add_task(NewTask::new("drop"));

        assert!(state.delete_task(drop));
        assert_eq!(state.total_tasks_count(), 1);
        assert!(state.task(keep).is_some());
        assert!(state.task(drop).is_none());
    }

    #[test]
    fn test_completion_percentage_without_tasks() {
        let state = AppState::default();
        assert_eq!(state.completion_percentage(), 0.0);
        assert_eq!(state.task_stats().completion_percent(), 0);
    }

    #[test]
    fn test_counts_hold_for_mixed_operations() {
        let mut state = AppState::default();
        let mut ids = Vec::new();
        // Small LCG so the sequence is varied but reproducible
        let mut seed: u64 = 42;

        for step in 0..300 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let pick = (seed >> 33) as usize;

            match pick % 4 {
                0 | 1 => ids.push(state.add_task(NewTask::new(format!("task {step}")))),
                2 if !ids.is_empty() => {
                    state.toggle_task(ids[pick % ids.len()]);
                }
                3 if !ids.is_empty() => {
                    let id = ids.swap_remove(pick % ids.len());
                    state.delete_task(id);
                }
                _ => {}
            }

            let completed = state.completed_tasks_count();
            let total = state.total_tasks_count();
            assert!(completed <= total);
            if total == 0 {
                assert_eq!(state.completion_percentage(), 0.0);
            } else {
                assert_eq!(state.completion_percentage(), completed as f64 / total as f64);
            }
        }
    }

    #[test]
    fn test_task_stats() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.add_task(NewTask::new("late").with_due_date(now - Duration::days(1)));
        state.add_task(NewTask::new("later").with_due_date(now + Duration::days(1)));
        let done = state.add_task(NewTask::new("done").with_due_date(now - Duration::days(2)));
        state.toggle_task(done);
        state.add_task(NewTask::new("whenever"));

        let stats = state.task_stats_at(now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_percent(), 25);
    }

    #[test]
    fn test_completion_percent_is_exact() {
        let mut state = AppState::default();
        let ids: Vec<TaskId> = (0..100)
            .map(|i| state.add_task(NewTask::new(format!("task {i}"))))
            .collect();
        for id in &ids[..29] {
            state.toggle_task(*id);
        }

        assert_eq!(state.task_stats().completion_percent(), 29);

        state.toggle_task(ids[29]);
        state.toggle_task(ids[30]);
        assert_eq!(state.task_stats().completion_percent(), 31);
    }

    #[test]
    fn test_reset_progress_clears_everything_but_onboarding() {
        let mut state = AppState {
            has_completed_onboarding: true,
            ..Default::default()
        };
        state.add_task(NewTask::new("a"));
        for _ in 0..5 {
            state.add_session(600);
        }
        assert!(!state.earned_badges.is_empty());

        state.reset_progress();

        assert!(state.tasks.is_empty());
        assert!(state.focus_sessions.is_empty());
        assert!(state.earned_badges.is_empty());
        assert!(state.has_completed_onboarding);
    }

    #[test]
    fn test_prefix_lookup() {
        let mut state = AppState::default();
        let id = state.add_task(NewTask::new("find me"));
        let short = id.short();

        let matches = state.tasks_matching_prefix(&short.to_uppercase());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, id);
        assert!(state.tasks_matching_prefix("").is_empty());
        assert_eq!(state.tasks_matching_prefix(&id.to_string()).len(), 1);
    }
}
