//! Filtering and sorting of task lists for display.
//!
//! Queries never touch the stored list: they return a new vector of
//! references. Filtering happens before sorting, and sorting is stable, so
//! tasks that compare equal under the chosen key keep their insertion order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};

use crate::types::Task;

/// Which tasks to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    #[default]
    All,
    /// Not completed
    Pending,
    Completed,
    /// Open and past the due date
    Overdue,
    /// Due on the current local calendar day
    DueToday,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 5] = [
        TaskFilter::All,
        TaskFilter::Pending,
        TaskFilter::Completed,
        TaskFilter::Overdue,
        TaskFilter::DueToday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Pending => "pending",
            TaskFilter::Completed => "completed",
            TaskFilter::Overdue => "overdue",
            TaskFilter::DueToday => "today",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Pending => "Pending",
            TaskFilter::Completed => "Completed",
            TaskFilter::Overdue => "Overdue",
            TaskFilter::DueToday => "Due Today",
        }
    }

    /// Whether `task` passes this filter at time `now`
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => !task.is_completed,
            TaskFilter::Completed => task.is_completed,
            TaskFilter::Overdue => task.is_overdue_at(now),
            TaskFilter::DueToday => task.is_due_on(now.with_timezone(&Local).date_naive()),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "pending" => Ok(TaskFilter::Pending),
            "completed" | "done" => Ok(TaskFilter::Completed),
            "overdue" => Ok(TaskFilter::Overdue),
            "today" | "due-today" | "due_today" => Ok(TaskFilter::DueToday),
            _ => Err(format!("unknown filter: {}", s)),
        }
    }
}

/// How to order the tasks that pass the filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskSort {
    /// Most urgent first
    #[default]
    Priority,
    /// Earliest due first; tasks without a due date last
    DueDate,
    /// Alphabetical by category label
    Category,
    /// Newest first
    Created,
}

impl TaskSort {
    pub const ALL: [TaskSort; 4] = [
        TaskSort::Priority,
        TaskSort::DueDate,
        TaskSort::Category,
        TaskSort::Created,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSort::Priority => "priority",
            TaskSort::DueDate => "due-date",
            TaskSort::Category => "category",
            TaskSort::Created => "created",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskSort::Priority => "Priority",
            TaskSort::DueDate => "Due Date",
            TaskSort::Category => "Category",
            TaskSort::Created => "Created",
        }
    }

    /// Ordering of two tasks under this key
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            TaskSort::Priority => b.priority.cmp(&a.priority),
            TaskSort::DueDate => match (a.due_date, b.due_date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            TaskSort::Category => a.category.display_name().cmp(b.category.display_name()),
            TaskSort::Created => b.created_at.cmp(&a.created_at),
        }
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(TaskSort::Priority),
            "due-date" | "due_date" | "duedate" | "due" => Ok(TaskSort::DueDate),
            "category" => Ok(TaskSort::Category),
            "created" => Ok(TaskSort::Created),
            _ => Err(format!("unknown sort: {}", s)),
        }
    }
}

/// Filter then sort `tasks` as of now
pub fn query(tasks: &[Task], filter: TaskFilter, sort: TaskSort) -> Vec<&Task> {
    query_at(tasks, filter, sort, Utc::now())
}

/// [`query`] against an explicit clock
pub fn query_at(
    tasks: &[Task],
    filter: TaskFilter,
    sort: TaskSort,
    now: DateTime<Utc>,
) -> Vec<&Task> {
    let mut selected: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t, now)).collect();
    selected.sort_by(|a, b| sort.compare(a, b));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppState, Category, NewTask, Priority};
    use chrono::{Duration, TimeZone};

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_filter_overdue_only_returns_open_past_due() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.add_task(NewTask::new("late").with_due_date(now - Duration::hours(2)));
        state.add_task(NewTask::new("upcoming").with_due_date(now + Duration::hours(2)));
        state.add_task(NewTask::new("no date"));
        let done = state.add_task(NewTask::new("late but done").with_due_date(now - Duration::days(3)));
        state.toggle_task(done);

        let result = query_at(&state.tasks, TaskFilter::Overdue, TaskSort::Priority, now);

        assert_eq!(titles(&result), vec!["late"]);
        assert!(result
            .iter()
            .all(|t| !t.is_completed && t.due_date.unwrap() < now));
    }

    #[test]
    fn test_filter_pending_and_completed() {
        let mut state = AppState::default();
        state.add_task(NewTask::new("open"));
        let done = state.add_task(NewTask::new("done"));
        state.toggle_task(done);

        let now = Utc::now();
        let pending = query_at(&state.tasks, TaskFilter::Pending, TaskSort::Created, now);
        let completed = query_at(&state.tasks, TaskFilter::Completed, TaskSort::Created, now);
        let all = query_at(&state.tasks, TaskFilter::All, TaskSort::Created, now);

        assert_eq!(titles(&pending), vec!["open"]);
        assert_eq!(titles(&completed), vec!["done"]);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_filter_due_today_uses_local_day() {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let tonight = Local.with_ymd_and_hms(2026, 10, 18, 22, 0, 0).unwrap();
        let tomorrow = Local.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

        let mut state = AppState::default();
        state.add_task(NewTask::new("tonight").with_due_date(tonight.with_timezone(&Utc)));
        state.add_task(NewTask::new("tomorrow").with_due_date(tomorrow.with_timezone(&Utc)));
        state.add_task(NewTask::new("undated"));

        let result = query_at(
            &state.tasks,
            TaskFilter::DueToday,
            TaskSort::DueDate,
            now.with_timezone(&Utc),
        );
        assert_eq!(titles(&result), vec!["tonight"]);
    }

    #[test]
    fn test_sort_by_priority_urgent_first_and_stable() {
        let mut state = AppState::default();
        state.add_task(NewTask::new("low").with_priority(Priority::Low));
        state.add_task(NewTask::new("medium a"));
        state.add_task(NewTask::new("urgent").with_priority(Priority::Urgent));
        state.add_task(NewTask::new("medium b"));
        state.add_task(NewTask::new("high").with_priority(Priority::High));

        let result = query(&state.tasks, TaskFilter::All, TaskSort::Priority);
        assert_eq!(
            titles(&result),
            vec!["urgent", "high", "medium a", "medium b", "low"]
        );
    }

    #[test]
    fn test_sort_by_due_date_puts_undated_last() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.add_task(NewTask::new("undated 1"));
        state.add_task(NewTask::new("in 3 days").with_due_date(now + Duration::days(3)));
        state.add_task(NewTask::new("undated 2"));
        state.add_task(NewTask::new("yesterday").with_due_date(now - Duration::days(1)));
        state.add_task(NewTask::new("tomorrow").with_due_date(now + Duration::days(1)));

        let result = query_at(&state.tasks, TaskFilter::All, TaskSort::DueDate, now);
        assert_eq!(
            titles(&result),
            vec!["yesterday", "tomorrow", "in 3 days", "undated 1", "undated 2"]
        );
    }

    #[test]
    fn test_sort_by_category_label() {
        let mut state = AppState::default();
        state.add_task(NewTask::new("standup").with_category(Category::Work));
        state.add_task(NewTask::new("laundry").with_category(Category::Home));
        state.add_task(NewTask::new("budget").with_category(Category::Finance));

        let result = query(&state.tasks, TaskFilter::All, TaskSort::Category);
        assert_eq!(titles(&result), vec!["budget", "laundry", "standup"]);
    }

    #[test]
    fn test_sort_by_created_newest_first() {
        let now = Utc::now();
        let mut state = AppState::default();
        state.add_task_at(NewTask::new("oldest"), now - Duration::hours(2));
        state.add_task_at(NewTask::new("newest"), now);
        state.add_task_at(NewTask::new("middle"), now - Duration::hours(1));

        let result = query(&state.tasks, TaskFilter::All, TaskSort::Created);
        assert_eq!(titles(&result), vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_query_leaves_source_untouched() {
        let mut state = AppState::default();
        state.add_task(NewTask::new("b").with_priority(Priority::Low));
        state.add_task(NewTask::new("a").with_priority(Priority::Urgent));
        let before = state.tasks.clone();

        let _ = query(&state.tasks, TaskFilter::All, TaskSort::Priority);
        assert_eq!(state.tasks, before);
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("due-today".parse::<TaskFilter>(), Ok(TaskFilter::DueToday));
        assert_eq!("Today".parse::<TaskFilter>(), Ok(TaskFilter::DueToday));
        assert_eq!("due_date".parse::<TaskSort>(), Ok(TaskSort::DueDate));
        assert!("random".parse::<TaskSort>().is_err());
        for sort in TaskSort::ALL {
            assert_eq!(sort.as_str().parse::<TaskSort>(), Ok(sort));
        }
        for filter in TaskFilter::ALL {
            assert_eq!(filter.as_str().parse::<TaskFilter>(), Ok(filter));
        }
    }
}
