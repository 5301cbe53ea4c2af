//! Core domain types for focusdo
//!
//! These are the records the whole application is built around. They carry
//! data plus a few derived read-only fields; all mutation goes through
//! [`AppState`] (see the `tasks` and `sessions` modules).
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Task** | A to-do item with priority, category, optional due date and an estimate |
//! | **FocusSession** | A recorded stretch of focused time, produced by the focus timer |
//! | **Badge** | An achievement tier unlocked by the number of recorded focus sessions |
//! | **AppState** | The aggregate of everything that is persisted |
//!
//! ### Encoding
//!
//! Field names are camelCase on the wire (`isCompleted`, `dueDate`, ...).
//! Decoding is lenient where older blobs may differ: a missing or unknown
//! priority/category falls back to the default, missing notes become empty,
//! a missing estimate becomes 30 minutes and a missing `id` gets a fresh one.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::format::{format_due_date, format_estimated_duration};

/// Estimated duration given to tasks created without one, in minutes
pub const DEFAULT_ESTIMATED_DURATION: u32 = 30;

// ============================================
// Identifiers
// ============================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// First 8 hex characters, enough to tell items apart on screen
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }

            /// The full identifier without hyphens
            pub fn simple(&self) -> String {
                self.0.simple().to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| format!(concat!("invalid ", $what, " id: {}"), e))
            }
        }
    };
}

uuid_id!(
    /// Opaque identity of a [`Task`], fixed at creation
    TaskId,
    "task"
);

uuid_id!(
    /// Opaque identity of a [`FocusSession`]
    SessionId,
    "session"
);

// ============================================
// Priority & Category
// ============================================

/// How important a task is. Ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// All priorities, lowest first
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Returns the identifier used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Returns the label shown to users
    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

/// Life area a task belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    #[default]
    Personal,
    Health,
    Learning,
    Shopping,
    Finance,
    Travel,
    Home,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 8] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Learning,
        Category::Shopping,
        Category::Finance,
        Category::Travel,
        Category::Home,
    ];

    /// Returns the identifier used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Learning => "learning",
            Category::Shopping => "shopping",
            Category::Finance => "finance",
            Category::Travel => "travel",
            Category::Home => "home",
        }
    }

    /// Returns the label shown to users (also the category sort key)
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Health => "Health",
            Category::Learning => "Learning",
            Category::Shopping => "Shopping",
            Category::Finance => "Finance",
            Category::Travel => "Travel",
            Category::Home => "Home",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "health" => Ok(Category::Health),
            "learning" => Ok(Category::Learning),
            "shopping" => Ok(Category::Shopping),
            "finance" => Ok(Category::Finance),
            "travel" => Ok(Category::Travel),
            "home" => Ok(Category::Home),
            _ => Err(format!("unknown category: {}", s)),
        }
    }
}

/// Decode a string enum, falling back to its default when the value is
/// missing, null, not a string or not recognized.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

fn default_estimated_duration() -> u32 {
    DEFAULT_ESTIMATED_DURATION
}

// ============================================
// Task
// ============================================

/// Everything needed to create a [`Task`]; identity and timestamps are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub notes: String,
    pub priority: Priority,
    pub category: Category,
    pub due_date: Option<DateTime<Utc>>,
    /// Minutes
    pub estimated_duration: u32,
}

impl NewTask {
    /// A draft with the given title and default metadata
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: String::new(),
            priority: Priority::default(),
            category: Category::default(),
            due_date: None,
            estimated_duration: DEFAULT_ESTIMATED_DURATION,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = minutes;
        self
    }
}

/// A to-do item.
///
/// `completed_at` is `Some` exactly when `is_completed` is true; use
/// [`Task::set_completed`] rather than touching the two fields separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier (minted on decode for blobs written without one)
    #[serde(default)]
    pub id: TaskId,
    /// Display title; emptiness is checked by callers, not here
    pub title: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Completion flag
    pub is_completed: bool,
    /// Priority (medium when missing or unknown)
    #[serde(default, deserialize_with = "lenient_enum")]
    pub priority: Priority,
    /// Category (personal when missing or unknown)
    #[serde(default, deserialize_with = "lenient_enum")]
    pub category: Category,
    /// When the task is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task was completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Estimated effort in minutes
    #[serde(default = "default_estimated_duration")]
    pub estimated_duration: u32,
}

impl Task {
    /// Build an open task from a draft
    pub fn from_draft(draft: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            title: draft.title,
            notes: draft.notes,
            is_completed: false,
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            created_at: now,
            completed_at: None,
            estimated_duration: draft.estimated_duration,
        }
    }

    /// Set the completion flag and keep `completed_at` in step with it
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.is_completed = completed;
        self.completed_at = completed.then_some(now);
    }

    /// True if the task is open and its due date has passed
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// [`Task::is_overdue`] against an explicit clock
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) if !self.is_completed => now > due,
            _ => false,
        }
    }

    /// True if the due date falls on the given local calendar day
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date
            .map(|due| due.with_timezone(&Local).date_naive() == day)
            .unwrap_or(false)
    }

    /// Due date as shown to users, or an empty string
    pub fn due_date_text(&self) -> String {
        self.due_date.map(format_due_date).unwrap_or_default()
    }

    /// Estimate as shown to users ("15m", "2h", "1h 30m")
    pub fn estimated_duration_text(&self) -> String {
        format_estimated_duration(self.estimated_duration)
    }
}

// ============================================
// Focus sessions & badges
// ============================================

/// Accept any non-negative JSON number as whole seconds.
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    if secs.is_finite() && secs >= 0.0 {
        Ok(secs as u64)
    } else {
        Err(serde::de::Error::custom(format!(
            "invalid session duration: {}",
            secs
        )))
    }
}

/// A finished (or ended early) stretch of focus time. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    /// Unique identifier (minted on decode for blobs written without one)
    #[serde(default)]
    pub id: SessionId,
    /// Elapsed focus time in seconds
    #[serde(rename = "duration", deserialize_with = "deserialize_seconds")]
    pub duration_secs: u64,
    /// When the session was recorded
    pub completed_at: DateTime<Utc>,
}

impl FocusSession {
    pub fn new(duration_secs: u64, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            duration_secs,
            completed_at,
        }
    }

    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.duration_secs)
    }
}

/// Achievement tiers, unlocked by total focus session count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Badge {
    #[serde(rename = "bronze", alias = "Bronze Focus")]
    Bronze,
    #[serde(rename = "silver", alias = "Silver Focus")]
    Silver,
    #[serde(rename = "gold", alias = "Gold Focus")]
    Gold,
    #[serde(rename = "platinum", alias = "Platinum Focus")]
    Platinum,
}

impl Badge {
    /// All tiers, easiest first
    pub const ALL: [Badge; 4] = [Badge::Bronze, Badge::Silver, Badge::Gold, Badge::Platinum];

    /// Number of focus sessions needed to earn this tier
    pub fn requirement(&self) -> usize {
        match self {
            Badge::Bronze => 5,
            Badge::Silver => 15,
            Badge::Gold => 30,
            Badge::Platinum => 50,
        }
    }

    /// Returns the identifier used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::Bronze => "bronze",
            Badge::Silver => "silver",
            Badge::Gold => "gold",
            Badge::Platinum => "platinum",
        }
    }

    /// Returns the label shown to users
    pub fn display_name(&self) -> &'static str {
        match self {
            Badge::Bronze => "Bronze Focus",
            Badge::Silver => "Silver Focus",
            Badge::Gold => "Gold Focus",
            Badge::Platinum => "Platinum Focus",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Aggregate root
// ============================================

/// Everything focusdo persists.
///
/// `earned_badges` tracks the session count thresholds; it only grows while
/// sessions are added and is cleared together with everything else by
/// [`AppState::reset_progress`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub has_completed_onboarding: bool,
    /// Tasks in insertion order
    pub tasks: Vec<Task>,
    /// Sessions in recording order
    pub focus_sessions: Vec<FocusSession>,
    pub earned_badges: BTreeSet<Badge>,
}
