//! # focusdo-core
//!
//! Core library for focusdo - a to-do list with a Pomodoro focus timer.
//!
//! This library provides:
//! - Domain types for tasks, focus sessions, and badges
//! - Task store, session tracking, and badge derivation
//! - Filtering and sorting of task lists
//! - The focus timer state machine and an async driver for it
//! - Persistence over a flat key-value store (in memory or SQLite)
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! All state lives in one [`AppState`] value. [`AppStore`] wraps it with a
//! [`KeyValueStore`] and writes the state back after every change, as four
//! independently decoded JSON blobs. Derived figures (completion ratio,
//! total focus time, overdue flags) are computed on read and never stored.
//!
//! ## Example
//!
//! ```rust,no_run
//! use focusdo_core::{AppStore, Config, NewTask, Priority, SqliteStore, TaskFilter, TaskSort};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let kv = SqliteStore::open(&config.store_path()).expect("failed to open store");
//! kv.migrate().expect("failed to run migrations");
//!
//! let mut store = AppStore::open(kv);
//! store.add_task(NewTask::new("Write report").with_priority(Priority::High));
//!
//! for task in store.query(TaskFilter::Pending, TaskSort::Priority) {
//!     println!("{}", task.title);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use driver::{run_focus_timer, FocusOutcome, StopRequest};
pub use error::{Error, Result};
pub use query::{query, TaskFilter, TaskSort};
pub use sessions::FocusStats;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use store::AppStore;
pub use tasks::TaskStats;
pub use timer::{FocusTimer, TimerState};
pub use types::*;

// Public modules
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod logging;
pub mod query;
pub mod sessions;
pub mod storage;
pub mod store;
pub mod tasks;
pub mod timer;
pub mod types;
