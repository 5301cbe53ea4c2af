//! focusdo - tasks and Pomodoro focus sessions from the terminal
//!
//! Uses XDG Base Directory specification for file locations:
//! - Store: $XDG_DATA_HOME/focusdo/store.db (~/.local/share/focusdo/store.db)
//! - Logs: $XDG_STATE_HOME/focusdo/focusdo.log (~/.local/state/focusdo/focusdo.log)
//! - Config: $XDG_CONFIG_HOME/focusdo/config.toml (~/.config/focusdo/config.toml)

use std::io::{IsTerminal, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use focusdo_core::format::{format_focus_time, format_relative_time};
use focusdo_core::{
    run_focus_timer, AppStore, Badge, Category, Config, FocusOutcome, FocusTimer, NewTask,
    Priority, SqliteStore, StopRequest, Task, TaskFilter, TaskSort,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "focusdo")]
#[command(about = "To-do list with a Pomodoro focus timer")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,

        /// low, medium, high or urgent
        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        /// work, personal, health, learning, shopping, finance, travel or home
        #[arg(short, long, default_value = "personal")]
        category: Category,

        /// Due date: YYYY-MM-DD (end of that day) or RFC 3339 timestamp
        #[arg(short, long, value_parser = parse_due_date)]
        due: Option<DateTime<Utc>>,

        /// Estimated effort in minutes
        #[arg(short, long, default_value = "30")]
        estimate: u32,
    },

    /// List tasks
    List {
        /// all, pending, completed, overdue or today
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,

        /// priority, due-date, category or created
        #[arg(short, long, default_value = "priority")]
        sort: TaskSort,

        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a task done, or open again if it is done
    Toggle {
        /// Task ID (unique prefix is enough)
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID (unique prefix is enough)
        id: String,
    },

    /// Run a focus session; Ctrl-C ends it early
    Focus {
        /// Session length in minutes (defaults to the configured length)
        #[arg(short, long, conflicts_with = "preset")]
        minutes: Option<u32>,

        /// Use the Nth configured preset length (1-based, see [timer] presets)
        #[arg(short, long)]
        preset: Option<usize>,
    },

    /// Show task and focus statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show badge progress
    Badges,

    /// Delete all tasks, sessions and badges
    Reset {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },

    /// Mark onboarding as done
    Onboard,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        focusdo_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Open store at XDG-compliant path (or the configured override)
    let store_path = config.store_path();
    tracing::info!(path = %store_path.display(), "Opening store");

    let kv = SqliteStore::open(&store_path).context("failed to open store")?;
    kv.migrate().context("failed to run store migrations")?;
    let mut store = AppStore::open(kv);

    match args.command {
        Command::Add {
            title,
            notes,
            priority,
            category,
            due,
            estimate,
        } => {
            let title = title.trim();
            if title.is_empty() {
                anyhow::bail!("Task title must not be empty");
            }

            let mut draft = NewTask::new(title)
                .with_notes(notes)
                .with_priority(priority)
                .with_category(category)
                .with_estimated_duration(estimate);
            if let Some(due) = due {
                draft = draft.with_due_date(due);
            }

            let id = store.add_task(draft);
            println!("Added task {} \"{}\"", id.short(), title);
        }

        Command::List { filter, sort, json } => {
            let tasks = store.query(filter, sort);

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
                return Ok(());
            }

            if !store.has_completed_onboarding() {
                eprintln!("Tip: run 'focusdo onboard' to hide this message.");
            }

            if tasks.is_empty() {
                println!("No {} tasks.", filter.display_name().to_lowercase());
                return Ok(());
            }

            for task in tasks {
                print_task_row(task);
            }
        }

        Command::Toggle { id } => {
            let task_id = resolve_task(&store, &id)?;
            store.toggle_task(task_id);
            if let Some(task) = store.state().task(task_id) {
                let status = if task.is_completed { "done" } else { "open" };
                println!("Marked \"{}\" as {}", task.title, status);
            }
        }

        Command::Delete { id } => {
            let task_id = resolve_task(&store, &id)?;
            let title = store
                .state()
                .task(task_id)
                .map(|t| t.title.clone())
                .unwrap_or_default();
            store.delete_task(task_id);
            println!("Deleted \"{}\"", title);
        }

        Command::Focus { minutes, preset } => {
            let minutes = match preset {
                Some(number) => Some(config.timer.preset_minutes(number).with_context(|| {
                    format!(
                        "no preset #{} (configured presets: {} min)",
                        number,
                        config.timer.presets_text()
                    )
                })?),
                None => minutes,
            };
            run_focus(&config, &mut store, minutes)?;
        }

        Command::Stats { json } => {
            let stats = StatsReport::from_store(&store);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }

        Command::Badges => {
            let count = store.focus_sessions().len();
            for badge in Badge::ALL {
                let mark = if store.earned_badges().contains(&badge) {
                    "[x]"
                } else {
                    "[ ]"
                };
                println!(
                    "{} {:<15} {} sessions",
                    mark,
                    badge.display_name(),
                    badge.requirement()
                );
            }
            match store.state().next_badge() {
                Some((badge, needed)) => println!(
                    "\n{} session(s) recorded, {} more for {}",
                    count,
                    needed,
                    badge.display_name()
                ),
                None => println!("\n{} session(s) recorded, every badge earned", count),
            }
        }

        Command::Reset { yes } => {
            if !yes {
                anyhow::bail!("This deletes all tasks, sessions and badges. Re-run with --yes.");
            }
            store.reset_progress();
            println!("Progress reset.");
        }

        Command::Onboard => {
            if store.has_completed_onboarding() {
                println!("Onboarding already completed.");
            } else {
                store.complete_onboarding();
                println!("Welcome to focusdo!");
                println!("  focusdo add \"Write report\" --priority high   add a task");
                println!("  focusdo focus                                 start a focus session");
                println!("  focusdo badges                                see badge progress");
            }
        }
    }

    Ok(())
}

/// Parse `YYYY-MM-DD` as the end of that local day, or a full RFC 3339 timestamp
fn parse_due_date(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s))?;
    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| format!("invalid date '{}'", s))?;
    Local
        .from_local_datetime(&end_of_day)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
        .ok_or_else(|| format!("date '{}' does not exist in the local time zone", s))
}

/// Find the single task whose ID starts with `prefix`
fn resolve_task(store: &AppStore, prefix: &str) -> Result<focusdo_core::TaskId> {
    let matches = store.state().tasks_matching_prefix(prefix);
    match matches.as_slice() {
        [task] => Ok(task.id),
        [] => anyhow::bail!("No task found matching '{}'", prefix),
        _ => anyhow::bail!(
            "'{}' matches {} tasks, use a longer prefix",
            prefix,
            matches.len()
        ),
    }
}

fn print_task_row(task: &Task) {
    let check = if task.is_completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{} {}  {:<7} {:<9} {}",
        check,
        task.id.short(),
        task.priority.display_name(),
        task.category.display_name(),
        task.title
    );

    if task.due_date.is_some() {
        line.push_str(&format!("  due {}", task.due_date_text()));
        if task.is_overdue() {
            line.push_str(" (overdue)");
        }
    }
    line.push_str(&format!("  ~{}", task.estimated_duration_text()));
    println!("{}", line);
}

fn run_focus(config: &Config, store: &mut AppStore, minutes: Option<u32>) -> Result<()> {
    let mut timer = FocusTimer::from_config(&config.timer);
    if let Some(minutes) = minutes {
        timer.select_duration(u64::from(minutes) * 60)?;
    }

    let minutes = timer.target_secs() / 60;
    if config.timer.is_preset(minutes) {
        println!("Focusing for {} min. Press Ctrl-C to end early.", minutes);
    } else {
        tracing::debug!(minutes, presets = ?config.timer.presets, "Custom focus length");
        println!(
            "Focusing for {} min (custom; presets are {} min). Press Ctrl-C to end early.",
            minutes,
            config.timer.presets_text()
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let interactive = std::io::stdout().is_terminal();
    let tick_interval = Duration::from_millis(config.timer.tick_millis);

    let outcome = runtime.block_on(run_focus_timer(
        store,
        &mut timer,
        tick_interval,
        interrupt(),
        |t| {
            if interactive {
                print!("\r{}  ", t.clock_text());
                let _ = std::io::stdout().flush();
            }
        },
    ));

    if interactive {
        println!();
    }

    match outcome {
        FocusOutcome::Completed { duration_secs } => {
            println!("Session complete: {}", format_focus_time(duration_secs));
        }
        FocusOutcome::Ended {
            recorded: Some(secs),
        } => {
            println!("Session ended early, recorded {}", format_focus_time(secs));
        }
        FocusOutcome::Ended { recorded: None } => {
            println!(
                "Session ended early, under {}s so nothing was recorded",
                config.timer.min_recorded_secs
            );
        }
        FocusOutcome::Paused { remaining_secs } => {
            println!("Paused with {} left", format_focus_time(remaining_secs));
        }
    }

    Ok(())
}

/// Resolves to [`StopRequest::End`] on Ctrl-C
async fn interrupt() -> StopRequest {
    match tokio::signal::ctrl_c().await {
        Ok(()) => StopRequest::End,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending().await
        }
    }
}

#[derive(Serialize)]
struct StatsReport {
    total_tasks: usize,
    completed_tasks: usize,
    pending_tasks: usize,
    overdue_tasks: usize,
    completion_percent: u32,
    focus_sessions: usize,
    total_focus_secs: u64,
    earned_badges: Vec<&'static str>,
    last_session: Option<DateTime<Utc>>,
}

impl StatsReport {
    fn from_store(store: &AppStore) -> Self {
        let tasks = store.task_stats();
        let focus = store.focus_stats();
        Self {
            total_tasks: tasks.total,
            completed_tasks: tasks.completed,
            pending_tasks: tasks.pending,
            overdue_tasks: tasks.overdue,
            completion_percent: tasks.completion_percent(),
            focus_sessions: focus.session_count,
            total_focus_secs: focus.total_focus_secs,
            earned_badges: store.earned_badges().iter().map(|b| b.as_str()).collect(),
            last_session: store.focus_sessions().last().map(|s| s.completed_at),
        }
    }
}

fn print_stats(stats: &StatsReport) {
    println!("Tasks");
    println!(
        "  {} total, {} done, {} pending, {} overdue",
        stats.total_tasks, stats.completed_tasks, stats.pending_tasks, stats.overdue_tasks
    );
    println!("  {}% complete", stats.completion_percent);
    println!();
    println!("Focus");
    println!(
        "  {} session(s), {} total",
        stats.focus_sessions,
        format_focus_time(stats.total_focus_secs)
    );
    if let Some(last) = stats.last_session {
        println!("  last session {}", format_relative_time(last));
    }
    println!("  {} badge(s) earned", stats.earned_badges.len());
}
