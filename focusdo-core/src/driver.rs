//! Async driver that feeds wall-clock ticks into a [`FocusTimer`].
//!
//! The timer itself is a plain state machine. This module runs it on a tokio
//! interval and records finished sessions into an [`AppStore`]. A stop request
//! future lets the caller pause or end the run (for example on Ctrl-C); when a
//! stop request and a tick are ready at the same moment, the stop request wins
//! so no tick is applied after cancellation.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::store::AppStore;
use crate::timer::FocusTimer;

/// What the caller wants when the stop future resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    /// Keep the remaining time; nothing is recorded
    Pause,
    /// End the session early, recording it if it was long enough
    End,
}

/// How a driven run finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Countdown reached zero and the full session was recorded
    Completed { duration_secs: u64 },
    /// Ended early; `recorded` holds the elapsed seconds if they were kept
    Ended { recorded: Option<u64> },
    /// Paused with this much time left
    Paused { remaining_secs: u64 },
}

/// Run `timer` until it completes or `stop` resolves.
///
/// The timer is started if it is not already running. `on_tick` is called
/// after every tick that did not finish the session.
pub async fn run_focus_timer<F, T>(
    store: &mut AppStore,
    timer: &mut FocusTimer,
    tick_interval: Duration,
    stop: F,
    mut on_tick: T,
) -> FocusOutcome
where
    F: Future<Output = StopRequest>,
    T: FnMut(&FocusTimer),
{
    timer.start();
    tracing::info!(
        target_secs = timer.target_secs(),
        remaining_secs = timer.remaining_secs(),
        "Focus session running"
    );

    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately
    interval.tick().await;

    tokio::pin!(stop);

    loop {
        tokio::select! {
            biased;

            request = &mut stop => {
                return match request {
                    StopRequest::Pause => {
                        timer.pause();
                        tracing::info!(remaining_secs = timer.remaining_secs(), "Focus session paused");
                        FocusOutcome::Paused { remaining_secs: timer.remaining_secs() }
                    }
                    StopRequest::End => {
                        let recorded = timer.end();
                        if let Some(secs) = recorded {
                            store.add_session(secs);
                        }
                        tracing::info!(?recorded, "Focus session ended early");
                        FocusOutcome::Ended { recorded }
                    }
                };
            }

            _ = interval.tick() => {
                if let Some(duration_secs) = timer.tick() {
                    store.add_session(duration_secs);
                    tracing::info!(duration_secs, "Focus session completed");
                    return FocusOutcome::Completed { duration_secs };
                }
                on_tick(&*timer);
            }
        }
    }
}
