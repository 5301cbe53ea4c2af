//! Focus timer state machine.
//!
//! The timer counts down in whole seconds. It does not schedule anything
//! itself: [`FocusTimer::tick`] is called once per second by a driver (see
//! [`crate::driver`]) and returns the session length to record, if any.
//!
//! ```text
//!            start()                 tick() reaches 0
//!   Idle ──────────────▶ Running ───────────────────▶ Idle   (records target)
//!    ▲                   │    ▲
//!    │ end()             │    │ start()
//!    │ (records elapsed  ▼    │
//!    │  if long enough) Paused
//!    └───────────────── Running
//! ```
//!
//! Idle and Paused behave the same from the outside: not running, with a
//! remaining time that has not been reset.

use crate::config::TimerConfig;
use crate::error::{Error, Result};
use crate::format::format_clock;

/// Partial sessions shorter than this are dropped by [`FocusTimer::end`]
pub const DEFAULT_MIN_RECORDED_SECS: u64 = 60;

/// Timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Countdown for one focus session
#[derive(Debug, Clone)]
pub struct FocusTimer {
    target_secs: u64,
    remaining_secs: u64,
    state: TimerState,
    min_recorded_secs: u64,
}

impl FocusTimer {
    /// Idle timer for a session of `target_secs`.
    ///
    /// A zero target is bumped to one second.
    pub fn new(target_secs: u64) -> Self {
        let target_secs = target_secs.max(1);
        Self {
            target_secs,
            remaining_secs: target_secs,
            state: TimerState::Idle,
            min_recorded_secs: DEFAULT_MIN_RECORDED_SECS,
        }
    }

    /// Idle timer using the configured default length and recording threshold
    pub fn from_config(config: &TimerConfig) -> Self {
        Self::new(config.default_secs()).with_min_recorded_secs(config.min_recorded_secs)
    }

    pub fn with_min_recorded_secs(mut self, secs: u64) -> Self {
        self.min_recorded_secs = secs;
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn target_secs(&self) -> u64 {
        self.target_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Seconds counted down since the last reset
    pub fn elapsed_secs(&self) -> u64 {
        self.target_secs - self.remaining_secs
    }

    /// Fraction of the target already elapsed, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        self.elapsed_secs() as f64 / self.target_secs as f64
    }

    /// Remaining time as "MM:SS"
    pub fn clock_text(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Choose a new session length. Only allowed while not running; resets
    /// the remaining time to the new length.
    pub fn select_duration(&mut self, secs: u64) -> Result<()> {
        if self.is_running() {
            return Err(Error::Timer(
                "cannot change duration while the timer is running".to_string(),
            ));
        }
        if secs == 0 {
            return Err(Error::Timer("duration must be at least one second".to_string()));
        }

        self.target_secs = secs;
        self.remaining_secs = secs;
        self.state = TimerState::Idle;
        Ok(())
    }

    /// Start or resume the countdown. No-op while already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        tracing::debug!(
            target_secs = self.target_secs,
            remaining_secs = self.remaining_secs,
            "Focus timer started"
        );
        self.state = TimerState::Running;
    }

    /// Stop counting, keeping the remaining time. Nothing is recorded.
    pub fn pause(&mut self) {
        if !self.is_running() {
            return;
        }
        tracing::debug!(remaining_secs = self.remaining_secs, "Focus timer paused");
        self.state = TimerState::Paused;
    }

    /// Stop a running session early.
    ///
    /// Returns the elapsed seconds to record when at least the minimum
    /// threshold (and at least one second) has passed; shorter sessions are
    /// discarded. The remaining time resets to the target either way. No-op
    /// unless running.
    pub fn end(&mut self) -> Option<u64> {
        if !self.is_running() {
            return None;
        }

        let elapsed = self.elapsed_secs();
        self.reset();

        if elapsed > 0 && elapsed >= self.min_recorded_secs {
            tracing::debug!(elapsed_secs = elapsed, "Focus timer ended early");
            Some(elapsed)
        } else {
            tracing::debug!(elapsed_secs = elapsed, "Focus timer ended, too short to record");
            None
        }
    }

    /// Advance the countdown by one second.
    ///
    /// When the countdown reaches zero the timer stops, resets, and returns
    /// the full target length to record. Ticks while not running are ignored.
    pub fn tick(&mut self) -> Option<u64> {
        if !self.is_running() {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        self.reset();
        tracing::debug!(duration_secs = self.target_secs, "Focus timer completed");
        Some(self.target_secs)
    }

    fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_secs = self.target_secs;
    }
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::from_config(&TimerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(timer: &mut FocusTimer, n: u64) -> Vec<u64> {
        (0..n).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn test_default_is_idle_25_minutes() {
        let timer = FocusTimer::default();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.target_secs(), 25 * 60);
        assert_eq!(timer.remaining_secs(), 25 * 60);
        assert_eq!(timer.clock_text(), "25:00");
    }

    #[test]
    fn test_full_countdown_records_target() {
        let mut timer = FocusTimer::new(25 * 60);
        timer.start();

        let recorded = ticks(&mut timer, 1500);

        assert_eq!(recorded, vec![1500]);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 1500);
    }

    #[test]
    fn test_no_completion_one_tick_early() {
        let mut timer = FocusTimer::new(120);
        timer.start();

        assert!(ticks(&mut timer, 119).is_empty());
        assert!(timer.is_running());
        assert_eq!(timer.remaining_secs(), 1);
    }

    #[test]
    fn test_short_end_is_discarded() {
        let mut timer = FocusTimer::new(1500);
        timer.start();
        ticks(&mut timer, 30);

        assert_eq!(timer.end(), None);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 1500);
    }

    #[test]
    fn test_end_after_threshold_records_elapsed() {
        let mut timer = FocusTimer::new(1500);
        timer.start();
        ticks(&mut timer, 60);

        assert_eq!(timer.end(), Some(60));
        assert_eq!(timer.remaining_secs(), 1500);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let mut timer = FocusTimer::new(1500).with_min_recorded_secs(10);
        timer.start();
        ticks(&mut timer, 10);

        assert_eq!(timer.end(), Some(10));
    }

    #[test]
    fn test_zero_length_end_is_never_recorded() {
        let mut timer = FocusTimer::new(1500).with_min_recorded_secs(0);
        timer.start();

        assert_eq!(timer.end(), None);

        timer.start();
        timer.tick();
        assert_eq!(timer.end(), Some(1));
    }

    #[test]
    fn test_pause_keeps_remaining_and_ignores_ticks() {
        let mut timer = FocusTimer::new(600);
        timer.start();
        ticks(&mut timer, 100);
        timer.pause();

        assert_eq!(timer.state(), TimerState::Paused);
        assert!(ticks(&mut timer, 1000).is_empty());
        assert_eq!(timer.remaining_secs(), 500);
        assert_eq!(timer.elapsed_secs(), 100);

        timer.start();
        assert_eq!(ticks(&mut timer, 500), vec![600]);
    }

    #[test]
    fn test_end_while_paused_is_ignored() {
        let mut timer = FocusTimer::new(600);
        timer.start();
        ticks(&mut timer, 120);
        timer.pause();

        assert_eq!(timer.end(), None);
        assert_eq!(timer.remaining_secs(), 480);
    }

    #[test]
    fn test_select_duration_rules() {
        let mut timer = FocusTimer::new(1500);
        timer.select_duration(45 * 60).unwrap();
        assert_eq!(timer.target_secs(), 2700);
        assert_eq!(timer.remaining_secs(), 2700);

        timer.start();
        assert!(matches!(timer.select_duration(900), Err(Error::Timer(_))));
        assert_eq!(timer.target_secs(), 2700);

        timer.pause();
        timer.select_duration(900).unwrap();
        assert_eq!(timer.remaining_secs(), 900);
        assert_eq!(timer.state(), TimerState::Idle);

        assert!(timer.select_duration(0).is_err());
    }

    #[test]
    fn test_progress_and_clock() {
        let mut timer = FocusTimer::new(100);
        timer.start();
        ticks(&mut timer, 25);

        assert!((timer.progress() - 0.25).abs() < f64::EPSILON);
        assert_eq!(timer.clock_text(), "01:15");
    }
}
