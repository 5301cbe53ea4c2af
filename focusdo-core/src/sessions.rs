//! Focus session tracking and badge derivation.
//!
//! Badges follow the session count: a tier is earned once the number of
//! recorded sessions reaches its requirement. Refreshing only ever adds
//! tiers; they disappear only through [`AppState::reset_progress`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::types::{AppState, Badge, FocusSession, SessionId};

/// Snapshot of focus activity for dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusStats {
    pub session_count: usize,
    pub total_focus_secs: u64,
    pub earned_badges: usize,
}

/// Tiers whose requirement is met by `session_count` sessions
pub fn badges_for_count(session_count: usize) -> BTreeSet<Badge> {
    Badge::ALL
        .into_iter()
        .filter(|badge| session_count >= badge.requirement())
        .collect()
}

impl AppState {
    /// Record a focus session that just ended
    pub fn add_session(&mut self, duration_secs: u64) -> SessionId {
        self.add_session_at(duration_secs, Utc::now())
    }

    /// [`AppState::add_session`] with an explicit completion time
    pub fn add_session_at(&mut self, duration_secs: u64, completed_at: DateTime<Utc>) -> SessionId {
        let session = FocusSession::new(duration_secs, completed_at);
        let id = session.id;
        self.focus_sessions.push(session);

        tracing::debug!(
            session_id = %id,
            duration_secs,
            session_count = self.focus_sessions.len(),
            "Recorded focus session"
        );

        for badge in self.refresh_badges() {
            tracing::info!(badge = %badge, "Badge earned");
        }

        id
    }

    /// Merge in every tier the current session count qualifies for.
    ///
    /// Returns the tiers that were newly added, easiest first.
    pub fn refresh_badges(&mut self) -> Vec<Badge> {
        let mut unlocked = Vec::new();
        for badge in badges_for_count(self.focus_sessions.len()) {
            if self.earned_badges.insert(badge) {
                unlocked.push(badge);
            }
        }
        unlocked
    }

    /// Sum of all recorded session durations
    pub fn total_focus_secs(&self) -> u64 {
        self.focus_sessions.iter().map(|s| s.duration_secs).sum()
    }

    /// The easiest tier not yet earned and how many sessions it still needs
    pub fn next_badge(&self) -> Option<(Badge, usize)> {
        let count = self.focus_sessions.len();
        Badge::ALL
            .into_iter()
            .find(|badge| !self.earned_badges.contains(badge))
            .map(|badge| (badge, badge.requirement().saturating_sub(count)))
    }

    pub fn focus_stats(&self) -> FocusStats {
        FocusStats {
            session_count: self.focus_sessions.len(),
            total_focus_secs: self.total_focus_secs(),
            earned_badges: self.earned_badges.len(),
        }
    }
}
