//! Encoding of [`AppState`] into four independently keyed JSON blobs.
//!
//! | Key | Content | On decode failure |
//! |-----|---------|-------------------|
//! | `tasks` | array of tasks | empty list |
//! | `focusSessions` | array of focus sessions | empty list |
//! | `earnedBadges` | array of badge tiers | empty set |
//! | `hasCompletedOnboarding` | boolean | `false` |
//!
//! Loading never fails as a whole: each key is decoded on its own and a
//! missing, unreadable or corrupt blob only resets that one field.
//! Saving writes the four keys one after another without a transaction, so a
//! crash mid-save can leave keys from different points in time.

use serde::de::DeserializeOwned;

use super::kv::KeyValueStore;
use crate::error::Result;
use crate::types::AppState;

pub const TASKS_KEY: &str = "tasks";
pub const FOCUS_SESSIONS_KEY: &str = "focusSessions";
pub const EARNED_BADGES_KEY: &str = "earnedBadges";
pub const ONBOARDING_KEY: &str = "hasCompletedOnboarding";

/// All keys owned by the codec, in write order
pub const ALL_KEYS: [&str; 4] = [
    TASKS_KEY,
    FOCUS_SESSIONS_KEY,
    EARNED_BADGES_KEY,
    ONBOARDING_KEY,
];

/// Persist the whole state.
///
/// Every field is encoded before the first write, so an encoding failure
/// leaves the store untouched. A write failure stops at the failing key.
pub fn save<S: KeyValueStore + ?Sized>(store: &S, state: &AppState) -> Result<()> {
    let blobs = [
        (TASKS_KEY, serde_json::to_vec(&state.tasks)?),
        (FOCUS_SESSIONS_KEY, serde_json::to_vec(&state.focus_sessions)?),
        (EARNED_BADGES_KEY, serde_json::to_vec(&state.earned_badges)?),
        (
            ONBOARDING_KEY,
            serde_json::to_vec(&state.has_completed_onboarding)?,
        ),
    ];

    for (key, blob) in &blobs {
        store.set(key, blob)?;
    }

    tracing::debug!(
        tasks = state.tasks.len(),
        sessions = state.focus_sessions.len(),
        badges = state.earned_badges.len(),
        "Saved state"
    );

    Ok(())
}

/// Load the whole state, substituting defaults field by field.
///
/// Earned badges are merged with the thresholds reached by the loaded
/// session count afterwards.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> AppState {
    let mut state = AppState {
        has_completed_onboarding: load_field(store, ONBOARDING_KEY).unwrap_or(false),
        tasks: load_field(store, TASKS_KEY).unwrap_or_default(),
        focus_sessions: load_field(store, FOCUS_SESSIONS_KEY).unwrap_or_default(),
        earned_badges: load_field(store, EARNED_BADGES_KEY).unwrap_or_default(),
    };

    let unlocked = state.refresh_badges();
    if !unlocked.is_empty() {
        tracing::info!(?unlocked, "Restored badges implied by session count");
    }

    tracing::debug!(
        tasks = state.tasks.len(),
        sessions = state.focus_sessions.len(),
        badges = state.earned_badges.len(),
        onboarded = state.has_completed_onboarding,
        "Loaded state"
    );

    state
}

fn load_field<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored field, using default");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to decode stored field, using default");
            None
        }
    }
}
