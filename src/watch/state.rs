use tokio::time::Instant;

use crate::constants::UNKNOWN_INDEX;

/// Lock state of a watched key.
///
/// `attempt` counts consecutive unsuccessful or lock-triggering cycles and is
/// never reset by the engine. `last_known_index` is [`UNKNOWN_INDEX`] until the
/// key has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Eligible for the next poll cycle
    Unlocked { attempt: u32, last_known_index: i64 },

    /// Skipped by poll cycles until `unlock_at`
    Locked {
        attempt: u32,
        last_known_index: i64,
        unlock_at: Instant,
    },
}

impl Default for WatchState {
    fn default() -> Self {
        WatchState::Unlocked {
            attempt: 0,
            last_known_index: UNKNOWN_INDEX,
        }
    }
}

impl WatchState {
    pub fn locked_until(
        attempt: u32,
        last_known_index: i64,
        unlock_at: Instant,
    ) -> Self {
        WatchState::Locked {
            attempt,
            last_known_index,
            unlock_at,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, WatchState::Locked { .. })
    }

    pub fn attempt(&self) -> u32 {
        match self {
            WatchState::Unlocked { attempt, .. } | WatchState::Locked { attempt, .. } => *attempt,
        }
    }

    pub fn last_known_index(&self) -> i64 {
        match self {
            WatchState::Unlocked { last_known_index, .. }
            | WatchState::Locked { last_known_index, .. } => *last_known_index,
        }
    }

    pub fn unlock_at(&self) -> Option<Instant> {
        match self {
            WatchState::Unlocked { .. } => None,
            WatchState::Locked { unlock_at, .. } => Some(*unlock_at),
        }
    }

    /// Clear the lock once `now` has reached `unlock_at`.
    ///
    /// Only the lock is dropped: `attempt` and `last_known_index` carry over.
    pub fn transition(
        self,
        now: Instant,
    ) -> Self {
        match self {
            WatchState::Locked {
                attempt,
                last_known_index,
                unlock_at,
            } if now >= unlock_at => WatchState::Unlocked {
                attempt,
                last_known_index,
            },
            state => state,
        }
    }
}

/// Entry-wise form of [`WatchState::transition`]
pub fn transition(
    now: Instant,
    (key, state): (String, WatchState),
) -> (String, WatchState) {
    (key, state.transition(now))
}

/// Whether an entry may be polled in the current cycle
pub fn is_eligible(entry: &(String, WatchState)) -> bool {
    !entry.1.is_locked()
}
