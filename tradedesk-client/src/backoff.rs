//! Reconnect delay policies

use std::time::Duration;

use shared::realtime::Realm;

/// How long to wait before the next connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Same delay every time, never gives up
    Fixed { delay: Duration },
    /// Doubling delay capped at `max`; gives up after `max_attempts` failures
    Exponential {
        initial: Duration,
        max: Duration,
        max_attempts: u32,
    },
}

impl ReconnectPolicy {
    /// Chat reconnects quickly and forever
    pub fn chat() -> Self {
        Self::Fixed {
            delay: Duration::from_secs(3),
        }
    }

    /// The privileged notification feed backs off and eventually stops
    pub fn notifications() -> Self {
        Self::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            max_attempts: 5,
        }
    }

    pub fn for_realm(realm: Realm) -> Self {
        match realm {
            Realm::Chat => Self::chat(),
            Realm::Notifications => Self::notifications(),
        }
    }

    /// Delay before retrying after the `attempt`-th consecutive failure
    /// (1-based). `None` means give up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::Fixed { delay } => Some(*delay),
            Self::Exponential {
                initial,
                max,
                max_attempts,
            } => {
                if attempt == 0 || attempt > *max_attempts {
                    return None;
                }
                let factor = 1u32 << (attempt - 1).min(31);
                Some(initial.saturating_mul(factor).min(*max))
            }
        }
    }
}
