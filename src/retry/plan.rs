use std::time::Duration;

use crate::errors::{CancelCause, Error};
use crate::request_context::RequestContext;

/// Immutable retry/backoff configuration for one call site.
///
/// Backoff is deterministic exponential: `base_delay * 2^attempt_index`, no jitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPlan {
    max_attempts: u8,
    base_delay: Duration,
}

impl RetryPlan {
    pub fn new(max_attempts: u8, base_delay: Duration) -> Result<Self, Error> {
        if max_attempts == 0 {
            return Err(Error::Config("max_attempts must be >= 1".into()));
        }
        if base_delay.is_zero() {
            return Err(Error::Config("base delay must be > 0".into()));
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    pub fn default_plan() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }

    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay to wait after the failed attempt `attempt_index` (0-based).
    pub fn delay_for_attempt(&self, attempt_index: u8) -> Duration {
        let factor = 1u32.checked_shl(u32::from(attempt_index)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Sleeps for the backoff of `attempt_index` unless `ctx` fires first.
    /// Returns the cause when the wait was abandoned.
    pub async fn wait(&self, attempt_index: u8, ctx: &RequestContext) -> Result<(), CancelCause> {
        let delay = self.delay_for_attempt(attempt_index);
        tokio::select! {
            biased;
            cause = ctx.done() => Err(cause),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

impl Default for RetryPlan {
    fn default() -> Self {
        Self::default_plan()
    }
}
