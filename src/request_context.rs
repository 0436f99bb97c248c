use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::CancelCause;

/// Governing cancellation state for one logical call: an explicit token plus an
/// optional overall deadline. Cheap to clone; clones share the token.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Why the context is done, or `None` while it is still live.
    /// Explicit cancellation wins over an elapsed deadline.
    pub fn cause(&self) -> Option<CancelCause> {
        if self.token.is_cancelled() {
            return Some(CancelCause::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelCause::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the token is cancelled or the deadline passes.
    pub async fn done(&self) -> CancelCause {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => CancelCause::Cancelled,
                    () = tokio::time::sleep_until(deadline) => CancelCause::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                CancelCause::Cancelled
            }
        }
    }
}
