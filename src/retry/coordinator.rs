use std::fmt;
use std::future::Future;

use tokio::time::Instant;

use crate::errors::{CancelCause, Error};
use crate::request_context::RequestContext;
use crate::telemetry::retry::RetryTelemetry;
use crate::types::{Reply, Response};

use super::{Outcome, classify, plan::RetryPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    GetCombinedStatus,
    ListCheckRunsForRef,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::GetCombinedStatus => write!(f, "get_combined_status"),
            OperationKind::ListCheckRunsForRef => write!(f, "list_check_runs_for_ref"),
        }
    }
}

/// Where in the retry loop cancellation was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelPhase {
    BeforeAttempt,
    DuringAttempt,
    Backoff,
}

impl fmt::Display for CancelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelPhase::BeforeAttempt => write!(f, "before attempt"),
            CancelPhase::DuringAttempt => write!(f, "during attempt"),
            CancelPhase::Backoff => write!(f, "during backoff"),
        }
    }
}

/// Runs one logical call: attempts strictly in sequence, classifying each
/// result and backing off between retryable failures. Holds no state across
/// calls, so one coordinator can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct RetryCoordinator {
    plan: RetryPlan,
}

impl RetryCoordinator {
    pub fn new(plan: RetryPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &RetryPlan {
        &self.plan
    }

    pub async fn execute<F, Fut, T>(
        &self,
        ctx: &RequestContext,
        operation: OperationKind,
        mut op: F,
    ) -> Result<Reply<T>, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Reply<T>, Error>>,
    {
        let telemetry = RetryTelemetry::new(operation);
        let max_attempts = self.plan.max_attempts();
        let start = Instant::now();
        let mut attempt: u8 = 0;
        let mut last_response: Option<Response> = None;

        loop {
            if let Some(cause) = ctx.cause() {
                telemetry.emit_cancelled(attempt, CancelPhase::BeforeAttempt, cause);
                telemetry.emit_outcome(attempt, false, start.elapsed());
                return Err(cancelled(
                    operation,
                    CancelPhase::BeforeAttempt,
                    cause,
                    last_response,
                ));
            }

            let attempts = attempt + 1;
            telemetry.emit_attempt(attempts, max_attempts);

            let result = op().await;
            let (response, err) = match classify(result, ctx.cause()) {
                Outcome::Success(reply) => {
                    telemetry.emit_outcome(attempts, true, start.elapsed());
                    return Ok(reply);
                }
                Outcome::Cancelled(response, cause) => {
                    telemetry.emit_cancelled(attempts, CancelPhase::DuringAttempt, cause);
                    telemetry.emit_outcome(attempts, false, start.elapsed());
                    return Err(cancelled(
                        operation,
                        CancelPhase::DuringAttempt,
                        cause,
                        response,
                    ));
                }
                Outcome::Terminal(_, err) => {
                    telemetry.emit_outcome(attempts, false, start.elapsed());
                    return Err(err);
                }
                Outcome::Retryable(response, err) => (response, err),
            };

            // No wait after the final attempt.
            if attempts >= max_attempts {
                telemetry.emit_outcome(attempts, false, start.elapsed());
                return Err(Error::RetriesExhausted {
                    operation,
                    attempts,
                    last: Box::new(err),
                });
            }

            telemetry.emit_retry(
                attempts,
                max_attempts,
                self.plan.delay_for_attempt(attempt),
                &err,
            );
            if let Err(cause) = self.plan.wait(attempt, ctx).await {
                telemetry.emit_cancelled(attempts, CancelPhase::Backoff, cause);
                telemetry.emit_outcome(attempts, false, start.elapsed());
                return Err(cancelled(operation, CancelPhase::Backoff, cause, response));
            }
            last_response = response;
            attempt += 1;
        }
    }
}

fn cancelled(
    operation: OperationKind,
    phase: CancelPhase,
    cause: CancelCause,
    response: Option<Response>,
) -> Error {
    Error::Cancelled {
        operation,
        phase,
        cause,
        response,
    }
}
