use std::time::Duration;

use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::{CancelCause, Error};
use crate::retry::{CancelPhase, OperationKind};

/// Structured events for one logical call. Every event carries the same
/// `call_id` so the attempts of one call can be correlated.
#[derive(Clone, Debug)]
pub struct RetryTelemetry {
    call_id: Uuid,
    operation: OperationKind,
}

impl RetryTelemetry {
    pub fn new(operation: OperationKind) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            operation,
        }
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn emit_attempt(&self, attempt: u8, max_attempts: u8) {
        event!(
            Level::DEBUG,
            call_id = %self.call_id,
            operation = %self.operation,
            attempt,
            max_attempts,
            "retry.attempt"
        );
    }

    pub fn emit_retry(&self, attempt: u8, max_attempts: u8, delay: Duration, error: &Error) {
        let status = error.status().map(|s| s.as_u16());
        event!(
            Level::WARN,
            call_id = %self.call_id,
            operation = %self.operation,
            attempt,
            max_attempts,
            status = ?status,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "retry.scheduling"
        );
    }

    pub fn emit_cancelled(&self, attempt: u8, phase: CancelPhase, cause: CancelCause) {
        event!(
            Level::INFO,
            call_id = %self.call_id,
            operation = %self.operation,
            attempt,
            phase = %phase,
            cause = %cause,
            "retry.cancelled"
        );
    }

    pub fn emit_outcome(&self, attempts: u8, success: bool, total_delay: Duration) {
        event!(
            Level::INFO,
            call_id = %self.call_id,
            operation = %self.operation,
            attempts,
            success,
            total_delay_ms = total_delay.as_millis() as u64,
            "retry.outcome"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_support::{capture_logs, drain_logs};

    #[test]
    fn events_of_one_call_share_its_call_id() {
        let telemetry = RetryTelemetry::new(OperationKind::ListCheckRunsForRef);
        let other = RetryTelemetry::new(OperationKind::ListCheckRunsForRef);
        assert_ne!(telemetry.call_id(), other.call_id());

        let (lines, guard) = capture_logs();
        telemetry.emit_cancelled(2, CancelPhase::DuringAttempt, CancelCause::DeadlineExceeded);
        telemetry.emit_outcome(2, false, Duration::from_millis(1000));
        drop(guard);

        let logs = drain_logs(lines);
        let id = format!("call_id={}", telemetry.call_id());
        assert_eq!(logs.len(), 2, "logs: {:?}", logs);
        assert!(logs.iter().all(|line| line.contains(&id)), "logs: {:?}", logs);
        let outcome = logs
            .iter()
            .find(|line| line.contains("retry.outcome"))
            .expect("outcome line");
        assert!(outcome.contains("operation=list_check_runs_for_ref"));
        assert!(outcome.contains("total_delay_ms=1000"));
        assert!(logs[0].contains("phase=during attempt"));
    }
}
