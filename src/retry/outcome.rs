use crate::errors::{CancelCause, Error};
use crate::types::{Reply, Response};

/// Classification of one attempt.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(Reply<T>),
    /// Transport failure or a 5xx; another attempt is warranted.
    Retryable(Option<Response>, Error),
    /// Anything retrying will not fix; surfaced to the caller unchanged.
    Terminal(Option<Response>, Error),
    /// The governing context was already done when the attempt failed.
    Cancelled(Option<Response>, CancelCause),
}

impl<T> Outcome<T> {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Outcome::Retryable(..))
    }
}

/// Decides what to do with one attempt's result. Rules apply in order, first
/// match wins:
///
/// 1. no error: success
/// 2. context already done: cancelled, carrying the context's cause
/// 3. the attempt's own deadline expired: terminal
/// 4. a response whose status is outside 500..=599: terminal
/// 5. anything else (no response, or a 5xx): retryable
pub fn classify<T>(result: Result<Reply<T>, Error>, context_done: Option<CancelCause>) -> Outcome<T> {
    let err = match result {
        Ok(reply) => return Outcome::Success(reply),
        Err(err) => err,
    };
    let response = err.response().cloned();

    if let Some(cause) = context_done {
        return Outcome::Cancelled(response, cause);
    }

    if err.is_deadline_exceeded() {
        return Outcome::Terminal(response, err);
    }

    match response {
        Some(resp) if !resp.is_server_error() => Outcome::Terminal(Some(resp), err),
        response => Outcome::Retryable(response, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::OperationKind;
    use reqwest::StatusCode;

    fn api_error(code: u16) -> Error {
        Error::Api {
            response: Response::new(StatusCode::from_u16(code).unwrap()),
            message: "API error".into(),
        }
    }

    fn deadline() -> Error {
        Error::DeadlineExceeded {
            operation: OperationKind::GetCombinedStatus,
        }
    }

    #[test]
    fn success_wins_even_when_context_is_done() {
        let reply = Reply {
            body: 7u8,
            response: Response::new(StatusCode::OK),
        };
        let out = classify(Ok(reply), Some(CancelCause::Cancelled));
        assert!(matches!(out, Outcome::Success(r) if r.body == 7));
    }

    #[test]
    fn server_errors_are_retryable() {
        for code in [500, 502, 503, 599] {
            let out = classify::<()>(Err(api_error(code)), None);
            assert!(out.is_retryable(), "status {code} should be retryable");
        }
    }

    #[test]
    fn non_server_statuses_are_terminal() {
        for code in [301, 400, 401, 403, 404, 422, 429, 600] {
            match classify::<()>(Err(api_error(code)), None) {
                Outcome::Terminal(Some(resp), Error::Api { .. }) => {
                    assert_eq!(resp.status.as_u16(), code)
                }
                other => panic!("status {code}: unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn connectionless_failure_is_retryable() {
        let out = classify::<()>(Err(Error::Io(std::io::ErrorKind::ConnectionReset.into())), None);
        assert!(matches!(out, Outcome::Retryable(None, Error::Io(_))));
    }

    #[test]
    fn attempt_deadline_is_terminal() {
        let out = classify::<()>(Err(deadline()), None);
        assert!(matches!(out, Outcome::Terminal(None, Error::DeadlineExceeded { .. })));
    }

    #[test]
    fn done_context_takes_precedence_over_attempt_deadline() {
        let out = classify::<()>(Err(deadline()), Some(CancelCause::DeadlineExceeded));
        assert!(matches!(
            out,
            Outcome::Cancelled(None, CancelCause::DeadlineExceeded)
        ));
    }

    #[test]
    fn done_context_keeps_the_response() {
        let out = classify::<()>(Err(api_error(503)), Some(CancelCause::Cancelled));
        match out {
            Outcome::Cancelled(Some(resp), CancelCause::Cancelled) => {
                assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
