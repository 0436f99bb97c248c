use std::fmt;

use reqwest::StatusCode;

use crate::retry::{CancelPhase, OperationKind};
use crate::types::Response;

/// Which signal on the governing [`RequestContext`](crate::RequestContext) fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Cancelled => write!(f, "context canceled"),
            CancelCause::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    /// The request never produced a response (connect, DNS, reset...).
    Transport(reqwest::Error),
    /// The API answered with a non-success status.
    Api { response: Response, message: String },
    /// This attempt's own deadline passed. Never retried.
    DeadlineExceeded { operation: OperationKind },
    /// The governing context fired independently of the attempt's own error.
    Cancelled {
        operation: OperationKind,
        phase: CancelPhase,
        cause: CancelCause,
        response: Option<Response>,
    },
    /// Every attempt failed with a retryable error.
    RetriesExhausted {
        operation: OperationKind,
        attempts: u8,
        last: Box<Error>,
    },
    /// The body could not be decoded; `response` is set when it came from the API.
    Decode {
        response: Option<Response>,
        source: serde_json::Error,
    },
    Io(std::io::Error),
    Config(String),
}

impl Error {
    /// Response descriptor associated with the failure, if one was received.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Api { response, .. } => Some(response),
            Error::Cancelled { response, .. } | Error::Decode { response, .. } => {
                response.as_ref()
            }
            Error::RetriesExhausted { last, .. } => last.response(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }

    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, Error::RetriesExhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Error::DeadlineExceeded { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "transport error: {}", err),
            Error::Api { response, message } => {
                write!(f, "API error: status={} message='{}'", response.status, message)
            }
            Error::DeadlineExceeded { operation } => {
                write!(f, "{}: attempt deadline exceeded", operation)
            }
            Error::Cancelled {
                operation,
                phase,
                cause,
                ..
            } => write!(f, "context error during {} ({}): {}", operation, phase, cause),
            Error::RetriesExhausted {
                operation,
                attempts,
                last,
            } => write!(
                f,
                "{} failed after {} retries: {}",
                operation, attempts, last
            ),
            Error::Decode { source, .. } => write!(f, "failed to decode body: {}", source),
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(err) => Some(err),
            Error::RetriesExhausted { last, .. } => Some(last.as_ref()),
            Error::Decode { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode {
            response: None,
            source: err,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err)
    }
}
