//! Commit status and check run reads against the GitHub REST API, with
//! bounded, classified retries.
//!
//! Transport failures and 5xx responses are retried with deterministic
//! exponential backoff (`base_delay * 2^attempt`); every other failure, an
//! attempt's own timeout, and cancellation of the governing
//! [`RequestContext`] end the call immediately.

mod client;
pub mod config;
pub mod errors;
mod request_context;
pub mod retry;
pub mod telemetry;
pub mod types;

pub use client::{ChecksApi, GitHubClient, RestClient, RetryingClient};
pub use config::{Config, ConfigLocation};
pub use errors::{CancelCause, Error};
pub use request_context::RequestContext;
pub use tokio_util::sync::CancellationToken;
