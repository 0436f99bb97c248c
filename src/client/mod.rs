use std::future::Future;

use reqwest::Client;

use crate::errors::Error;
use crate::request_context::RequestContext;
use crate::types::{CombinedStatus, ListCheckRunsOptions, ListCheckRunsResults, ListOptions, Reply};

mod impls;
mod retrying;

pub use retrying::RetryingClient;

/// The commit status and check run reads the client exposes. Implemented by
/// the raw [`RestClient`] and by the [`RetryingClient`] decorator with the
/// same signatures, so retrying stays transparent to callers.
pub trait ChecksApi: Send + Sync {
    fn get_combined_status(
        &self,
        ctx: &RequestContext,
        owner: &str,
        repo: &str,
        reference: &str,
        opts: &ListOptions,
    ) -> impl Future<Output = Result<Reply<CombinedStatus>, Error>> + Send;

    fn list_check_runs_for_ref(
        &self,
        ctx: &RequestContext,
        owner: &str,
        repo: &str,
        reference: &str,
        opts: &ListCheckRunsOptions,
    ) -> impl Future<Output = Result<Reply<ListCheckRunsResults>, Error>> + Send;
}

/// Single-attempt GitHub REST client.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: Client,
    base_url: String,
    token: String,
}

/// Retrying client over the REST API, as built by [`RetryingClient::from_config`].
pub type GitHubClient = RetryingClient<RestClient>;
