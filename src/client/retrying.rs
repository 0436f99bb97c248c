use crate::{
    client::{ChecksApi, RestClient},
    config::Config,
    errors::Error,
    request_context::RequestContext,
    retry::{OperationKind, RetryCoordinator, RetryPlan},
    types::{CombinedStatus, ListCheckRunsOptions, ListCheckRunsResults, ListOptions, Reply},
};

/// Wraps any [`ChecksApi`] and retries transient failures (no response, or a
/// 5xx) with exponential backoff. Every other failure is returned as is.
#[derive(Clone, Debug)]
pub struct RetryingClient<C> {
    inner: C,
    retry: RetryCoordinator,
}

impl<C: ChecksApi> RetryingClient<C> {
    pub fn new(inner: C, plan: RetryPlan) -> Self {
        Self {
            inner,
            retry: RetryCoordinator::new(plan),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn plan(&self) -> &RetryPlan {
        self.retry.plan()
    }
}

impl RetryingClient<RestClient> {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let plan = config.retry_plan()?;
        Ok(Self::new(RestClient::new(config)?, plan))
    }
}

impl<C: ChecksApi> ChecksApi for RetryingClient<C> {
    async fn get_combined_status(
        &self,
        ctx: &RequestContext,
        owner: &str,
        repo: &str,
        reference: &str,
        opts: &ListOptions,
    ) -> Result<Reply<CombinedStatus>, Error> {
        let inner = &self.inner;
        self.retry
            .execute(ctx, OperationKind::GetCombinedStatus, move || {
                inner.get_combined_status(ctx, owner, repo, reference, opts)
            })
            .await
    }

    async fn list_check_runs_for_ref(
        &self,
        ctx: &RequestContext,
        owner: &str,
        repo: &str,
        reference: &str,
        opts: &ListCheckRunsOptions,
    ) -> Result<Reply<ListCheckRunsResults>, Error> {
        let inner = &self.inner;
        self.retry
            .execute(ctx, OperationKind::ListCheckRunsForRef, move || {
                inner.list_check_runs_for_ref(ctx, owner, repo, reference, opts)
            })
            .await
    }
}
