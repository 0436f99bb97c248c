use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;
use urlencoding::encode;

use crate::{
    client::{ChecksApi, RestClient},
    config::Config,
    errors::{CancelCause, Error},
    request_context::RequestContext,
    retry::{CancelPhase, OperationKind},
    types::{CombinedStatus, ListCheckRunsOptions, ListCheckRunsResults, ListOptions, Reply, Response},
};

const DEFAULT_USER_AGENT: &str = "github-checks-rust/0.1.0";
const API_VERSION: &str = "2022-11-28";

impl RestClient {
    /// Build a client from `config`. The URL is validated before any network call.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let base_url = config.base_url()?;
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http_client(http, base_url, config.token.clone()))
    }

    pub fn with_http_client(
        http: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        operation: OperationKind,
        path: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<Reply<T>, Error> {
        let url = format!("{}{}", self.base_url, path);
        debug!(operation = %operation, url = %url, "github.request");

        let request = self.http.get(&url).query(&query).bearer_auth(&self.token);

        // The in-flight request is dropped as soon as the context fires.
        let resp = tokio::select! {
            res = request.send() => res.map_err(|e| request_error(e, operation))?,
            cause = ctx.done() => return Err(cancelled(operation, cause, None)),
        };
        let response = Response::from_headers(resp.status(), resp.headers());

        // Headers have arrived; keep them if the body read is cut short.
        let body = tokio::select! {
            res = resp.text() => res.map_err(|e| request_error(e, operation))?,
            cause = ctx.done() => return Err(cancelled(operation, cause, Some(response))),
        };

        if !response.status.is_success() {
            debug!(
                operation = %operation,
                status = response.status.as_u16(),
                "github.request.failed"
            );
            let message = api_message(&body, &response);
            return Err(Error::Api { response, message });
        }

        match serde_json::from_str(&body) {
            Ok(body) => Ok(Reply { body, response }),
            Err(source) => Err(Error::Decode {
                response: Some(response),
                source,
            }),
        }
    }
}

impl ChecksApi for RestClient {
    async fn get_combined_status(
        &self,
        ctx: &RequestContext,
        owner: &str,
        repo: &str,
        reference: &str,
        opts: &ListOptions,
    ) -> Result<Reply<CombinedStatus>, Error> {
        self.get_json(
            ctx,
            OperationKind::GetCombinedStatus,
            commit_path(owner, repo, reference, "status"),
            opts.query(),
        )
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
        self.get_json(
            ctx,
            OperationKind::ListCheckRunsForRef,
            commit_path(owner, repo, reference, "check-runs"),
            opts.query(),
        )
        .await
    }
}

fn commit_path(owner: &str, repo: &str, reference: &str, tail: &str) -> String {
    format!(
        "/repos/{}/{}/commits/{}/{}",
        encode(owner),
        encode(repo),
        encode(reference),
        tail
    )
}

fn cancelled(operation: OperationKind, cause: CancelCause, response: Option<Response>) -> Error {
    Error::Cancelled {
        operation,
        phase: CancelPhase::DuringAttempt,
        cause,
        response,
    }
}

// A client-side timeout is this attempt's own deadline; anything else is transport.
fn request_error(err: reqwest::Error, operation: OperationKind) -> Error {
    if err.is_timeout() {
        Error::DeadlineExceeded { operation }
    } else {
        Error::Transport(err)
    }
}

fn api_message(body: &str, response: &Response) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(msg) = value.get("message").and_then(|m| m.as_str())
    {
        return msg.to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        response
            .status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn refs_with_slashes_are_encoded() {
        assert_eq!(
            commit_path("octo", "repo", "feature/x", "status"),
            "/repos/octo/repo/commits/feature%2Fx/status"
        );
    }

    #[test]
    fn message_prefers_github_error_body() {
        let resp = Response::new(StatusCode::NOT_FOUND);
        assert_eq!(
            api_message(r#"{"message":"Not Found","documentation_url":"x"}"#, &resp),
            "Not Found"
        );
        assert_eq!(api_message("  ", &resp), "Not Found");
        assert_eq!(api_message("boom", &resp), "boom");
    }
}
