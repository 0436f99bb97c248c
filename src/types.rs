use jiff::Timestamp;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CombinedStatus {
    pub state: Option<String>,
    pub sha: Option<String>,
    pub total_count: Option<u32>,
    pub statuses: Vec<RepoStatus>,
    pub commit_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepoStatus {
    pub id: Option<u64>,
    pub state: Option<String>,
    pub context: Option<String>,
    pub description: Option<String>,
    pub target_url: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListCheckRunsResults {
    pub total_count: Option<u32>,
    pub check_runs: Vec<CheckRun>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckRun {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub head_sha: Option<String>,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub external_id: Option<String>,
    pub html_url: Option<String>,
    pub details_url: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Pagination shared by list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListOptions {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListCheckRunsOptions {
    pub check_name: Option<String>,
    /// `queued`, `in_progress` or `completed`.
    pub status: Option<String>,
    /// `latest` or `all`.
    pub filter: Option<String>,
    pub app_id: Option<u64>,
    pub list: ListOptions,
}

impl ListCheckRunsOptions {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(name) = &self.check_name {
            query.push(("check_name", name.clone()));
        }
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        if let Some(filter) = &self.filter {
            query.push(("filter", filter.clone()));
        }
        if let Some(app_id) = self.app_id {
            query.push(("app_id", app_id.to_string()));
        }
        query.extend(self.list.query());
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub limit: u32,
    pub remaining: u32,
    pub reset: Timestamp,
}

/// What the remote API told us besides the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub rate: Option<Rate>,
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            rate: None,
            next_page: None,
            last_page: None,
        }
    }

    pub fn from_headers(status: StatusCode, headers: &HeaderMap) -> Self {
        let mut response = Self::new(status);
        response.rate = parse_rate(headers);
        if let Some(link) = headers.get("link").and_then(|h| h.to_str().ok()) {
            response.next_page = link_page(link, "next");
            response.last_page = link_page(link, "last");
        }
        response
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

/// A decoded body together with its response descriptor.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub body: T,
    pub response: Response,
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn parse_rate(headers: &HeaderMap) -> Option<Rate> {
    let limit = header_value(headers, "x-ratelimit-limit")?;
    let remaining = header_value(headers, "x-ratelimit-remaining")?;
    let reset: i64 = header_value(headers, "x-ratelimit-reset")?;
    Some(Rate {
        limit,
        remaining,
        reset: Timestamp::from_second(reset).ok()?,
    })
}

// Link: <https://api.github.com/...?page=2>; rel="next", <...?page=5>; rel="last"
fn link_page(link: &str, rel: &str) -> Option<u32> {
    let wanted = format!("rel=\"{}\"", rel);
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        if !pieces.any(|p| p.trim() == wanted) {
            return None;
        }
        let url = reqwest::Url::parse(target.trim_start_matches('<').trim_end_matches('>')).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn parses_rate_and_pagination_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("5000"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4999"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
        headers.insert(
            "link",
            HeaderValue::from_static(
                "<https://api.github.com/repos/o/r/commits/main/status?page=2&per_page=10>; rel=\"next\", \
                 <https://api.github.com/repos/o/r/commits/main/status?page=7&per_page=10>; rel=\"last\"",
            ),
        );

        let resp = Response::from_headers(StatusCode::OK, &headers);
        let rate = resp.rate.expect("rate parsed");
        assert_eq!(rate.limit, 5000);
        assert_eq!(rate.remaining, 4999);
        assert_eq!(rate.reset.as_second(), 1_700_000_000);
        assert_eq!(resp.next_page, Some(2));
        assert_eq!(resp.last_page, Some(7));
    }

    #[test]
    fn partial_rate_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        let resp = Response::from_headers(StatusCode::FORBIDDEN, &headers);
        assert!(resp.rate.is_none());
        assert!(resp.next_page.is_none());
    }

    #[test]
    fn check_run_options_build_query() {
        let opts = ListCheckRunsOptions {
            check_name: Some("build".into()),
            filter: Some("latest".into()),
            list: ListOptions {
                page: Some(3),
                per_page: None,
            },
            ..Default::default()
        };
        assert_eq!(
            opts.query(),
            vec![
                ("check_name", "build".to_string()),
                ("filter", "latest".to_string()),
                ("page", "3".to_string()),
            ]
        );
    }
}
