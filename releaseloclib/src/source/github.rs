//! GitHub REST API client.
//!
//! Only two endpoints are used: the tag lookup
//! (`/repos/{owner}/{repo}/releases/tags/{tag}`) and the paginated release
//! listing (`/repos/{owner}/{repo}/releases`).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, Url};
use tracing::debug;

use crate::config::{Repository, RunConfig};
use crate::data::stats::Release;
use crate::error::ReleaselocError;
use crate::fetch::USER_AGENT_VALUE;
use crate::Result;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Read access to a repository's releases.
///
/// [`GitHubClient`] is the production implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Whether a release exists for `tag`.
    async fn release_exists(&self, repo: &Repository, tag: &str) -> Result<bool>;

    /// One page of releases, newest first. Pages start at 1.
    async fn list_releases(&self, repo: &Repository, page: u32, per_page: u32)
        -> Result<Vec<Release>>;
}

/// [`HostingApi`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: Url,
}

impl GitHubClient {
    /// Create a client from the run configuration.
    ///
    /// The token, when present, is sent as a bearer token on every request.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ReleaselocError::Network("token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ReleaselocError::Network(format!("failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&config.api_url).map_err(|e| {
            ReleaselocError::Network(format!("invalid API URL '{}': {e}", config.api_url))
        })?;

        Ok(Self { client, base_url })
    }

    /// `{base}/repos/{owner}/{name}/releases/{extra...}` with every segment
    /// percent-encoded.
    fn releases_url(&self, repo: &Repository, extra: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ReleaselocError::Network(format!("invalid API URL '{}'", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "releases"])
                .extend(extra);
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response> {
        debug!(url = %url, "GET");
        Ok(self.client.get(url).send().await?)
    }
}

/// Map a non-success status the same way for every endpoint.
fn status_error(url: &Url, response: &Response) -> ReleaselocError {
    match response.status().as_u16() {
        401 | 403 => ReleaselocError::AccessForbidden {
            url: url.to_string(),
        },
        _ => ReleaselocError::Http {
            url: url.to_string(),
            status: response.status().to_string(),
        },
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn release_exists(&self, repo: &Repository, tag: &str) -> Result<bool> {
        let url = self.releases_url(repo, &["tags", tag])?;
        let response = self.get(url.clone()).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            debug!(tag, "tag not found");
            return Ok(false);
        }
        Err(status_error(&url, &response))
    }

    async fn list_releases(
        &self,
        repo: &Repository,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Release>> {
        let mut url = self.releases_url(repo, &[])?;
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());

        let response = self.get(url.clone()).await?;
        if !response.status().is_success() {
            return Err(status_error(&url, &response));
        }

        response
            .json::<Vec<Release>>()
            .await
            .map_err(|e| ReleaselocError::InvalidResponse(format!("failed to parse releases: {e}")))
    }
}
