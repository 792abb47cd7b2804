//! Run configuration.
//!
//! A [`RunConfig`] is built once (usually from CLI arguments), validated, and
//! then shared read-only by every stage of the pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;

use crate::error::ReleaselocError;
use crate::Result;

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Default npm registry endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.com";
/// Default extraction directory.
pub const DEFAULT_OUTPUT_DIR: &str = "releases";
/// Releases requested per page from the hosting API.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Upper bound on pages requested while looking for the range boundaries.
pub const DEFAULT_MAX_PAGES: u32 = 50;
/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A GitHub repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    /// Owning user or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl Repository {
    /// Create a repository from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for Repository {
    type Err = ReleaselocError;

    /// Parse `owner/name`, tolerating a trailing `.git`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        if trimmed.matches('/').count() != 1 {
            return Err(ReleaselocError::InvalidRepository(s.to_string()));
        }
        match trimmed.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(ReleaselocError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Repository hosting the releases
    pub repository: Repository,
    /// Optional API token
    pub token: Option<String>,
    /// Base release tag
    pub from: String,
    /// Release tag to compare to
    pub to: String,
    /// Tags matching this pattern are left out of the analysis
    pub exclude: Option<Regex>,
    /// Directory the release archives are extracted to
    pub output_dir: PathBuf,
    /// Remove `output_dir` once every release is analyzed
    pub cleanup: bool,
    /// Hosting API base URL
    pub api_url: String,
    /// Package registry base URL
    pub registry_url: String,
    /// Releases requested per page
    pub page_size: u32,
    /// Maximum number of pages requested
    pub max_pages: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RunConfig {
    /// Create a config with defaults for everything but the required inputs.
    pub fn new(repository: Repository, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            repository,
            token: None,
            from: from.into(),
            to: to.into(),
            exclude: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cleanup: false,
            api_url: DEFAULT_API_URL.to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API token. Empty tokens are treated as absent.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the exclusion pattern. An empty pattern disables exclusion.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            self.exclude = None;
            return Ok(self);
        }
        let regex = Regex::new(pattern).map_err(|e| ReleaselocError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.exclude = Some(regex);
        Ok(self)
    }

    /// Set the extraction directory.
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Remove the extraction directory after the analysis.
    pub fn cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Override the hosting API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the registry base URL.
    pub fn registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the page size used when listing releases.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Set the page ceiling used when listing releases.
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages.max(1);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the inputs required to start a run.
    pub fn validate(&self) -> Result<()> {
        if self.repository.owner.is_empty()
            || self.repository.name.is_empty()
            || self.repository.owner.contains('/')
            || self.repository.name.contains('/')
        {
            return Err(ReleaselocError::InvalidRepository(
                self.repository.to_string(),
            ));
        }
        if self.from.trim().is_empty() {
            return Err(ReleaselocError::MissingTag("base"));
        }
        if self.to.trim().is_empty() {
            return Err(ReleaselocError::MissingTag("compared"));
        }
        Ok(())
    }

    /// Whether a tag is excluded from the analysis.
    pub fn is_excluded(&self, tag: &str) -> bool {
        self.exclude.as_ref().is_some_and(|re| re.is_match(tag))
    }

    /// Extraction directory for one release.
    pub fn release_dir(&self, tag: &str) -> PathBuf {
        self.output_dir.join(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository() {
        let repo: Repository = "acme/widget".parse().unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widget");
        assert_eq!(repo.to_string(), "acme/widget");
    }

    #[test]
    fn test_parse_repository_strips_git_suffix() {
        let repo: Repository = "sveltejs/kit.git".parse().unwrap();
        assert_eq!(repo, Repository::new("sveltejs", "kit"));
    }

    #[test]
    fn test_parse_repository_rejects_bad_formats() {
        for input in ["", "widget", "a/b/c", "/widget", "acme/", "https://github.com/a/b"] {
            let err = input.parse::<Repository>().unwrap_err();
            assert!(
                matches!(err, ReleaselocError::InvalidRepository(_)),
                "{input}"
            );
        }
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::new(Repository::new("acme", "widget"), "v1", "v2");
        assert_eq!(config.output_dir, PathBuf::from("releases"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.page_size, 100);
        assert!(!config.cleanup);
        assert!(config.token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_tags() {
        let repo = Repository::new("acme", "widget");
        let err = RunConfig::new(repo.clone(), "", "v2").validate().unwrap_err();
        assert!(matches!(err, ReleaselocError::MissingTag("base")));
        let err = RunConfig::new(repo, "v1", " ").validate().unwrap_err();
        assert!(matches!(err, ReleaselocError::MissingTag("compared")));
    }

    #[test]
    fn test_validate_rejects_hand_built_repository() {
        let config = RunConfig::new(Repository::new("acme/x", "widget"), "v1", "v2");
        assert!(matches!(
            config.validate(),
            Err(ReleaselocError::InvalidRepository(_))
        ));
    }

    #[test]
    fn test_exclude_pattern() {
        let config = RunConfig::new(Repository::new("acme", "widget"), "v1", "v2")
            .exclude("-next\\.")
            .unwrap();
        assert!(config.is_excluded("svelte@5.0.0-next.90"));
        assert!(!config.is_excluded("svelte@5.0.0"));

        let config = config.exclude("").unwrap();
        assert!(!config.is_excluded("svelte@5.0.0-next.90"));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let err = RunConfig::new(Repository::new("acme", "widget"), "v1", "v2")
            .exclude("(unclosed")
            .unwrap_err();
        assert!(matches!(err, ReleaselocError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_token_is_none() {
        let config = RunConfig::new(Repository::new("acme", "widget"), "v1", "v2")
            .token(Some(String::new()));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_url_trailing_slash_trimmed() {
        let config = RunConfig::new(Repository::new("acme", "widget"), "v1", "v2")
            .api_url("http://localhost:8080/")
            .registry_url("http://localhost:9090/");
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.registry_url, "http://localhost:9090");
    }
}
