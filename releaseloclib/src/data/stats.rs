//! Core data structures for release statistics.
//!
//! - **Release**: one tagged release as reported by the hosting API
//! - **AnalysisResult**: line/file/size totals for one extracted release
//!
//! Language buckets are keyed by the label from the extension table in
//! [`crate::data::analyzer`]; files with an unknown extension land in
//! [`OTHER_LANGUAGE`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetch::package::PackageCoordinates;

/// Bucket for files whose extension is not in the language table.
pub const OTHER_LANGUAGE: &str = "Other";

/// A tagged release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Tag the release points at (unique within a repository)
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Human readable title, if any
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the release is flagged as a prerelease
    #[serde(default)]
    pub prerelease: bool,
}

impl Release {
    /// Create a release with just a tag and timestamp.
    pub fn new(tag: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            tag: tag.into(),
            created_at,
            name: None,
            prerelease: false,
        }
    }

    /// Registry coordinates derived from the tag.
    pub fn package(&self) -> PackageCoordinates {
        PackageCoordinates::from_tag(&self.tag)
    }
}

/// Statistics for one analyzed release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Release tag
    pub tag: String,
    /// Newline count across all files
    pub total_lines: u64,
    /// Number of regular files
    pub total_files: u64,
    /// Sum of file sizes on disk, in bytes
    pub total_size: u64,
    /// Size of the compressed archive, 0 when not measured (cache hit)
    pub tarball_size: u64,
    /// Lines per language label
    pub lines_by_language: HashMap<String, u64>,
}

impl AnalysisResult {
    /// Create an empty result for a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Record one file.
    ///
    /// `language` is `None` for files without an extension: they count
    /// towards the totals but not towards any bucket.
    pub fn add_file(&mut self, lines: u64, size: u64, language: Option<&str>) {
        self.total_lines += lines;
        self.total_files += 1;
        self.total_size += size;
        if let Some(language) = language {
            *self
                .lines_by_language
                .entry(language.to_string())
                .or_default() += lines;
        }
    }

    /// Lines attributed to a language (0 if absent).
    pub fn lines_for(&self, language: &str) -> u64 {
        self.lines_by_language.get(language).copied().unwrap_or(0)
    }

    /// Languages sorted by line count, largest first.
    ///
    /// Only the `visible` largest buckets are returned by name; the rest are
    /// folded into a trailing `"N other languages"` entry.
    pub fn top_languages(&self, visible: usize) -> Vec<(String, u64)> {
        let mut sorted: Vec<(String, u64)> = self
            .lines_by_language
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        // Name as tie breaker keeps output deterministic
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        if sorted.len() > visible {
            let rest = sorted.split_off(visible);
            let folded: u64 = rest.iter().map(|(_, v)| v).sum();
            sorted.push((format!("{} other languages", rest.len()), folded));
        }
        sorted
    }
}
