//! Run state machine.
//!
//! The controller never performs I/O. [`Controller::start`] and
//! [`Controller::handle`] update its state and return the [`Effect`]s the
//! caller has to carry out; the outcome of each effect comes back as an
//! [`Event`].
//!
//! ```text
//! Init -> Checking -> Fetching -> DownloadExtract -> Analyzing -> Summary
//!   \________\___________\______________\_______________\-------> Error
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::RunConfig;
use crate::data::stats::{AnalysisResult, Release};
use crate::error::ReleaselocError;
use crate::fetch::Download;
use crate::output::Report;
use crate::Result;

use super::event::{Effect, Event};

/// Position of a run in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Checking,
    Fetching,
    DownloadExtract,
    Analyzing,
    Summary,
    Error,
}

/// Progress counters, updated as completion events are handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// Tags confirmed to exist (0 to 2)
    pub tags_confirmed: usize,
    /// Releases in the range
    pub releases: usize,
    /// Releases downloaded or found in the cache
    pub downloaded: usize,
    /// Downloads skipped because the release was already extracted
    pub cache_hits: usize,
    /// Releases analyzed
    pub analyzed: usize,
}

/// State of one run.
#[derive(Debug)]
pub struct Controller {
    config: Arc<RunConfig>,
    stage: Stage,
    progress: Progress,
    pending_checks: Vec<String>,
    releases: Vec<Release>,
    archive_sizes: HashMap<String, Option<u64>>,
    slots: Vec<Option<AnalysisResult>>,
    awaiting_cleanup: bool,
    report: Option<Report>,
    error: Option<ReleaselocError>,
}

impl Controller {
    pub fn new(config: Arc<RunConfig>) -> Self {
        Self {
            config,
            stage: Stage::Init,
            progress: Progress::default(),
            pending_checks: Vec::new(),
            releases: Vec::new(),
            archive_sizes: HashMap::new(),
            slots: Vec::new(),
            awaiting_cleanup: false,
            report: None,
            error: None,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Releases in the range, oldest first. Empty until fetched.
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// The final report, once in [`Stage::Summary`].
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// The error that ended the run, once in [`Stage::Error`].
    pub fn error(&self) -> Option<&ReleaselocError> {
        self.error.as_ref()
    }

    /// Whether the extraction directory is being removed.
    pub fn is_cleaning_up(&self) -> bool {
        self.awaiting_cleanup
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.stage, Stage::Summary | Stage::Error)
    }

    /// Consume the controller, yielding the report or the error that ended
    /// the run.
    pub fn into_result(self) -> Result<Report> {
        match (self.stage, self.report, self.error) {
            (Stage::Summary, Some(report), _) => Ok(report),
            (_, _, Some(error)) => Err(error),
            (stage, _, _) => Err(ReleaselocError::Internal(format!(
                "run stopped before completion ({stage:?})"
            ))),
        }
    }

    /// Validate the configuration and request both tag checks.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.stage != Stage::Init {
            debug!(stage = ?self.stage, "start ignored");
            return Vec::new();
        }
        if let Err(err) = self.config.validate() {
            self.fail(err);
            return Vec::new();
        }

        self.stage = Stage::Checking;
        self.pending_checks = vec![self.config.from.clone(), self.config.to.clone()];
        self.pending_checks
            .iter()
            .cloned()
            .map(Effect::CheckTag)
            .collect()
    }

    /// Apply one event. Returns the effects it triggers.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        if self.is_terminal() {
            debug!(event = event.name(), stage = ?self.stage, "event after end of run ignored");
            return Vec::new();
        }

        match (self.stage, event) {
            (_, Event::Failed(err)) => {
                self.fail(err);
                Vec::new()
            }
            (Stage::Checking, Event::TagChecked { tag, exists }) => self.on_tag_checked(tag, exists),
            (Stage::Fetching, Event::ReleasesFetched(releases)) => self.on_releases(releases),
            (Stage::DownloadExtract, Event::Downloaded(download)) => self.on_downloaded(download),
            (Stage::Analyzing, Event::Analyzed(result)) => self.on_analyzed(result),
            (Stage::Analyzing, Event::CleanedUp) if self.awaiting_cleanup => {
                self.awaiting_cleanup = false;
                self.finish();
                Vec::new()
            }
            (stage, event) => {
                debug!(event = event.name(), ?stage, "out of stage event ignored");
                Vec::new()
            }
        }
    }

    fn on_tag_checked(&mut self, tag: String, exists: bool) -> Vec<Effect> {
        let Some(pos) = self.pending_checks.iter().position(|t| *t == tag) else {
            debug!(tag = %tag, "unexpected tag check ignored");
            return Vec::new();
        };

        if !exists {
            self.fail(ReleaselocError::TagNotFound {
                tag,
                repository: self.config.repository.to_string(),
            });
            return Vec::new();
        }

        self.pending_checks.swap_remove(pos);
        self.progress.tags_confirmed += 1;

        if !self.pending_checks.is_empty() {
            return Vec::new();
        }
        self.stage = Stage::Fetching;
        vec![Effect::FetchReleases]
    }

    fn on_releases(&mut self, mut releases: Vec<Release>) -> Vec<Effect> {
        // One slot and one download per tag
        let mut seen = HashSet::new();
        releases.retain(|r| seen.insert(r.tag.clone()));

        if releases.is_empty() {
            self.fail(ReleaselocError::NoReleases);
            return Vec::new();
        }

        info!(count = releases.len(), "release range resolved");
        self.stage = Stage::DownloadExtract;
        self.progress.releases = releases.len();
        self.slots = vec![None; releases.len()];
        self.releases = releases;

        self.releases
            .iter()
            .map(|r| Effect::Download(r.tag.clone()))
            .collect()
    }

    fn on_downloaded(&mut self, download: Download) -> Vec<Effect> {
        if !self.releases.iter().any(|r| r.tag == download.tag) {
            debug!(tag = %download.tag, "download of unknown release ignored");
            return Vec::new();
        }
        if self.archive_sizes.contains_key(&download.tag) {
            debug!(tag = %download.tag, "duplicate download ignored");
            return Vec::new();
        }

        self.progress.downloaded += 1;
        if download.cached {
            self.progress.cache_hits += 1;
        }
        self.archive_sizes
            .insert(download.tag, download.tarball_size);

        if self.progress.downloaded < self.releases.len() {
            return Vec::new();
        }

        self.stage = Stage::Analyzing;
        self.releases
            .iter()
            .map(|r| Effect::Analyze(r.tag.clone()))
            .collect()
    }

    fn on_analyzed(&mut self, mut result: AnalysisResult) -> Vec<Effect> {
        let Some(index) = self.releases.iter().position(|r| r.tag == result.tag) else {
            debug!(tag = %result.tag, "analysis of unknown release ignored");
            return Vec::new();
        };
        if self.slots[index].is_some() {
            debug!(tag = %result.tag, "duplicate analysis ignored");
            return Vec::new();
        }

        result.tarball_size = self
            .archive_sizes
            .get(&result.tag)
            .copied()
            .flatten()
            .unwrap_or(0);
        self.slots[index] = Some(result);
        self.progress.analyzed += 1;

        if self.slots.iter().any(Option::is_none) {
            return Vec::new();
        }

        if self.config.cleanup {
            self.awaiting_cleanup = true;
            return vec![Effect::Cleanup(self.config.output_dir.clone())];
        }
        self.finish();
        Vec::new()
    }

    fn finish(&mut self) {
        let entries: Vec<AnalysisResult> = self.slots.iter_mut().filter_map(Option::take).collect();
        info!(releases = entries.len(), "analysis complete");
        self.report = Some(Report::new(entries));
        self.stage = Stage::Summary;
    }

    fn fail(&mut self, err: ReleaselocError) {
        debug!(stage = ?self.stage, error = %err, "run failed");
        self.error = Some(err);
        self.stage = Stage::Error;
    }
}
