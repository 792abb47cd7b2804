//! Messages exchanged between the controller and its workers.

use std::path::PathBuf;

use crate::data::stats::{AnalysisResult, Release};
use crate::error::ReleaselocError;
use crate::fetch::Download;

/// Completion of a unit of work, fed to [`Controller::handle`].
///
/// [`Controller::handle`]: super::Controller::handle
#[derive(Debug)]
pub enum Event {
    /// A tag existence check finished
    TagChecked { tag: String, exists: bool },
    /// The release range is known
    ReleasesFetched(Vec<Release>),
    /// One release is extracted on disk
    Downloaded(Download),
    /// One release is analyzed
    Analyzed(AnalysisResult),
    /// The extraction directory was removed
    CleanedUp,
    /// Any worker failed
    Failed(ReleaselocError),
}

/// Work requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Check that a release exists for the tag
    CheckTag(String),
    /// Resolve the release range
    FetchReleases,
    /// Download and extract one release
    Download(String),
    /// Analyze one extracted release
    Analyze(String),
    /// Remove the extraction directory
    Cleanup(PathBuf),
}

impl Event {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TagChecked { .. } => "TagChecked",
            Self::ReleasesFetched(_) => "ReleasesFetched",
            Self::Downloaded(_) => "Downloaded",
            Self::Analyzed(_) => "Analyzed",
            Self::CleanedUp => "CleanedUp",
            Self::Failed(_) => "Failed",
        }
    }
}
