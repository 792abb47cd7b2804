//! Async driver for the [`Controller`].
//!
//! Effects are spawned as tasks on a [`JoinSet`]; each task reports back by
//! sending exactly one [`Event`] on an unbounded channel. The loop below is
//! the only place the controller is mutated.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::data::analyzer::analyze_release;
use crate::error::ReleaselocError;
use crate::fetch::ReleaseDownloader;
use crate::output::Report;
use crate::source::{fetch_release_range, GitHubClient, HostingApi};
use crate::Result;

use super::controller::Controller;
use super::event::{Effect, Event};

/// One comparison run: configuration plus the collaborators doing I/O.
pub struct Pipeline {
    config: Arc<RunConfig>,
    api: Arc<dyn HostingApi>,
    downloader: ReleaseDownloader,
}

impl Pipeline {
    pub fn new(config: RunConfig, api: Arc<dyn HostingApi>, downloader: ReleaseDownloader) -> Self {
        Self {
            config: Arc::new(config),
            api,
            downloader,
        }
    }

    /// Build a pipeline talking to the GitHub API and the npm registry
    /// configured in `config`.
    pub fn from_config(config: RunConfig) -> Result<Self> {
        let api = GitHubClient::new(&config)?;
        let downloader = ReleaseDownloader::from_config(&config)?;
        Ok(Self::new(config, Arc::new(api), downloader))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run to completion.
    ///
    /// `observer` is called once after start and after every handled event,
    /// with the controller in its new state. Work still in flight when the
    /// run ends is aborted.
    pub async fn run<F>(self, mut observer: F) -> Result<Report>
    where
        F: FnMut(&Controller),
    {
        let mut controller = Controller::new(Arc::clone(&self.config));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        let effects = controller.start();
        observer(&controller);
        self.spawn_all(effects, &tx, &mut tasks);

        while !controller.is_terminal() {
            let event = match next_event(&mut rx, &mut tasks).await {
                Some(event) => event,
                None => continue,
            };
            debug!(event = event.name(), "handling event");

            let effects = controller.handle(event);
            observer(&controller);
            self.spawn_all(effects, &tx, &mut tasks);
        }

        if !tasks.is_empty() {
            debug!(pending = tasks.len(), "aborting in-flight work");
            tasks.abort_all();
        }

        controller.into_result()
    }

    fn spawn_all(
        &self,
        effects: Vec<Effect>,
        tx: &UnboundedSender<Event>,
        tasks: &mut JoinSet<()>,
    ) {
        for effect in effects {
            self.spawn(effect, tx.clone(), tasks);
        }
    }

    fn spawn(&self, effect: Effect, tx: UnboundedSender<Event>, tasks: &mut JoinSet<()>) {
        debug!(?effect, "spawning");
        match effect {
            Effect::CheckTag(tag) => {
                let api = Arc::clone(&self.api);
                let config = Arc::clone(&self.config);
                tasks.spawn(async move {
                    let event = match api.release_exists(&config.repository, &tag).await {
                        Ok(exists) => Event::TagChecked { tag, exists },
                        Err(err) => Event::Failed(err),
                    };
                    send(&tx, event);
                });
            }
            Effect::FetchReleases => {
                let api = Arc::clone(&self.api);
                let config = Arc::clone(&self.config);
                tasks.spawn(async move {
                    let event = match fetch_release_range(api.as_ref(), &config).await {
                        Ok(releases) => Event::ReleasesFetched(releases),
                        Err(err) => Event::Failed(err),
                    };
                    send(&tx, event);
                });
            }
            Effect::Download(tag) => {
                let downloader = self.downloader.clone();
                let config = Arc::clone(&self.config);
                tasks.spawn(async move {
                    let event = match downloader.download(&tag, &config.output_dir).await {
                        Ok(download) => Event::Downloaded(download),
                        Err(err) => Event::Failed(err),
                    };
                    send(&tx, event);
                });
            }
            Effect::Analyze(tag) => {
                let root = self.config.output_dir.clone();
                tasks.spawn_blocking(move || {
                    let event = match analyze_release(&root, &tag) {
                        Ok(result) => Event::Analyzed(result),
                        Err(err) => Event::Failed(err),
                    };
                    send(&tx, event);
                });
            }
            Effect::Cleanup(path) => {
                tasks.spawn_blocking(move || {
                    send(&tx, remove_output_dir(path));
                });
            }
        }
    }
}

/// Wait for the next event.
///
/// Pending events are drained before task completions are looked at, so a
/// task's event is always seen before its completion. `None` means a task
/// finished normally and there is nothing to handle yet.
async fn next_event(
    rx: &mut UnboundedReceiver<Event>,
    tasks: &mut JoinSet<()>,
) -> Option<Event> {
    tokio::select! {
        biased;
        Some(event) = rx.recv() => Some(event),
        joined = tasks.join_next() => match joined {
            Some(Ok(())) => None,
            Some(Err(err)) => Some(Event::Failed(join_failure(err))),
            // Nothing queued and nothing running: no event can arrive anymore
            None => Some(Event::Failed(ReleaselocError::Internal(
                "pipeline stalled with no pending work".to_string(),
            ))),
        },
    }
}

fn join_failure(err: JoinError) -> ReleaselocError {
    if err.is_panic() {
        ReleaselocError::Internal(format!("worker panicked: {err}"))
    } else {
        ReleaselocError::Internal(format!("worker cancelled: {err}"))
    }
}

fn send(tx: &UnboundedSender<Event>, event: Event) {
    // The receiver is gone once the run has ended; late results are dropped
    if tx.send(event).is_err() {
        debug!("run already finished, event dropped");
    }
}

fn remove_output_dir(path: PathBuf) -> Event {
    match std::fs::remove_dir_all(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "extraction directory removed");
            Event::CleanedUp
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "extraction directory already gone");
            Event::CleanedUp
        }
        Err(source) => Event::Failed(ReleaselocError::Cleanup { path, source }),
    }
}
