//! Release range resolution.
//!
//! Releases are listed newest first, one page at a time, until both boundary
//! tags have been seen. The collected releases are then ordered by creation
//! time and cut down to the inclusive range between the two boundaries.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::data::stats::Release;
use crate::Result;

use super::github::HostingApi;

/// Fetch the releases between `config.from` and `config.to`, oldest first.
///
/// The boundaries may be given in either order. Tags matching the exclusion
/// pattern are left out of the result, boundaries included; they still
/// delimit the range.
///
/// Returns an empty vector when a boundary is never seen within
/// `config.max_pages` pages.
pub async fn fetch_release_range(api: &dyn HostingApi, config: &RunConfig) -> Result<Vec<Release>> {
    let mut collected: Vec<Release> = Vec::new();
    let mut seen_tags: HashSet<String> = HashSet::new();
    let mut seen_from = false;
    let mut seen_to = false;

    for page in 1..=config.max_pages {
        let releases = api
            .list_releases(&config.repository, page, config.page_size)
            .await?;
        let count = releases.len();
        debug!(page, count, "fetched release page");

        for release in releases {
            // Offset paging repeats items when a release lands between requests
            if !seen_tags.insert(release.tag.clone()) {
                debug!(tag = %release.tag, "repeated release skipped");
                continue;
            }
            seen_from |= release.tag == config.from;
            seen_to |= release.tag == config.to;
            collected.push(release);
        }

        if seen_from && seen_to {
            break;
        }
        if count < config.page_size as usize {
            break;
        }
        if page == config.max_pages {
            warn!(pages = page, "page limit reached before both tags were found");
        }
    }

    if !(seen_from && seen_to) {
        warn!(
            from = %config.from,
            to = %config.to,
            seen_from,
            seen_to,
            "release range boundaries not found"
        );
        return Ok(Vec::new());
    }

    Ok(select_range(collected, config))
}

/// Sort by creation time and keep the inclusive span between the boundaries.
fn select_range(mut releases: Vec<Release>, config: &RunConfig) -> Vec<Release> {
    releases.sort_by_key(|r| r.created_at);

    let mut range = Vec::new();
    let mut inside = false;
    let mut closing: Option<&str> = None;

    for release in releases {
        if !inside {
            if release.tag == config.from {
                closing = Some(config.to.as_str());
            } else if release.tag == config.to {
                closing = Some(config.from.as_str());
            } else {
                continue;
            }
            inside = true;
            let single = closing == Some(release.tag.as_str());
            if !config.is_excluded(&release.tag) {
                range.push(release);
            }
            if single {
                break;
            }
            continue;
        }

        let last = closing == Some(release.tag.as_str());
        if !config.is_excluded(&release.tag) {
            range.push(release);
        }
        if last {
            break;
        }
    }

    range
}
