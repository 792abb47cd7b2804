//! Hosting side: find the releases to compare.
//!
//! - **Existence check**: confirm a tag has a release ([`HostingApi::release_exists`])
//! - **Range resolution**: list releases and cut out the requested range
//!   ([`fetch_release_range`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use releaseloclib::source::{fetch_release_range, GitHubClient};
//!
//! let api = GitHubClient::new(&config)?;
//! let releases = fetch_release_range(&api, &config).await?;
//! ```

pub mod github;
pub mod range;

pub use github::{GitHubClient, HostingApi};
pub use range::fetch_release_range;
