//! The comparison run: tag checks, range resolution, downloads, analysis.
//!
//! - **Controller**: state machine deciding what happens next
//! - **Events/Effects**: typed messages between the controller and workers
//! - **Pipeline**: async driver that carries out effects concurrently
//!
//! ## Example
//!
//! ```rust,no_run
//! use releaseloclib::{Pipeline, Repository, RunConfig};
//!
//! # async fn run() -> releaseloclib::Result<()> {
//! let repo: Repository = "sveltejs/svelte".parse()?;
//! let config = RunConfig::new(repo, "svelte@4.0.0", "svelte@4.2.0");
//!
//! let report = Pipeline::from_config(config)?
//!     .run(|controller| println!("{:?}", controller.stage()))
//!     .await?;
//! println!("{} releases", report.len());
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod event;
pub mod runner;

pub use controller::{Controller, Progress, Stage};
pub use event::{Effect, Event};
pub use runner::Pipeline;
