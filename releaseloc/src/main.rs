//! # releaseloc
//!
//! Compare lines of code across every npm release between two GitHub tags.
//!
//! ## Overview
//!
//! releaseloc is built on top of releaseloclib. It checks both tags, lists the
//! releases between them, downloads each release's npm tarball, and prints how
//! the package grew or shrank from one release to the next.
//!
//! ## Usage
//!
//! ```bash
//! # Compare two releases of a package
//! releaseloc --repo sveltejs/svelte --from svelte@4.0.0 --to svelte@4.2.0
//!
//! # Skip prereleases and remove the downloaded releases afterwards
//! releaseloc --repo sveltejs/kit \
//!     --from @sveltejs/kit@1.0.0 --to @sveltejs/kit@2.0.0 \
//!     --ignore '-next\.' --remove
//!
//! # Output as JSON
//! releaseloc --repo acme/widget --from v1.0.0 --to v1.2.0 --format json
//! ```
//!
//! A token can be passed with `--token` or the `GITHUB_TOKEN` environment
//! variable. Releases are extracted under `--output` (default `releases/`)
//! and reused by later runs.

mod render;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use releaseloclib::config::{
    DEFAULT_API_URL, DEFAULT_MAX_PAGES, DEFAULT_OUTPUT_DIR, DEFAULT_REGISTRY_URL,
};
use releaseloclib::{Pipeline, ReleaselocError, Repository, RunConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use render::{render_json, render_text, status_line, Format};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("releaseloc")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Compare lines of code across the npm releases between two GitHub tags")
        .arg(
            Arg::new("repo")
                .short('r')
                .long("repo")
                .env("RELEASELOC_REPO")
                .required(true)
                .help("GitHub repository (owner/repo)"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .env("GITHUB_TOKEN")
                .hide_env_values(true)
                .help("GitHub token, raises the API rate limit"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .required(true)
                .help("Base release tag"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .required(true)
                .help("Release tag to compare to"),
        )
        .arg(
            Arg::new("ignore")
                .short('i')
                .long("ignore")
                .help("Skip releases whose tag matches this regular expression"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .default_value(DEFAULT_OUTPUT_DIR)
                .help("Directory the releases are extracted to"),
        )
        .arg(
            Arg::new("remove")
                .long("remove")
                .action(ArgAction::SetTrue)
                .help("Remove the output directory once the analysis is done"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .default_value(DEFAULT_API_URL)
                .help("GitHub API base URL"),
        )
        .arg(
            Arg::new("registry-url")
                .long("registry-url")
                .default_value(DEFAULT_REGISTRY_URL)
                .help("npm registry base URL"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("30")
                .help("Per-request timeout in seconds"),
        )
        .arg(
            Arg::new("max-pages")
                .long("max-pages")
                .value_parser(value_parser!(u32).range(1..))
                .default_value("50")
                .help("Maximum number of release pages to request"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log progress to stderr (-v info, -vv debug, -vvv trace)"),
        )
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("releaseloc={level},releaseloclib={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build the run configuration from matches
fn build_config(matches: &ArgMatches) -> Result<RunConfig, ReleaselocError> {
    let arg = |name: &str| {
        matches
            .get_one::<String>(name)
            .map(String::as_str)
            .unwrap_or_default()
    };

    let repository: Repository = arg("repo").parse()?;
    let timeout = matches.get_one::<u64>("timeout").copied().unwrap_or(30);
    let max_pages = matches
        .get_one::<u32>("max-pages")
        .copied()
        .unwrap_or(DEFAULT_MAX_PAGES);

    let config = RunConfig::new(repository, arg("from"), arg("to"))
        .token(matches.get_one::<String>("token").cloned())
        .exclude(arg("ignore"))?
        .output_dir(arg("output"))
        .cleanup(matches.get_flag("remove"))
        .api_url(arg("api-url"))
        .registry_url(arg("registry-url"))
        .timeout(Duration::from_secs(timeout))
        .max_pages(max_pages);

    config.validate()?;
    Ok(config)
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("  {spinner} {msg}") {
        spinner.set_style(template);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = build_config(matches)?;
    let format = Format::from_arg(
        matches
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text"),
    );
    let repository = config.repository.to_string();
    let output_dir = config.output_dir.clone();
    let cleanup = config.cleanup;

    info!(repository = %repository, from = %config.from, to = %config.to, "starting comparison");

    let spinner = spinner();
    let result = Pipeline::from_config(config)?
        .run(|controller| match status_line(controller) {
            Some(message) => spinner.set_message(message),
            None => spinner.finish_and_clear(),
        })
        .await;
    spinner.finish_and_clear();
    let report = result?;

    match format {
        Format::Json => {
            println!(
                "{}",
                render_json(&report).context("failed to serialize report")?
            );
        }
        Format::Text => {
            print!("{}", render_text(&report, &repository));
            if !cleanup {
                println!(
                    "\n{}",
                    style(format!(
                        "Downloaded versions are available in the `{}` directory",
                        output_dir.display()
                    ))
                    .dim()
                );
            }
        }
    }
    Ok(())
}

/// Exit code for an error: the library's code when there is one, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ReleaselocError>()
        .map_or(1, ReleaselocError::exit_code)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_tracing(matches.get_count("verbose"));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{} failed to start async runtime: {e}", style("Error:").red().bold());
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&matches)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").red().bold());
            ExitCode::from(exit_code(&e))
        }
    }
}
