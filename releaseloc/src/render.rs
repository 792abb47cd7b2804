//! Rendering of progress and of the final report.

use console::style;
use releaseloclib::{format_delta, Controller, Report, ReportEntry, Stage};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn from_arg(value: &str) -> Self {
        match value {
            "json" => Format::Json,
            _ => Format::Text,
        }
    }
}

/// Spinner message for the controller's current state, `None` once the run
/// has ended.
pub fn status_line(controller: &Controller) -> Option<String> {
    let progress = controller.progress();
    let message = match controller.stage() {
        Stage::Init | Stage::Checking => "Checking if releases exist...".to_string(),
        Stage::Fetching => "Fetching releases...".to_string(),
        Stage::DownloadExtract => {
            let mut message = format!(
                "Downloading and extracting releases ({}/{}",
                progress.downloaded, progress.releases
            );
            if progress.cache_hits > 0 {
                message.push_str(&format!(" - {} cached", progress.cache_hits));
            }
            message.push_str(")...");
            message
        }
        Stage::Analyzing if controller.is_cleaning_up() => format!(
            "Removing {}...",
            controller.config().output_dir.display()
        ),
        Stage::Analyzing => format!(
            "Analyzing releases ({}/{})...",
            progress.analyzed, progress.releases
        ),
        Stage::Summary | Stage::Error => return None,
    };
    Some(message)
}

fn styled_delta(delta: i64) -> String {
    let text = format_delta(delta);
    match delta.signum() {
        1 => style(text).green().to_string(),
        -1 => style(text).red().to_string(),
        _ => text,
    }
}

/// Heading line of one release: tag, delta vs previous, and the total delta
/// on the most recent release.
fn entry_title(entry: &ReportEntry<'_>) -> String {
    let mut title = style(entry.tag()).bold().to_string();
    if let Some(delta) = entry.line_delta() {
        title.push_str("  ");
        title.push_str(&styled_delta(delta));
        if entry.is_latest() {
            title.push_str(" • Total: ");
            title.push_str(&styled_delta(entry.delta_from_first()));
        }
    }
    title
}

/// Human readable report, oldest release first.
pub fn render_text(report: &Report, repository: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        style(format!("Releases comparison for {repository}")).bold()
    ));

    for entry in report.iter() {
        out.push_str(&entry_title(&entry));
        out.push('\n');
        out.push_str(&format!("  {}\n", style(entry.summary()).dim()));
    }
    out
}

/// Report as pretty-printed JSON.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
