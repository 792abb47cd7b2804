//! Release analysis: walk an extracted release and collect statistics.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::ReleaselocError;
use crate::Result;

use super::counter::count_file_lines;
use super::stats::{AnalysisResult, OTHER_LANGUAGE};

/// Extension to language table. Keys are lowercase, without the leading dot.
const LANGUAGES: &[(&str, &str)] = &[
    ("js", "JavaScript"),
    ("cjs", "JavaScript"),
    ("mjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("cts", "TypeScript"),
    ("mts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("map", "Source Map"),
    ("json", "JSON"),
    ("md", "Markdown"),
    ("svelte", "Svelte"),
];

/// Language label for a file extension, `None` if the table has no entry.
pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, language)| *language)
}

/// Bucket a file falls into: `None` for extension-less files, the table
/// entry if there is one, [`OTHER_LANGUAGE`] otherwise.
///
/// A dotfile such as `.npmignore` has no extension as far as [`Path`] is
/// concerned, but its whole name is treated as one and lands in
/// [`OTHER_LANGUAGE`].
fn bucket_for(path: &Path) -> Option<&'static str> {
    match path.extension() {
        Some(extension) => {
            let extension = extension.to_str().unwrap_or_default();
            Some(language_for_extension(extension).unwrap_or(OTHER_LANGUAGE))
        }
        None => {
            let name = path.file_name()?.to_str().unwrap_or_default();
            (name.len() > 1 && name.starts_with('.')).then_some(OTHER_LANGUAGE)
        }
    }
}

/// Analyze the release extracted at `root/tag`.
///
/// Every regular file below the release directory is counted: its lines go to
/// the totals and to its language bucket, its on-disk size to the total size.
/// The archive size is left at 0; the pipeline fills it from the download.
///
/// # Example
///
/// ```rust
/// use releaseloclib::analyze_release;
/// use std::fs;
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// let pkg = dir.path().join("v1.0.0/package");
/// fs::create_dir_all(&pkg).unwrap();
/// fs::write(pkg.join("index.js"), "export {};\n").unwrap();
///
/// let result = analyze_release(dir.path(), "v1.0.0").unwrap();
/// assert_eq!(result.total_files, 1);
/// assert_eq!(result.lines_for("JavaScript"), 1);
/// ```
pub fn analyze_release(root: impl AsRef<Path>, tag: &str) -> Result<AnalysisResult> {
    let dir = root.as_ref().join(tag);
    if !dir.is_dir() {
        return Err(ReleaselocError::PathNotFound(dir));
    }

    let mut result = AnalysisResult::new(tag);

    for entry in WalkDir::new(&dir) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(&dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            ReleaselocError::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let size = entry
            .metadata()
            .map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("metadata unavailable"));
                ReleaselocError::io(path, source)
            })?
            .len();
        let lines = count_file_lines(path)?;

        result.add_file(lines, size, bucket_for(path));
    }

    debug!(
        tag,
        files = result.total_files,
        lines = result.total_lines,
        "analyzed release"
    );

    Ok(result)
}
