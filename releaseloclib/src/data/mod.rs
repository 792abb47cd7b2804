//! Data collection: count lines and collect per-release statistics.
//!
//! - **Counting**: newline counting over any reader ([`count_lines`])
//! - **Analysis**: walk an extracted release ([`analyze_release`])
//! - **Statistics**: [`Release`] and [`AnalysisResult`]

pub mod analyzer;
pub mod counter;
pub mod stats;

pub use analyzer::{analyze_release, language_for_extension};
pub use counter::{count_file_lines, count_lines};
pub use stats::{AnalysisResult, Release, OTHER_LANGUAGE};
