//! The final report of a run.
//!
//! A [`Report`] owns the analysis results in chronological order. Each
//! [`ReportEntry`] is a view of one result plus its index, so neighbours are
//! plain index lookups.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::data::stats::AnalysisResult;

/// Languages named in an entry summary before the rest are folded.
pub const VISIBLE_LANGUAGES: usize = 2;

/// Analysis results of a run, oldest release first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<AnalysisResult>,
}

impl Report {
    /// Create a report from results already in chronological order.
    pub fn new(entries: Vec<AnalysisResult>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if any.
    pub fn entry(&self, index: usize) -> Option<ReportEntry<'_>> {
        (index < self.entries.len()).then_some(ReportEntry {
            report: self,
            index,
        })
    }

    /// Entries in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = ReportEntry<'_>> {
        (0..self.entries.len()).map(move |index| ReportEntry {
            report: self,
            index,
        })
    }

    /// Oldest release.
    pub fn first(&self) -> Option<ReportEntry<'_>> {
        self.entry(0)
    }

    /// Most recent release.
    pub fn latest(&self) -> Option<ReportEntry<'_>> {
        self.entries.len().checked_sub(1).and_then(|i| self.entry(i))
    }

    /// Raw results in chronological order.
    pub fn results(&self) -> &[AnalysisResult] {
        &self.entries
    }
}

/// One release of a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct ReportEntry<'a> {
    report: &'a Report,
    index: usize,
}

impl<'a> ReportEntry<'a> {
    /// Position in the report, 0 being the oldest release.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn result(&self) -> &'a AnalysisResult {
        &self.report.entries[self.index]
    }

    pub fn tag(&self) -> &'a str {
        &self.result().tag
    }

    /// The release before this one.
    pub fn previous(&self) -> Option<ReportEntry<'a>> {
        self.index.checked_sub(1).and_then(|i| self.report.entry(i))
    }

    /// The release after this one.
    pub fn next(&self) -> Option<ReportEntry<'a>> {
        self.report.entry(self.index + 1)
    }

    /// The oldest release of the report.
    pub fn first(&self) -> ReportEntry<'a> {
        ReportEntry {
            report: self.report,
            index: 0,
        }
    }

    pub fn is_latest(&self) -> bool {
        self.index + 1 == self.report.len()
    }

    /// Line delta against the previous release, `None` for the oldest.
    pub fn line_delta(&self) -> Option<i64> {
        self.previous()
            .map(|prev| line_diff(self.result(), prev.result()))
    }

    /// Line delta against the oldest release.
    pub fn delta_from_first(&self) -> i64 {
        line_diff(self.result(), self.first().result())
    }

    /// One-line summary: files, lines, size, archive size and top languages.
    ///
    /// ```text
    /// 12 files • 340 lines • 14.2 kB (4.1 kB gz) • JavaScript (300 lines) / JSON (30 lines)
    /// ```
    pub fn summary(&self) -> String {
        let result = self.result();
        let mut out = format!(
            "{} files • {} lines • {} ",
            result.total_files,
            result.total_lines,
            format_size(result.total_size)
        );
        if result.tarball_size > 0 {
            out.push_str(&format!("({} gz) • ", format_size(result.tarball_size)));
        } else {
            out.push_str("• ");
        }

        let languages: Vec<String> = result
            .top_languages(VISIBLE_LANGUAGES)
            .into_iter()
            .map(|(language, lines)| format!("{language} ({lines} lines)"))
            .collect();
        out.push_str(&languages.join(" / "));
        out
    }
}

fn line_diff(a: &AnalysisResult, b: &AnalysisResult) -> i64 {
    a.total_lines as i64 - b.total_lines as i64
}

/// `+N lines`, `-N lines` or `No change`.
pub fn format_delta(delta: i64) -> String {
    match delta {
        d if d > 0 => format!("+{d} lines"),
        d if d < 0 => format!("{d} lines"),
        _ => "No change".to_string(),
    }
}

/// Byte count with SI (power of 1000) units: `999 B`, `1.5 kB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1000;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = ['k', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {prefix}B", bytes as f64 / div as f64)
}

#[derive(Serialize)]
struct SerializedEntry<'a> {
    #[serde(flatten)]
    result: &'a AnalysisResult,
    line_delta: Option<i64>,
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let releases: Vec<SerializedEntry<'_>> = self
            .iter()
            .map(|entry| SerializedEntry {
                result: entry.result(),
                line_delta: entry.line_delta(),
            })
            .collect();

        let mut state = serializer.serialize_struct("Report", 2)?;
        state.serialize_field("releases", &releases)?;
        state.serialize_field(
            "total_delta",
            &self.latest().map(|entry| entry.delta_from_first()),
        )?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(tag: &str, lines: u64) -> AnalysisResult {
        let mut result = AnalysisResult::new(tag);
        result.add_file(lines, lines * 10, Some("JavaScript"));
        result
    }

    fn report() -> Report {
        Report::new(vec![
            result("v1.0.0", 100),
            result("v1.1.0", 120),
            result("v1.2.0", 90),
            result("v1.3.0", 90),
        ])
    }

    #[test]
    fn test_navigation() {
        let report = report();
        let second = report.entry(1).unwrap();

        assert_eq!(second.previous().unwrap().tag(), "v1.0.0");
        assert_eq!(second.next().unwrap().tag(), "v1.2.0");
        assert_eq!(second.first().tag(), "v1.0.0");
        assert!(report.first().unwrap().previous().is_none());
        assert!(report.latest().unwrap().next().is_none());
        assert!(report.latest().unwrap().is_latest());
        assert!(report.entry(4).is_none());
    }

    #[test]
    fn test_line_deltas() {
        let report = report();
        let deltas: Vec<Option<i64>> = report.iter().map(|e| e.line_delta()).collect();
        assert_eq!(deltas, [None, Some(20), Some(-30), Some(0)]);
        assert_eq!(report.latest().unwrap().delta_from_first(), -10);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::default();
        assert!(report.is_empty());
        assert!(report.first().is_none());
        assert!(report.latest().is_none());
        assert_eq!(report.iter().count(), 0);
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(12), "+12 lines");
        assert_eq!(format_delta(-3), "-3 lines");
        assert_eq!(format_delta(0), "No change");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(1000), "1.0 kB");
        assert_eq!(format_size(1500), "1.5 kB");
        assert_eq!(format_size(2_000_000), "2.0 MB");
        assert_eq!(format_size(3_210_000_000), "3.2 GB");
    }

    #[test]
    fn test_summary() {
        let mut result = AnalysisResult::new("v1.0.0");
        result.add_file(300, 12_000, Some("JavaScript"));
        result.add_file(30, 2_000, Some("JSON"));
        result.add_file(10, 200, Some("Markdown"));
        result.add_file(5, 100, Some("TypeScript"));
        result.tarball_size = 4_100;
        let report = Report::new(vec![result]);

        assert_eq!(
            report.first().unwrap().summary(),
            "4 files • 345 lines • 14.3 kB (4.1 kB gz) • JavaScript (300 lines) / \
             JSON (30 lines) / 2 other languages (15 lines)"
        );
    }

    #[test]
    fn test_summary_without_archive_size() {
        let report = Report::new(vec![result("v1.0.0", 1)]);
        assert_eq!(
            report.first().unwrap().summary(),
            "1 files • 1 lines • 10 B • JavaScript (1 lines)"
        );
    }

    #[test]
    fn test_serialize_includes_deltas() {
        let report = report();
        let json = serde_json::to_value(&report).unwrap();

        let releases = json["releases"].as_array().unwrap();
        assert_eq!(releases.len(), 4);
        assert_eq!(releases[0]["tag"], "v1.0.0");
        assert!(releases[0]["line_delta"].is_null());
        assert_eq!(releases[1]["line_delta"], 20);
        assert_eq!(releases[1]["total_lines"], 120);
        assert_eq!(json["total_delta"], -10);
    }
}
