use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::config::{ProfileConfig, ReportConfig};
use crate::pipeline::processing::normalize::NormalizationReport;
use crate::pipeline::processing::segment::{SegmentSummary, SegmentedLead};

pub mod playbook;
pub mod quality;

/// Severity of a quality finding, ordered so that `Critical` is the greatest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QualitySeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QualitySeverity {
    /// Highest first, as rendered in the report
    pub const DESCENDING: [QualitySeverity; 4] = [
        QualitySeverity::Critical,
        QualitySeverity::High,
        QualitySeverity::Medium,
        QualitySeverity::Low,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QualitySeverity::Low => "low",
            QualitySeverity::Medium => "medium",
            QualitySeverity::High => "high",
            QualitySeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for QualitySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Individual quality finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityIssue {
    pub severity: QualitySeverity,
    pub message: String,
}

impl QualityIssue {
    pub fn new(severity: QualitySeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Roll-up status derived from the worst finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityStatus {
    Healthy,
    MinorIssues,
    Issues,
}

impl QualityStatus {
    pub fn from_issues(issues: &[QualityIssue]) -> Self {
        match issues.iter().map(|i| i.severity).max() {
            None => QualityStatus::Healthy,
            Some(QualitySeverity::Critical | QualitySeverity::High) => QualityStatus::Issues,
            Some(QualitySeverity::Medium | QualitySeverity::Low) => QualityStatus::MinorIssues,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityStatus::Healthy => "healthy",
            QualityStatus::MinorIssues => "minor issues",
            QualityStatus::Issues => "issues",
        }
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a reporter looks at
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub leads: &'a [SegmentedLead],
    pub summary: &'a SegmentSummary,
    pub normalization: &'a NormalizationReport,
}

/// Rendered report documents
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    pub playbook: String,
    pub quality_report: String,
    pub issues: Vec<QualityIssue>,
    pub status: QualityStatus,
}

/// Trait for rendering the human-readable run artifacts. Rendering never
/// fails; sparse input yields explicit "no data" sections.
pub trait Reporter {
    fn render(&self, input: ReportInput<'_>) -> ReportBundle;
}

/// Markdown reporter
pub struct MarkdownReporter {
    profile: ProfileConfig,
    config: ReportConfig,
}

impl MarkdownReporter {
    pub fn new(profile: ProfileConfig, config: ReportConfig) -> Self {
        Self { profile, config }
    }
}

impl Reporter for MarkdownReporter {
    fn render(&self, input: ReportInput<'_>) -> ReportBundle {
        let issues = quality::assess(input, &self.profile, &self.config);
        let status = QualityStatus::from_issues(&issues);
        let notes = quality::cleaning_notes(input, &self.profile);
        let quality_report = quality::render(input, &notes, &issues, status);
        let playbook = playbook::render(input, &self.config);

        info!(findings = issues.len(), %status, "Rendered reports");

        ReportBundle {
            playbook,
            quality_report,
            issues,
            status,
        }
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new(ProfileConfig::default(), ReportConfig::default())
    }
}

/// Escape a value for a markdown table cell
pub(crate) fn cell(value: &str) -> String {
    let value = value.replace('|', "\\|").replace('\n', " ");
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(QualitySeverity::Critical > QualitySeverity::High);
        assert!(QualitySeverity::High > QualitySeverity::Medium);
        assert!(QualitySeverity::Medium > QualitySeverity::Low);
    }

    #[test]
    fn test_status_from_worst_severity() {
        assert_eq!(QualityStatus::from_issues(&[]), QualityStatus::Healthy);

        let minor = vec![QualityIssue::new(QualitySeverity::Low, "a")];
        assert_eq!(QualityStatus::from_issues(&minor), QualityStatus::MinorIssues);

        let serious = vec![
            QualityIssue::new(QualitySeverity::Medium, "a"),
            QualityIssue::new(QualitySeverity::High, "b"),
        ];
        assert_eq!(QualityStatus::from_issues(&serious), QualityStatus::Issues);
        assert_eq!(QualityStatus::Issues.to_string(), "issues");
    }

    #[test]
    fn test_cell_escapes_pipes() {
        assert_eq!(cell("a|b"), "a\\|b");
        assert_eq!(cell(""), "-");
    }
}
