use crate::config::{ProfileConfig, ReportConfig};
use crate::constants::MAX_STRATEGIC_SCORE;
use crate::domain::{format_number, CanonicalField, EmailStatus, Segment};
use crate::observability::metrics;
use crate::pipeline::processing::profile::parse_size_tier;
use crate::pipeline::processing::segment::summary::percentage;

use super::{QualityIssue, QualitySeverity, QualityStatus, ReportInput};

/// Missing-value count per canonical column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCompleteness {
    pub field: CanonicalField,
    pub missing: usize,
    pub missing_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmailBreakdown {
    pub valid: usize,
    pub empty: usize,
    pub invalid: usize,
}

impl EmailBreakdown {
    pub fn total(&self) -> usize {
        self.valid + self.empty + self.invalid
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

pub fn completeness(input: ReportInput<'_>) -> Vec<ColumnCompleteness> {
    let total = input.leads.len();
    CanonicalField::ALL
        .into_iter()
        .map(|field| {
            let missing = input
                .leads
                .iter()
                .filter(|l| l.scored_lead.lead.is_missing(field))
                .count();
            ColumnCompleteness {
                field,
                missing,
                missing_pct: percentage(missing, total),
            }
        })
        .collect()
}

pub fn email_breakdown(input: ReportInput<'_>) -> EmailBreakdown {
    input
        .leads
        .iter()
        .fold(EmailBreakdown::default(), |mut acc, lead| {
            match lead.scored_lead.lead.email_status() {
                EmailStatus::Valid => acc.valid += 1,
                EmailStatus::Empty => acc.empty += 1,
                EmailStatus::Invalid => acc.invalid += 1,
            }
            acc
        })
}

pub fn score_distribution(input: ReportInput<'_>) -> Option<ScoreDistribution> {
    let mut scores: Vec<f64> = input.leads.iter().map(|l| l.score()).collect();
    if scores.is_empty() {
        return None;
    }
    scores.sort_by(f64::total_cmp);
    let n = scores.len();
    let median = if n % 2 == 1 {
        scores[n / 2]
    } else {
        (scores[n / 2 - 1] + scores[n / 2]) / 2.0
    };
    Some(ScoreDistribution {
        min: scores[0],
        max: scores[n - 1],
        mean: scores.iter().sum::<f64>() / n as f64,
        median,
    })
}

/// Human-readable notes about what cleaning changed
pub fn cleaning_notes(input: ReportInput<'_>, profile: &ProfileConfig) -> Vec<String> {
    let report = input.normalization;
    let mut notes = Vec::new();

    if report.blank_rows_dropped > 0 {
        notes.push(format!(
            "Dropped {} rows with no email, name or company",
            report.blank_rows_dropped
        ));
    }
    if report.short_company_dropped > 0 {
        notes.push(format!(
            "Dropped {} rows with a missing or too short company name",
            report.short_company_dropped
        ));
    }
    if report.duplicate_emails_dropped > 0 {
        notes.push(format!("Removed {} duplicate emails", report.duplicate_emails_dropped));
    }
    if report.duplicate_ids_dropped > 0 {
        notes.push(format!("Removed {} duplicate LeadIDs", report.duplicate_ids_dropped));
    }
    if report.assigned_ids > 0 {
        notes.push(format!("Assigned {} missing LeadIDs", report.assigned_ids));
    }
    if !report.synthesized_columns.is_empty() {
        notes.push(format!(
            "Input lacked columns {}; they were added empty",
            report.synthesized_columns.join(", ")
        ));
    }
    if !report.unmapped_columns.is_empty() {
        notes.push(format!(
            "Ignored unrecognised columns {}",
            report.unmapped_columns.join(", ")
        ));
    }
    if report.unparsable_priority > 0 {
        notes.push(format!(
            "{} PriorityScore values were not numeric and were dropped",
            report.unparsable_priority
        ));
    }

    let unparsable_sizes = input
        .leads
        .iter()
        .map(|l| &l.scored_lead.lead.company_size)
        .filter(|size| !size.trim().is_empty() && parse_size_tier(size, &profile.company_size).is_none())
        .count();
    if unparsable_sizes > 0 {
        notes.push(format!(
            "{} CompanySize values could not be bucketed and scored zero",
            unparsable_sizes
        ));
    }

    notes
}

/// Convert threshold breaches into findings
pub fn assess(input: ReportInput<'_>, profile: &ProfileConfig, config: &ReportConfig) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    let total = input.leads.len();

    if total == 0 {
        issues.push(QualityIssue::new(
            QualitySeverity::Critical,
            "No lead records are available for analysis",
        ));
    }

    if input.summary.total() != total {
        issues.push(QualityIssue::new(
            QualitySeverity::Critical,
            format!(
                "Segment counts sum to {} but {} leads were segmented",
                input.summary.total(),
                total
            ),
        ));
    }

    let out_of_range = input
        .leads
        .iter()
        .filter(|l| !(0.0..=MAX_STRATEGIC_SCORE).contains(&l.score()))
        .count();
    if out_of_range > 0 {
        issues.push(QualityIssue::new(
            QualitySeverity::Critical,
            format!(
                "{} StrategicScore values fall outside 0 to {}",
                out_of_range,
                format_number(MAX_STRATEGIC_SCORE)
            ),
        ));
    }

    if total > 0 {
        for column in completeness(input) {
            let severity = if config.required_contact_fields.contains(&column.field) {
                if column.missing_pct > config.required_missing_high_pct {
                    Some(QualitySeverity::High)
                } else if column.missing_pct > config.required_missing_medium_pct {
                    Some(QualitySeverity::Medium)
                } else {
                    None
                }
            } else if column.missing_pct > config.optional_missing_medium_pct {
                Some(QualitySeverity::Medium)
            } else if column.missing_pct > config.optional_missing_low_pct {
                Some(QualitySeverity::Low)
            } else {
                None
            };
            if let Some(severity) = severity {
                issues.push(QualityIssue::new(
                    severity,
                    format!(
                        "{} is missing for {:.2}% of leads ({} of {})",
                        column.field, column.missing_pct, column.missing, total
                    ),
                ));
            }
        }

        let emails = email_breakdown(input);
        let unusable_pct = percentage(emails.empty + emails.invalid, total);
        if unusable_pct > config.unusable_email_high_pct {
            issues.push(QualityIssue::new(
                QualitySeverity::High,
                format!(
                    "{:.2}% of leads have no usable Email ({} empty, {} invalid)",
                    unusable_pct, emails.empty, emails.invalid
                ),
            ));
        }
        let invalid_pct = percentage(emails.invalid, total);
        let invalid_severity = if invalid_pct > config.invalid_email_high_pct {
            Some(QualitySeverity::High)
        } else if invalid_pct >= config.invalid_email_medium_pct {
            Some(QualitySeverity::Medium)
        } else {
            None
        };
        if let Some(severity) = invalid_severity {
            issues.push(QualityIssue::new(
                severity,
                format!(
                    "{:.2}% of Email values are malformed ({} of {})",
                    invalid_pct, emails.invalid, total
                ),
            ));
        }

        let disqualified = input.summary.count_for(Segment::Disqualified);
        let disqualified_pct = percentage(disqualified, total);
        if disqualified_pct > config.disqualified_share_medium_pct {
            issues.push(QualityIssue::new(
                QualitySeverity::Medium,
                format!(
                    "{:.2}% of leads were segmented as Disqualified ({} of {})",
                    disqualified_pct, disqualified, total
                ),
            ));
        }
    }

    for note in cleaning_notes(input, profile) {
        issues.push(QualityIssue::new(QualitySeverity::Low, note));
    }

    for issue in &issues {
        metrics::report::finding_raised(issue.severity.label());
    }
    issues
}

pub fn render(
    input: ReportInput<'_>,
    notes: &[String],
    issues: &[QualityIssue],
    status: QualityStatus,
) -> String {
    let mut out = String::new();
    let total = input.leads.len();

    out.push_str("# Lead Quality Report\n");
    out.push('\n');
    out.push_str(&format!("**Overall status:** {}\n", status));
    out.push('\n');

    out.push_str("## Dataset overview\n");
    out.push('\n');
    out.push_str(&format!("- Input rows: {}\n", input.normalization.input_rows));
    out.push_str(&format!("- Leads after cleaning: {}\n", total));
    out.push_str(&format!("- Segments in use: {}\n", input.summary.rows.len()));
    out.push('\n');

    out.push_str("## Completeness\n");
    out.push('\n');
    if total == 0 {
        out.push_str("_No data._\n");
    } else {
        out.push_str("| Column | Missing | Missing % |\n");
        out.push_str("|---|---:|---:|\n");
        for column in completeness(input) {
            out.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                column.field, column.missing, column.missing_pct
            ));
        }
    }
    out.push('\n');

    out.push_str("## Email validity\n");
    out.push('\n');
    let emails = email_breakdown(input);
    if emails.total() == 0 {
        out.push_str("_No data._\n");
    } else {
        out.push_str("| Status | Count | % |\n");
        out.push_str("|---|---:|---:|\n");
        for (label, count) in [("Valid", emails.valid), ("Empty", emails.empty), ("Invalid", emails.invalid)] {
            out.push_str(&format!("| {} | {} | {:.2} |\n", label, count, percentage(count, emails.total())));
        }
    }
    out.push('\n');

    out.push_str("## Score distribution\n");
    out.push('\n');
    match score_distribution(input) {
        Some(dist) => {
            out.push_str(&format!("- Min: {}\n", format_number(dist.min)));
            out.push_str(&format!("- Max: {}\n", format_number(dist.max)));
            out.push_str(&format!("- Mean: {}\n", format_number(dist.mean)));
            out.push_str(&format!("- Median: {}\n", format_number(dist.median)));
        }
        None => {
            out.push_str("_No scores available._\n");
        }
    }
    out.push('\n');

    out.push_str("## Segment counts\n");
    out.push('\n');
    out.push_str("| Segment | Leads | Share % |\n");
    out.push_str("|---|---:|---:|\n");
    for segment in Segment::ALL {
        let count = input.summary.count_for(segment);
        out.push_str(&format!("| {} | {} | {:.2} |\n", segment, count, percentage(count, total)));
    }
    out.push('\n');

    out.push_str("## Cleaning notes\n");
    out.push('\n');
    if notes.is_empty() {
        out.push_str("_No cleaning adjustments were needed._\n");
    } else {
        for note in notes {
            out.push_str(&format!("- {}\n", note));
        }
    }
    out.push('\n');

    out.push_str("## Findings\n");
    out.push('\n');
    if issues.is_empty() {
        out.push_str("_No findings. The dataset looks healthy._\n");
    } else {
        for severity in QualitySeverity::DESCENDING {
            let group: Vec<&QualityIssue> = issues.iter().filter(|i| i.severity == severity).collect();
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("### {} ({})\n", severity.label().to_uppercase(), group.len()));
            out.push('\n');
            for issue in group {
                out.push_str(&format!("- {}\n", issue.message));
            }
            out.push('\n');
        }
    }

    out
}
