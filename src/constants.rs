/// Output file names written into the run's output directory
pub const SCORED_LEADS_FILE: &str = "cleaned_scored_leads.csv";
pub const SEGMENT_SUMMARY_FILE: &str = "lead_segments.csv";
pub const PLAYBOOK_FILE: &str = "outbound_playbook.md";
pub const QUALITY_REPORT_FILE: &str = "quality_report.md";

// Supported input extensions (compared lowercase)
pub const CSV_EXTENSION: &str = "csv";
pub const TSV_EXTENSION: &str = "tsv";
pub const TEXT_EXTENSION: &str = "txt";

/// Defaults applied to leads read from the line-oriented text format
pub const TEXT_DEFAULT_LEAD_STATUS: &str = "New";
pub const TEXT_DEFAULT_PRIORITY: f64 = 5.0;

/// Derived output column names
pub const STRATEGIC_SCORE_COLUMN: &str = "StrategicScore";
pub const SEGMENT_COLUMN: &str = "Segment";

/// Upper bound of the strategic score range; the lower bound is zero
pub const MAX_STRATEGIC_SCORE: f64 = 100.0;

/// Get all supported input extensions
pub fn get_supported_extensions() -> Vec<&'static str> {
    vec![CSV_EXTENSION, TSV_EXTENSION, TEXT_EXTENSION]
}
