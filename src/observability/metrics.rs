//! Metric recording for the lead pipeline
//!
//! Metrics go through the `metrics` facade. Nothing is exported unless the
//! embedding program installs a recorder, so a plain CLI run records into a
//! no-op sink.

use std::fmt;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Normalize metrics
    NormalizeRowsRead,
    NormalizeRowsDropped,
    NormalizeRecordsEmitted,
    NormalizeFieldAnomalies,

    // Enrichment metrics
    EnrichRecordsEnriched,

    // Scoring metrics
    ScoreStrategicScore,

    // Segmentation metrics
    SegmentLeadsAssigned,

    // Report metrics
    ReportFindingsRaised,

    // Run metrics
    PipelineRunsCompleted,
    PipelineRunsFailed,
    PipelineRunDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeRowsRead => "lead_pipeline_normalize_rows_read_total",
            MetricName::NormalizeRowsDropped => "lead_pipeline_normalize_rows_dropped_total",
            MetricName::NormalizeRecordsEmitted => "lead_pipeline_normalize_records_emitted_total",
            MetricName::NormalizeFieldAnomalies => "lead_pipeline_normalize_field_anomalies_total",
            MetricName::EnrichRecordsEnriched => "lead_pipeline_enrich_records_enriched_total",
            MetricName::ScoreStrategicScore => "lead_pipeline_score_strategic_score",
            MetricName::SegmentLeadsAssigned => "lead_pipeline_segment_leads_assigned_total",
            MetricName::ReportFindingsRaised => "lead_pipeline_report_findings_raised_total",
            MetricName::PipelineRunsCompleted => "lead_pipeline_runs_completed_total",
            MetricName::PipelineRunsFailed => "lead_pipeline_runs_failed_total",
            MetricName::PipelineRunDuration => "lead_pipeline_run_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn rows_read(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRowsRead.as_str()).increment(count as u64);
    }

    /// Record rows removed during cleaning, labelled by reason
    pub fn rows_dropped(reason: &'static str, count: usize) {
        if count == 0 {
            return;
        }
        ::metrics::counter!(MetricName::NormalizeRowsDropped.as_str(), "reason" => reason)
            .increment(count as u64);
    }

    pub fn records_emitted(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsEmitted.as_str()).increment(count as u64);
    }

    pub fn field_anomaly(field: &'static str) {
        ::metrics::counter!(MetricName::NormalizeFieldAnomalies.as_str(), "field" => field)
            .increment(1);
    }
}

pub mod enrich {
    use super::MetricName;

    pub fn records_enriched(count: usize) {
        ::metrics::counter!(MetricName::EnrichRecordsEnriched.as_str()).increment(count as u64);
    }
}

pub mod score {
    use super::MetricName;

    pub fn score_recorded(score: f64) {
        ::metrics::histogram!(MetricName::ScoreStrategicScore.as_str()).record(score);
    }
}

pub mod segment {
    use super::MetricName;

    /// Record the segment and the rule that assigned it
    pub fn lead_assigned(segment: &'static str, rule: &'static str) {
        ::metrics::counter!(
            MetricName::SegmentLeadsAssigned.as_str(),
            "segment" => segment,
            "rule" => rule
        )
        .increment(1);
    }
}

pub mod report {
    use super::MetricName;

    pub fn finding_raised(severity: &'static str) {
        ::metrics::counter!(MetricName::ReportFindingsRaised.as_str(), "severity" => severity)
            .increment(1);
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn run_completed(duration_secs: f64) {
        ::metrics::counter!(MetricName::PipelineRunsCompleted.as_str()).increment(1);
        ::metrics::histogram!(MetricName::PipelineRunDuration.as_str()).record(duration_secs);
    }

    pub fn run_failed(kind: &'static str) {
        ::metrics::counter!(MetricName::PipelineRunsFailed.as_str(), "kind" => kind).increment(1);
    }
}
