use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::app::ports::{PipelineOutputPort, RunArtifacts};
use crate::constants::{
    PLAYBOOK_FILE, QUALITY_REPORT_FILE, SCORED_LEADS_FILE, SEGMENT_COLUMN, SEGMENT_SUMMARY_FILE,
    STRATEGIC_SCORE_COLUMN,
};
use crate::domain::{format_number, CanonicalField, DataQualityFlags, EnrichmentField};
use crate::error::Result;
use crate::pipeline::processing::segment::{SegmentSummaryRow, SegmentedLead};

pub const SUMMARY_COLUMNS: [&str; 10] = [
    "Segment",
    "LeadCount",
    "AvgStrategicScore",
    "ValidEmailPct",
    "IcpPositivePct",
    "TopCompanySizeTier",
    "TopChannel",
    "TopIndustries",
    "TopJobFunctions",
    "TopRegions",
];

/// Writes the four run artifacts into one output directory
pub struct FileOutputAdapter {
    output_dir: PathBuf,
}

impl FileOutputAdapter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn render_scored_leads(leads: &[SegmentedLead]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(scored_lead_headers())?;
        for lead in leads {
            writer.write_record(scored_lead_row(lead))?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(bytes)
    }

    fn render_summary(rows: &[SegmentSummaryRow]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(SUMMARY_COLUMNS)?;
        for row in rows {
            writer.write_record(summary_row(row))?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(bytes)
    }
}

impl PipelineOutputPort for FileOutputAdapter {
    fn write(&self, artifacts: RunArtifacts<'_>) -> Result<Vec<PathBuf>> {
        // Render everything before touching the filesystem
        let files: [(&str, Vec<u8>); 4] = [
            (SCORED_LEADS_FILE, Self::render_scored_leads(artifacts.leads)?),
            (SEGMENT_SUMMARY_FILE, Self::render_summary(&artifacts.summary.rows)?),
            (PLAYBOOK_FILE, artifacts.reports.playbook.clone().into_bytes()),
            (QUALITY_REPORT_FILE, artifacts.reports.quality_report.clone().into_bytes()),
        ];

        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            let path = self.output_dir.join(name);
            fs::write(&path, bytes)?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Canonical columns, then derived score and segment, enrichment columns and
/// data-quality flags
pub fn scored_lead_headers() -> Vec<&'static str> {
    CanonicalField::ALL
        .iter()
        .map(|f| f.column_name())
        .chain([STRATEGIC_SCORE_COLUMN, SEGMENT_COLUMN])
        .chain(EnrichmentField::ALL.iter().map(|f| f.column_name()))
        .chain(DataQualityFlags::COLUMNS)
        .collect()
}

pub fn scored_lead_row(lead: &SegmentedLead) -> Vec<String> {
    let record = &lead.scored_lead.lead;
    let score = format_number(lead.score());
    CanonicalField::ALL
        .iter()
        .map(|field| match field {
            // A missing priority falls back to the strategic score
            CanonicalField::PriorityScore if record.priority_score.is_none() => score.clone(),
            other => record.text(*other),
        })
        .chain([score.clone(), lead.segment.label().to_string()])
        .chain(
            EnrichmentField::ALL
                .iter()
                .map(|f| record.enrichment.get(*f).unwrap_or("").to_string()),
        )
        .chain(DataQualityFlags::for_lead(record).cells())
        .collect()
}

pub fn summary_row(row: &SegmentSummaryRow) -> Vec<String> {
    vec![
        row.segment.label().to_string(),
        row.lead_count.to_string(),
        format_number(row.avg_score),
        format_number(row.valid_email_pct),
        format_number(row.icp_positive_pct),
        row.top_company_size_tier.clone().unwrap_or_default(),
        row.top_channel.clone().unwrap_or_default(),
        row.top_industries.join(", "),
        row.top_job_functions.join(", "),
        row.top_regions.join(", "),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use crate::domain::{LeadRecord, Segment};
    use crate::pipeline::processing::report::{QualityStatus, ReportBundle};
    use crate::pipeline::processing::score::{ScoreBreakdown, ScoredLead};
    use crate::pipeline::processing::segment::SegmentSummary;
    use tempfile::tempdir;

    fn lead(priority: Option<f64>) -> SegmentedLead {
        SegmentedLead {
            scored_lead: ScoredLead {
                lead: LeadRecord {
                    lead_id: "7".to_string(),
                    full_name: "Ana Lim".to_string(),
                    email: "ana@x.io".to_string(),
                    priority_score: priority,
                    ..Default::default()
                },
                score: 62.5,
                breakdown: ScoreBreakdown::default(),
            },
            segment: Segment::StandardIcp,
            rule: "standard_icp",
        }
    }

    #[test]
    fn test_priority_backfilled_with_score() {
        let headers = scored_lead_headers();
        let priority_idx = headers.iter().position(|h| *h == "PriorityScore").unwrap();
        let segment_idx = headers.iter().position(|h| *h == "Segment").unwrap();

        let row = scored_lead_row(&lead(None));
        assert_eq!(row[priority_idx], "62.5");
        assert_eq!(row[segment_idx], "Standard ICP");

        let row = scored_lead_row(&lead(Some(8.0)));
        assert_eq!(row[priority_idx], "8");
        assert_eq!(row.len(), headers.len());
    }

    #[test]
    fn test_data_quality_flags_close_the_row() {
        let headers = scored_lead_headers();
        assert_eq!(
            &headers[headers.len() - 4..],
            &["DQ_MissingEmail", "DQ_MissingIndustry", "DQ_InferredFieldsCount", "DQ_ConfidenceLevel"]
        );

        let mut segmented = lead(None);
        segmented.scored_lead.lead.enrichment.set(EnrichmentField::Region, "APAC");
        let row = scored_lead_row(&segmented);
        assert_eq!(&row[row.len() - 4..], &["false", "true", "1", "High"]);
    }

    #[test]
    fn test_writes_all_files_into_new_directory() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let leads = vec![lead(None)];
        let summary = SegmentSummary::build(&leads, &ProfileConfig::default(), 3);
        let reports = ReportBundle {
            playbook: "# Playbook\n".to_string(),
            quality_report: "# Quality\n".to_string(),
            issues: Vec::new(),
            status: QualityStatus::Healthy,
        };

        let written = FileOutputAdapter::new(&out)
            .write(RunArtifacts {
                leads: &leads,
                summary: &summary,
                reports: &reports,
            })
            .unwrap();

        assert_eq!(written.len(), 4);
        for name in [SCORED_LEADS_FILE, SEGMENT_SUMMARY_FILE, PLAYBOOK_FILE, QUALITY_REPORT_FILE] {
            assert!(out.join(name).is_file(), "{} missing", name);
        }
        let summary_csv = fs::read_to_string(out.join(SEGMENT_SUMMARY_FILE)).unwrap();
        assert!(summary_csv.starts_with("Segment,LeadCount,AvgStrategicScore"));
        assert!(summary_csv.contains("Standard ICP,1,62.5"));
    }
}
