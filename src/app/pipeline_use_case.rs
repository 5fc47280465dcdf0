use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info, instrument, warn};

use crate::app::ports::{LeadSourcePort, PipelineOutputPort, RunArtifacts};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::enrich::{Enricher, RuleEnricher};
use crate::pipeline::processing::normalize::{DefaultNormalizer, NormalizationReport, Normalizer};
use crate::pipeline::processing::report::{MarkdownReporter, ReportBundle, ReportInput, Reporter};
use crate::pipeline::processing::score::{DefaultScorer, Scorer};
use crate::pipeline::processing::segment::{RuleSegmenter, SegmentSummary, SegmentedLead, Segmenter};

/// The stage implementations a run is composed of
pub struct PipelineStages {
    pub normalizer: Box<dyn Normalizer>,
    /// `None` skips enrichment entirely
    pub enricher: Option<Box<dyn Enricher>>,
    pub scorer: Box<dyn Scorer>,
    pub segmenter: Box<dyn Segmenter>,
    pub reporter: Box<dyn Reporter>,
}

impl PipelineStages {
    /// Build the default stages with their tables injected from `config`
    pub fn from_config(config: &PipelineConfig, skip_enrichment: bool) -> Self {
        let enricher: Option<Box<dyn Enricher>> = if skip_enrichment || !config.enrichment.enabled {
            None
        } else {
            Some(Box::new(RuleEnricher::new(
                config.profile.clone(),
                config.enrichment.clone(),
            )))
        };

        Self {
            normalizer: Box::new(DefaultNormalizer::new(config.normalizer.clone())),
            enricher,
            scorer: Box::new(DefaultScorer::new(config.profile.clone(), config.scoring.clone())),
            segmenter: Box::new(RuleSegmenter::new(
                config.profile.clone(),
                config.segmentation.clone(),
            )),
            reporter: Box::new(MarkdownReporter::new(config.profile.clone(), config.report.clone())),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub normalization: NormalizationReport,
    pub leads: Vec<SegmentedLead>,
    pub summary: SegmentSummary,
    pub reports: ReportBundle,
    pub enriched: bool,
    pub written: Vec<PathBuf>,
}

/// Use case running one batch from source to output
pub struct PipelineUseCase {
    stages: PipelineStages,
    source: Box<dyn LeadSourcePort>,
    output: Box<dyn PipelineOutputPort>,
}

impl PipelineUseCase {
    pub fn new(
        stages: PipelineStages,
        source: Box<dyn LeadSourcePort>,
        output: Box<dyn PipelineOutputPort>,
    ) -> Self {
        Self {
            stages,
            source,
            output,
        }
    }

    /// Create a use case with the default stages for `config`
    pub fn with_config(
        config: &PipelineConfig,
        skip_enrichment: bool,
        source: Box<dyn LeadSourcePort>,
        output: Box<dyn PipelineOutputPort>,
    ) -> Self {
        Self::new(PipelineStages::from_config(config, skip_enrichment), source, output)
    }

    /// Run every stage, then hand all artifacts to the output port. Nothing
    /// is written when any earlier stage fails.
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn run(&self) -> Result<PipelineRun> {
        let started = Instant::now();
        match self.execute() {
            Ok(run) => {
                let elapsed = started.elapsed().as_secs_f64();
                metrics::pipeline::run_completed(elapsed);
                info!(
                    leads = run.leads.len(),
                    status = %run.reports.status,
                    elapsed_secs = elapsed,
                    "Pipeline run completed"
                );
                Ok(run)
            }
            Err(e) => {
                metrics::pipeline::run_failed(e.kind());
                error!("Pipeline run failed: {}", e);
                Err(e)
            }
        }
    }

    fn execute(&self) -> Result<PipelineRun> {
        let table = self.source.load()?;
        info!(
            rows = table.len(),
            columns = table.headers.len(),
            "Loaded raw lead table"
        );

        let normalized = self.stages.normalizer.normalize(&table)?;

        let (records, enriched) = match &self.stages.enricher {
            Some(enricher) => (enricher.enrich_all(&normalized.records), true),
            None => {
                info!("Enrichment skipped");
                (normalized.records, false)
            }
        };

        let scored = self.stages.scorer.score_all(records);
        let (leads, summary) = self.stages.segmenter.segment_all(scored);

        if summary.total() != leads.len() {
            warn!(
                summary_total = summary.total(),
                leads = leads.len(),
                "Segment summary does not partition the lead set"
            );
        }

        let reports = self.stages.reporter.render(ReportInput {
            leads: &leads,
            summary: &summary,
            normalization: &normalized.report,
        });

        let written = self.output.write(RunArtifacts {
            leads: &leads,
            summary: &summary,
            reports: &reports,
        })?;

        Ok(PipelineRun {
            normalization: normalized.report,
            leads,
            summary,
            reports,
            enriched,
            written,
        })
    }
}
