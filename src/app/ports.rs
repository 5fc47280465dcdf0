use std::path::PathBuf;

use crate::error::Result;
use crate::pipeline::ingestion::RawLeadTable;
use crate::pipeline::processing::report::ReportBundle;
use crate::pipeline::processing::segment::{SegmentSummary, SegmentedLead};

/// Source of raw lead rows
pub trait LeadSourcePort {
    fn load(&self) -> Result<RawLeadTable>;

    /// Human-readable origin for logs
    fn describe(&self) -> String;
}

/// Final artifacts of a successful run, handed to the output port in one piece
#[derive(Debug, Clone, Copy)]
pub struct RunArtifacts<'a> {
    pub leads: &'a [SegmentedLead],
    pub summary: &'a SegmentSummary,
    pub reports: &'a ReportBundle,
}

/// Sink for run artifacts
pub trait PipelineOutputPort {
    /// Persist every artifact, returning the paths written
    fn write(&self, artifacts: RunArtifacts<'_>) -> Result<Vec<PathBuf>>;
}
