// Lead pipeline: ingestion shapes and processing stages

pub mod ingestion;
pub mod processing;
pub mod utils;

// Re-export the stage entry points
pub use processing::enrich::{Enricher, RuleEnricher};
pub use processing::normalize::{DefaultNormalizer, NormalizedLeadSet, Normalizer};
pub use processing::report::{MarkdownReporter, Reporter};
pub use processing::score::{DefaultScorer, Scorer};
pub use processing::segment::{RuleSegmenter, Segmenter};
