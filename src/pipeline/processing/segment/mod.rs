use tracing::{debug, info};

use crate::config::{ProfileConfig, SegmentationConfig};
use crate::domain::Segment;
use crate::observability::metrics;
use crate::pipeline::processing::score::ScoredLead;

pub mod rules;
pub mod summary;

pub use rules::{SegmentRule, SegmentSignals, SEGMENT_RULES};
pub use summary::{SegmentSummary, SegmentSummaryRow};

/// A scored lead with the segment it was assigned and the rule that fired
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedLead {
    pub scored_lead: ScoredLead,
    pub segment: Segment,
    pub rule: &'static str,
}

impl SegmentedLead {
    pub fn score(&self) -> f64 {
        self.scored_lead.score
    }
}

/// Trait for assigning segments and summarising the result
pub trait Segmenter {
    fn classify(&self, lead: &ScoredLead) -> SegmentedLead;

    fn summarize(&self, leads: &[SegmentedLead]) -> SegmentSummary;

    fn segment_all(&self, leads: Vec<ScoredLead>) -> (Vec<SegmentedLead>, SegmentSummary) {
        let segmented: Vec<SegmentedLead> = leads.iter().map(|lead| self.classify(lead)).collect();
        let summary = self.summarize(&segmented);
        info!(
            leads = segmented.len(),
            segments = summary.rows.len(),
            "Segmented leads"
        );
        (segmented, summary)
    }
}

/// Ordered rule cascade segmenter
pub struct RuleSegmenter {
    profile: ProfileConfig,
    config: SegmentationConfig,
    rules: &'static [SegmentRule],
}

impl RuleSegmenter {
    pub fn new(profile: ProfileConfig, config: SegmentationConfig) -> Self {
        Self {
            profile,
            config,
            rules: SEGMENT_RULES,
        }
    }
}

impl Segmenter for RuleSegmenter {
    fn classify(&self, lead: &ScoredLead) -> SegmentedLead {
        let signals = SegmentSignals::collect(lead, &self.profile, &self.config);
        let (segment, rule) = match rules::first_match(self.rules, &signals, &self.config) {
            Some(rule) => (rule.segment, rule.name),
            None => (Segment::Disqualified, "fallback_disqualified"),
        };

        metrics::segment::lead_assigned(segment.label(), rule);
        debug!(lead_id = %lead.lead.lead_id, %segment, rule, "Assigned segment");

        SegmentedLead {
            scored_lead: lead.clone(),
            segment,
            rule,
        }
    }

    fn summarize(&self, leads: &[SegmentedLead]) -> SegmentSummary {
        SegmentSummary::build(leads, &self.profile, self.config.top_n)
    }
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self::new(ProfileConfig::default(), SegmentationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LeadRecord;
    use crate::pipeline::processing::score::{DefaultScorer, Scorer};

    fn score(lead: LeadRecord) -> ScoredLead {
        DefaultScorer::default().score(&lead)
    }

    #[test]
    fn test_strategic_profile_lead() {
        let lead = score(LeadRecord {
            lead_id: "1".to_string(),
            email: "ana@paygrid.io".to_string(),
            industry: "Fintech".to_string(),
            seniority_level: "VP".to_string(),
            country: "Singapore".to_string(),
            job_title: "VP Payments".to_string(),
            ..Default::default()
        });
        assert!(lead.score >= SegmentationConfig::default().high_threshold);

        let segmented = RuleSegmenter::default().classify(&lead);
        assert_eq!(segmented.segment, Segment::Strategic);
        assert_eq!(segmented.rule, "strategic_core");
    }

    #[test]
    fn test_empty_contact_is_disqualified() {
        let lead = score(LeadRecord {
            lead_id: "2".to_string(),
            full_name: "Bo".to_string(),
            ..Default::default()
        });
        let segmented = RuleSegmenter::default().classify(&lead);
        assert_eq!(segmented.segment, Segment::Disqualified);
        assert_eq!(segmented.rule, "disqualifying_risk");
    }

    #[test]
    fn test_segment_all_partitions_records() {
        let leads: Vec<ScoredLead> = (0..6)
            .map(|i| {
                score(LeadRecord {
                    lead_id: i.to_string(),
                    email: if i % 2 == 0 { format!("l{}@x.io", i) } else { String::new() },
                    industry: if i % 3 == 0 { "Fintech".to_string() } else { "Retail".to_string() },
                    job_title: "Director".to_string(),
                    ..Default::default()
                })
            })
            .collect();

        let (segmented, summary) = RuleSegmenter::default().segment_all(leads);
        assert_eq!(segmented.len(), 6);
        assert_eq!(summary.total(), 6);
    }
}
