use std::collections::HashMap;

use crate::config::ProfileConfig;
use crate::domain::Segment;
use crate::pipeline::processing::profile::ProfileMatcher;

use super::SegmentedLead;

/// Aggregates for one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummaryRow {
    pub segment: Segment,
    pub lead_count: usize,
    pub avg_score: f64,
    pub valid_email_pct: f64,
    pub icp_positive_pct: f64,
    pub top_company_size_tier: Option<String>,
    pub top_channel: Option<String>,
    pub top_industries: Vec<String>,
    pub top_job_functions: Vec<String>,
    pub top_regions: Vec<String>,
}

/// One row per non-empty segment, ordered by segment rank then mean score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentSummary {
    pub rows: Vec<SegmentSummaryRow>,
}

impl SegmentSummary {
    pub fn build(leads: &[SegmentedLead], profile: &ProfileConfig, top_n: usize) -> Self {
        let matcher = ProfileMatcher::new(profile);

        let mut groups: Vec<(Segment, Vec<&SegmentedLead>)> = Vec::new();
        for lead in leads {
            match groups.iter_mut().find(|(segment, _)| *segment == lead.segment) {
                Some((_, members)) => members.push(lead),
                None => groups.push((lead.segment, vec![lead])),
            }
        }

        let mut rows: Vec<SegmentSummaryRow> = groups
            .into_iter()
            .map(|(segment, members)| {
                let count = members.len();
                let score_sum: f64 = members.iter().map(|m| m.score()).sum();
                let valid = members
                    .iter()
                    .filter(|m| m.scored_lead.lead.email_status().is_usable())
                    .count();
                let positive = members
                    .iter()
                    .filter(|m| {
                        let lead = &m.scored_lead.lead;
                        lead.enrichment.icp_fit().is_some_and(|fit| fit.is_positive())
                            || matcher.is_in_profile_industry(&lead.industry)
                    })
                    .count();

                let size_tiers = members.iter().map(|m| {
                    let lead = &m.scored_lead.lead;
                    lead.enrichment
                        .company_size_tier
                        .clone()
                        .or_else(|| matcher.size_tier(&lead.company_size).map(|t| t.label().to_string()))
                        .unwrap_or_default()
                });
                let channels = members.iter().map(|m| {
                    m.scored_lead
                        .lead
                        .enrichment
                        .suggested_primary_channel
                        .clone()
                        .unwrap_or_default()
                });
                let industries = members.iter().map(|m| m.scored_lead.lead.industry.clone());
                let functions = members
                    .iter()
                    .map(|m| m.scored_lead.lead.enrichment.job_function.clone().unwrap_or_default());
                let regions = members
                    .iter()
                    .map(|m| m.scored_lead.lead.enrichment.region.clone().unwrap_or_default());

                SegmentSummaryRow {
                    segment,
                    lead_count: count,
                    avg_score: round2(score_sum / count as f64),
                    valid_email_pct: percentage(valid, count),
                    icp_positive_pct: percentage(positive, count),
                    top_company_size_tier: top_values(size_tiers, 1).into_iter().next(),
                    top_channel: top_values(channels, 1).into_iter().next(),
                    top_industries: top_values(industries, top_n),
                    top_job_functions: top_values(functions, top_n),
                    top_regions: top_values(regions, top_n),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.segment
                .rank()
                .cmp(&b.segment.rank())
                .then_with(|| b.avg_score.total_cmp(&a.avg_score))
        });

        Self { rows }
    }

    /// Sum of lead counts over all segments
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.lead_count).sum()
    }

    pub fn row(&self, segment: Segment) -> Option<&SegmentSummaryRow> {
        self.rows.iter().find(|r| r.segment == segment)
    }

    pub fn count_for(&self, segment: Segment) -> usize {
        self.row(segment).map(|r| r.lead_count).unwrap_or(0)
    }
}

/// Most frequent non-empty values, ties kept in first-seen order
pub fn top_values(values: impl IntoIterator<Item = String>, n: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(n);
    order
}

pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / whole as f64)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnrichmentField, LeadRecord};
    use crate::pipeline::processing::score::{ScoreBreakdown, ScoredLead};

    fn segmented(segment: Segment, score: f64, email: &str, industry: &str) -> SegmentedLead {
        let mut lead = LeadRecord {
            lead_id: format!("{}-{}", segment, score),
            email: email.to_string(),
            industry: industry.to_string(),
            ..Default::default()
        };
        lead.enrichment.set(EnrichmentField::Region, "APAC");
        SegmentedLead {
            scored_lead: ScoredLead {
                lead,
                score,
                breakdown: ScoreBreakdown::default(),
            },
            segment,
            rule: "test",
        }
    }

    #[test]
    fn test_top_values_ties_keep_first_seen_order() {
        let values = ["b", "a", "", "a", "c", "b", "d"].map(String::from);
        assert_eq!(top_values(values, 3), vec!["b", "a", "c"]);
        assert!(top_values(Vec::<String>::new(), 3).is_empty());
    }

    #[test]
    fn test_rows_follow_segment_rank() {
        let leads = vec![
            segmented(Segment::Disqualified, 5.0, "", ""),
            segmented(Segment::Contactable, 40.0, "a@x.io", "Retail"),
            segmented(Segment::Strategic, 90.0, "b@x.io", "Fintech"),
            segmented(Segment::Contactable, 45.0, "bad email", "Retail"),
        ];
        let summary = SegmentSummary::build(&leads, &ProfileConfig::default(), 3);

        let order: Vec<_> = summary.rows.iter().map(|r| r.segment).collect();
        assert_eq!(order, vec![Segment::Strategic, Segment::Contactable, Segment::Disqualified]);
        assert_eq!(summary.total(), leads.len());

        let contactable = summary.row(Segment::Contactable).unwrap();
        assert_eq!(contactable.lead_count, 2);
        assert_eq!(contactable.avg_score, 42.5);
        assert_eq!(contactable.valid_email_pct, 50.0);
        assert_eq!(contactable.icp_positive_pct, 0.0);
        assert_eq!(contactable.top_industries, vec!["Retail"]);
        assert_eq!(contactable.top_regions, vec!["APAC"]);
        assert_eq!(contactable.top_channel, None);

        let strategic = summary.row(Segment::Strategic).unwrap();
        assert_eq!(strategic.icp_positive_pct, 100.0);
        assert_eq!(summary.count_for(Segment::AiPotential), 0);
    }

    #[test]
    fn test_percentage_of_empty_group_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
    }
}
