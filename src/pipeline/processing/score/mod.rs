use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ProfileConfig, ScoringConfig};
use crate::constants::MAX_STRATEGIC_SCORE;
use crate::domain::{IcpFit, LeadRecord, SeniorityBand, SizeTier};
use crate::observability::metrics;
use crate::pipeline::processing::profile::{IndustryFit, ProfileMatcher};
use crate::pipeline::utils::TextUtils;

/// A lead with its strategic score attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLead {
    pub lead: LeadRecord,
    /// Clamped to `[0, MAX_STRATEGIC_SCORE]`, two decimals
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Every additive component of a score, before clamping
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub completeness: f64,
    pub industry: f64,
    pub hub: f64,
    pub seniority: f64,
    pub company_size: f64,
    pub icp_fit: f64,
    pub risk: f64,
    pub status: f64,
}

impl ScoreBreakdown {
    pub fn raw_total(&self) -> f64 {
        self.completeness
            + self.industry
            + self.hub
            + self.seniority
            + self.company_size
            + self.icp_fit
            + self.risk
            + self.status
    }
}

/// Trait for computing a lead's strategic score. Implementations must be a
/// pure function of the lead's own fields.
pub trait Scorer {
    fn score(&self, lead: &LeadRecord) -> ScoredLead;

    fn score_all(&self, leads: Vec<LeadRecord>) -> Vec<ScoredLead> {
        let scored: Vec<ScoredLead> = leads.iter().map(|lead| self.score(lead)).collect();
        if !scored.is_empty() {
            let mean = scored.iter().map(|s| s.score).sum::<f64>() / scored.len() as f64;
            info!("Scored {} leads (mean {:.2})", scored.len(), mean);
        }
        scored
    }
}

/// Additive weighted heuristic scorer
pub struct DefaultScorer {
    profile: ProfileConfig,
    weights: ScoringConfig,
}

impl DefaultScorer {
    pub fn new(profile: ProfileConfig, weights: ScoringConfig) -> Self {
        Self { profile, weights }
    }

    pub fn breakdown(&self, lead: &LeadRecord) -> ScoreBreakdown {
        let matcher = ProfileMatcher::new(&self.profile);
        let w = &self.weights;

        let signals = [
            lead.email_status().is_usable(),
            !lead.industry.trim().is_empty(),
            !lead.job_title.trim().is_empty(),
        ];
        let present = signals.iter().filter(|s| **s).count();
        let completeness = match present {
            0 => 0.0,
            n if n == signals.len() => w.completeness_full,
            _ => w.completeness_partial,
        };

        let industry = match matcher.industry_fit(&lead.industry) {
            IndustryFit::InProfile => w.in_profile_industry,
            IndustryFit::Adjacent => w.adjacent_industry,
            IndustryFit::Outside => 0.0,
        };

        let hub = if matcher.is_hub(lead) { w.hub_location } else { 0.0 };

        let seniority = match matcher.seniority(lead) {
            Some(SeniorityBand::Executive) => w.executive_seniority,
            Some(SeniorityBand::Director) => w.director_seniority,
            None => 0.0,
        };

        let tier = matcher.size_tier(&lead.company_size).or_else(|| {
            lead.enrichment
                .company_size_tier
                .as_deref()
                .and_then(SizeTier::from_label)
        });
        let company_size = match tier {
            Some(SizeTier::Enterprise) => w.enterprise_size,
            Some(SizeTier::MidMarket) => w.mid_market_size,
            Some(SizeTier::Smb) => w.smb_size,
            Some(SizeTier::StartupOrMicro) => w.startup_size,
            None => 0.0,
        };

        let icp_fit = match lead.enrichment.icp_fit() {
            Some(IcpFit::High) => w.icp_high,
            Some(IcpFit::Medium) => w.icp_medium,
            Some(IcpFit::Low) => w.icp_low,
            None => 0.0,
        };

        let risk = if lead.enrichment.risk_flag.is_some() {
            -w.risk_penalty
        } else {
            0.0
        };

        let status_key = TextUtils::lookup_key(&lead.lead_status);
        let engaged = !status_key.is_empty()
            && w
                .engaged_statuses
                .iter()
                .any(|s| TextUtils::lookup_key(s) == status_key);
        let status = if engaged { w.engaged_status_bonus } else { 0.0 };

        ScoreBreakdown {
            completeness,
            industry,
            hub,
            seniority,
            company_size,
            icp_fit,
            risk,
            status,
        }
    }
}

impl Scorer for DefaultScorer {
    fn score(&self, lead: &LeadRecord) -> ScoredLead {
        let breakdown = self.breakdown(lead);
        let score = clamp_score(breakdown.raw_total());
        metrics::score::score_recorded(score);
        debug!(lead_id = %lead.lead_id, score, ?breakdown, "Scored lead");
        ScoredLead {
            lead: lead.clone(),
            score,
            breakdown,
        }
    }
}

impl Default for DefaultScorer {
    fn default() -> Self {
        Self::new(ProfileConfig::default(), ScoringConfig::default())
    }
}

/// Clamp into the score range and round to two decimals
pub fn clamp_score(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    let clamped = raw.clamp(0.0, MAX_STRATEGIC_SCORE);
    (clamped * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnrichmentField;

    fn lead() -> LeadRecord {
        LeadRecord {
            lead_id: "1".to_string(),
            full_name: "Ana Lim".to_string(),
            company_name: "PayGrid".to_string(),
            email: "ana@paygrid.io".to_string(),
            industry: "Fintech".to_string(),
            country: "Singapore".to_string(),
            job_title: "Head of Payments".to_string(),
            seniority_level: "VP".to_string(),
            lead_status: "New".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_profile_lead_without_enrichment() {
        let scored = DefaultScorer::default().score(&lead());
        assert_eq!(scored.breakdown.completeness, 20.0);
        assert_eq!(scored.breakdown.industry, 20.0);
        assert_eq!(scored.breakdown.hub, 15.0);
        assert_eq!(scored.breakdown.seniority, 20.0);
        assert_eq!(scored.score, 75.0);
    }

    #[test]
    fn test_enrichment_adjustments() {
        let mut input = lead();
        input.company_size = "201-500".to_string();
        input.enrichment.set(EnrichmentField::IcpFitLabel, "High");
        input.enrichment.set(EnrichmentField::RiskFlag, "Personal email domain");
        input.lead_status = "Engaged".to_string();

        let scored = DefaultScorer::default().score(&input);
        assert_eq!(scored.breakdown.company_size, 10.0);
        assert_eq!(scored.breakdown.icp_fit, 8.0);
        assert_eq!(scored.breakdown.risk, -10.0);
        assert_eq!(scored.breakdown.status, 5.0);
        assert_eq!(scored.score, 88.0);
    }

    #[test]
    fn test_partial_and_empty_completeness() {
        let sparse = LeadRecord {
            lead_id: "2".to_string(),
            full_name: "Bo".to_string(),
            job_title: "Analyst".to_string(),
            ..Default::default()
        };
        let scored = DefaultScorer::default().score(&sparse);
        assert_eq!(scored.breakdown.completeness, 10.0);
        assert_eq!(scored.score, 10.0);

        let empty = LeadRecord::default();
        assert_eq!(DefaultScorer::default().score(&empty).score, 0.0);
    }

    #[test]
    fn test_score_is_clamped_to_range() {
        let mut input = lead();
        input.enrichment.set(EnrichmentField::IcpFitLabel, "Low");
        input.enrichment.set(EnrichmentField::RiskFlag, "Missing email");
        input.email.clear();
        input.industry.clear();
        input.country.clear();
        input.seniority_level.clear();
        input.job_title.clear();
        assert_eq!(DefaultScorer::default().score(&input).score, 0.0);

        let weights = ScoringConfig {
            in_profile_industry: 90.0,
            ..Default::default()
        };
        let scorer = DefaultScorer::new(ProfileConfig::default(), weights);
        assert_eq!(scorer.score(&lead()).score, MAX_STRATEGIC_SCORE);
    }

    #[test]
    fn test_scoring_is_repeatable() {
        let scorer = DefaultScorer::default();
        let first = scorer.score(&lead());
        let second = scorer.score(&first.lead);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
    }

    #[test]
    fn test_clamp_rounds_to_two_decimals() {
        assert_eq!(clamp_score(33.3333), 33.33);
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }
}
