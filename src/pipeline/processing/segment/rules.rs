use crate::config::{ProfileConfig, SegmentationConfig};
use crate::domain::{IcpFit, Segment};
use crate::pipeline::processing::profile::ProfileMatcher;
use crate::pipeline::processing::score::ScoredLead;

/// Per-lead facts the rules are evaluated against
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSignals {
    pub score: f64,
    pub disqualifying_risk: bool,
    pub email_usable: bool,
    pub in_profile_industry: bool,
    pub in_profile_function: bool,
    pub hub: bool,
    pub icp_fit: Option<IcpFit>,
}

impl SegmentSignals {
    pub fn collect(scored: &ScoredLead, profile: &ProfileConfig, config: &SegmentationConfig) -> Self {
        let matcher = ProfileMatcher::new(profile);
        let lead = &scored.lead;

        let disqualifying_risk = lead.enrichment.risk_flag.as_deref().is_some_and(|flag| {
            let flag = flag.to_lowercase();
            config
                .disqualifying_risk_keywords
                .iter()
                .any(|k| !k.trim().is_empty() && flag.contains(&k.to_lowercase()))
        });

        Self {
            score: scored.score,
            disqualifying_risk,
            email_usable: lead.email_status().is_usable(),
            in_profile_industry: matcher.is_in_profile_industry(&lead.industry),
            in_profile_function: matcher.is_in_profile_function(lead.enrichment.job_function.as_deref())
                || matcher.seniority(lead).is_some(),
            hub: matcher.is_hub(lead),
            icp_fit: lead.enrichment.icp_fit(),
        }
    }
}

/// One guard in the ordered cascade
pub struct SegmentRule {
    pub name: &'static str,
    pub segment: Segment,
    pub predicate: fn(&SegmentSignals, &SegmentationConfig) -> bool,
}

impl SegmentRule {
    pub fn matches(&self, signals: &SegmentSignals, config: &SegmentationConfig) -> bool {
        (self.predicate)(signals, config)
    }
}

/// Evaluated top to bottom; the first matching rule decides. The last rule
/// always matches.
pub const SEGMENT_RULES: &[SegmentRule] = &[
    SegmentRule {
        name: "disqualifying_risk",
        segment: Segment::Disqualified,
        predicate: |s, c| s.disqualifying_risk || (!s.email_usable && s.score <= c.low_priority_cutoff),
    },
    SegmentRule {
        name: "strategic_core",
        segment: Segment::Strategic,
        predicate: |s, c| {
            s.score >= c.high_threshold
                && s.in_profile_industry
                && s.in_profile_function
                && s.email_usable
                && (s.hub || s.icp_fit == Some(IcpFit::High))
        },
    },
    SegmentRule {
        name: "standard_icp",
        segment: Segment::StandardIcp,
        predicate: |s, c| {
            s.score >= c.mid_threshold
                && s.in_profile_industry
                && s.email_usable
                && (s.hub || s.in_profile_function || s.icp_fit == Some(IcpFit::Medium))
        },
    },
    SegmentRule {
        name: "contactable_off_profile",
        segment: Segment::Contactable,
        predicate: |s, c| s.email_usable && !s.in_profile_industry && s.score >= c.contactable_threshold,
    },
    SegmentRule {
        name: "ai_potential",
        segment: Segment::AiPotential,
        predicate: |s, c| s.icp_fit.is_some_and(|fit| fit.is_positive()) && s.score >= c.minimal_threshold,
    },
    SegmentRule {
        name: "fallback_contactable",
        segment: Segment::Contactable,
        predicate: |s, c| s.email_usable && s.score > c.residual_floor,
    },
    SegmentRule {
        name: "fallback_disqualified",
        segment: Segment::Disqualified,
        predicate: |_, _| true,
    },
];

/// First rule that matches, which always exists
pub fn first_match<'r>(
    rules: &'r [SegmentRule],
    signals: &SegmentSignals,
    config: &SegmentationConfig,
) -> Option<&'r SegmentRule> {
    rules.iter().find(|rule| rule.matches(signals, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> SegmentSignals {
        SegmentSignals {
            score: 80.0,
            disqualifying_risk: false,
            email_usable: true,
            in_profile_industry: true,
            in_profile_function: true,
            hub: true,
            icp_fit: None,
        }
    }

    fn decide(signals: &SegmentSignals) -> &'static str {
        let config = SegmentationConfig::default();
        first_match(SEGMENT_RULES, signals, &config).unwrap().name
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<_> = SEGMENT_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "disqualifying_risk",
                "strategic_core",
                "standard_icp",
                "contactable_off_profile",
                "ai_potential",
                "fallback_contactable",
                "fallback_disqualified",
            ]
        );
    }

    #[test]
    fn test_each_rule_reachable() {
        assert_eq!(decide(&signals()), "strategic_core");

        let s = SegmentSignals { disqualifying_risk: true, ..signals() };
        assert_eq!(decide(&s), "disqualifying_risk");

        let s = SegmentSignals { score: 20.0, email_usable: false, ..signals() };
        assert_eq!(decide(&s), "disqualifying_risk");

        let s = SegmentSignals { score: 60.0, ..signals() };
        assert_eq!(decide(&s), "standard_icp");

        let s = SegmentSignals { score: 40.0, in_profile_industry: false, ..signals() };
        assert_eq!(decide(&s), "contactable_off_profile");

        let s = SegmentSignals {
            score: 30.0,
            email_usable: false,
            icp_fit: Some(IcpFit::Medium),
            ..signals()
        };
        assert_eq!(decide(&s), "ai_potential");

        let s = SegmentSignals { score: 30.0, ..signals() };
        assert_eq!(decide(&s), "fallback_contactable");

        let s = SegmentSignals { score: 30.0, email_usable: false, ..signals() };
        assert_eq!(decide(&s), "fallback_disqualified");
    }

    #[test]
    fn test_earlier_rule_shadows_later_one() {
        // Satisfies both standard_icp and ai_potential
        let s = SegmentSignals {
            score: 55.0,
            hub: false,
            in_profile_function: false,
            icp_fit: Some(IcpFit::Medium),
            ..signals()
        };
        assert_eq!(decide(&s), "standard_icp");
    }

    #[test]
    fn test_strategic_without_hub_needs_high_fit() {
        let s = SegmentSignals { hub: false, ..signals() };
        assert_eq!(decide(&s), "standard_icp");

        let s = SegmentSignals { hub: false, icp_fit: Some(IcpFit::High), ..signals() };
        assert_eq!(decide(&s), "strategic_core");
    }

    #[test]
    fn test_residual_floor_is_strict() {
        let s = SegmentSignals {
            score: 0.0,
            in_profile_industry: false,
            ..signals()
        };
        assert_eq!(decide(&s), "fallback_disqualified");
    }
}
