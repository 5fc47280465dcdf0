use tracing::{debug, info};

use crate::config::{EnrichmentConfig, ProfileConfig};
use crate::domain::{EmailStatus, Enrichment, EnrichmentField, IcpFit, LeadRecord, SeniorityBand};
use crate::observability::metrics;
use crate::pipeline::processing::profile::{IndustryFit, ProfileMatcher};
use crate::pipeline::utils::TextUtils;

/// Trait for attaching descriptive enrichment fields to normalized leads
pub trait Enricher {
    /// Return the lead with absent enrichment fields filled in. Values the
    /// input already supplied are never replaced.
    fn enrich(&self, lead: &LeadRecord) -> LeadRecord;

    fn enrich_all(&self, leads: &[LeadRecord]) -> Vec<LeadRecord> {
        let enriched: Vec<LeadRecord> = leads.iter().map(|lead| self.enrich(lead)).collect();
        metrics::enrich::records_enriched(enriched.len());
        info!("Enriched {} leads", enriched.len());
        enriched
    }
}

/// Deterministic enricher driven by local rule tables
pub struct RuleEnricher {
    profile: ProfileConfig,
    config: EnrichmentConfig,
}

impl RuleEnricher {
    pub fn new(profile: ProfileConfig, config: EnrichmentConfig) -> Self {
        Self { profile, config }
    }

    fn matcher(&self) -> ProfileMatcher<'_> {
        ProfileMatcher::new(&self.profile)
    }

    fn derive_region(&self, lead: &LeadRecord) -> Option<String> {
        self.config
            .region_by_country
            .get(&TextUtils::lookup_key(&lead.country))
            .cloned()
    }

    fn derive_job_function(&self, lead: &LeadRecord) -> Option<String> {
        if lead.job_title.trim().is_empty() {
            return None;
        }
        let function = self
            .config
            .job_functions
            .iter()
            .find(|rule| TextUtils::contains_any_keyword(&lead.job_title, &rule.keywords))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| self.config.default_job_function.clone());
        Some(function)
    }

    /// Points-based fit label plus the signals that produced it
    fn derive_icp_fit(&self, lead: &LeadRecord) -> (IcpFit, String) {
        let matcher = self.matcher();
        let mut points = 0;
        let mut reasons = Vec::new();

        match matcher.industry_fit(&lead.industry) {
            IndustryFit::InProfile => {
                points += 2;
                reasons.push(format!("In-profile industry ({})", lead.industry));
            }
            IndustryFit::Adjacent => {
                points += 1;
                reasons.push(format!("Adjacent industry ({})", lead.industry));
            }
            IndustryFit::Outside => {}
        }
        if let Some(band) = matcher.seniority(lead) {
            points += 1;
            reasons.push(format!("{} seniority", band.label()));
        }
        if matcher.is_hub(lead) {
            points += 1;
            reasons.push(format!("Hub location ({})", lead.country));
        }

        let fit = match points {
            p if p >= 3 => IcpFit::High,
            2 => IcpFit::Medium,
            _ => IcpFit::Low,
        };
        let reason = if reasons.is_empty() {
            "No profile signals".to_string()
        } else {
            reasons.join("; ")
        };
        (fit, reason)
    }

    fn derive_risk_flag(&self, lead: &LeadRecord) -> Option<String> {
        let mut flags = Vec::new();

        match lead.email_status() {
            EmailStatus::Empty => flags.push("Missing email"),
            EmailStatus::Invalid => flags.push("Invalid email format"),
            EmailStatus::Valid => {
                let domain = lead.email.rsplit('@').next().unwrap_or("");
                if self
                    .config
                    .personal_email_domains
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(domain))
                {
                    flags.push("Personal email domain");
                }
            }
        }

        let status = TextUtils::lookup_key(&lead.lead_status);
        if !status.is_empty()
            && self
                .config
                .disqualified_statuses
                .iter()
                .any(|s| TextUtils::lookup_key(s) == status)
        {
            flags.push("Disqualified lead status");
        }

        if flags.is_empty() {
            None
        } else {
            Some(flags.join("; "))
        }
    }

    fn derive_channel(&self, lead: &LeadRecord) -> String {
        let valid_email = lead.email_status().is_usable();
        let executive = self.matcher().seniority(lead) == Some(SeniorityBand::Executive);
        let channel = if valid_email && executive {
            &self.config.executive_channel
        } else if valid_email {
            &self.config.email_channel
        } else {
            &self.config.fallback_channel
        };
        channel.clone()
    }

    fn build_notes(&self, lead: &LeadRecord) -> String {
        let company = non_empty(&lead.company_name).unwrap_or("The company");
        let industry = non_empty(&lead.industry).unwrap_or("their industry");
        let role = non_empty(&lead.job_title).unwrap_or("their team");

        let mut parts = vec![format!(
            "{} operates in {} and {} likely deals with manual workflows and slow pipeline visibility. \
             A message focused on automation and clearer go-to-market execution will resonate.",
            company, industry, role
        )];
        for (label, values) in [
            ("Pain points", &self.config.pain_points),
            ("Signals", &self.config.maturity_signals),
            ("Value drivers", &self.config.value_drivers),
            ("Risks", &self.config.risk_factors),
        ] {
            if !values.is_empty() {
                parts.push(format!("{}: {}", label, values.join(", ")));
            }
        }
        let enrichment = &lead.enrichment;
        if let Some(label) = enrichment.icp_fit_label.as_deref() {
            parts.push(format!("ICP fit. {}", label));
        }
        if let Some(reason) = enrichment.icp_fit_reason.as_deref() {
            parts.push(reason.to_string());
        }
        if let Some(risk) = enrichment.risk_flag.as_deref() {
            parts.push(format!("Risk. {}", risk));
        }
        if let Some(channel) = enrichment.suggested_primary_channel.as_deref() {
            parts.push(format!("Channel. {}", channel));
        }
        parts.join(" | ")
    }

    /// Fill one field at a time so later rules see earlier results
    fn fill(lead: &mut LeadRecord, field: EnrichmentField, value: Option<String>) {
        if lead.enrichment.get(field).is_some() {
            return;
        }
        if let Some(value) = value {
            let mut derived = Enrichment::default();
            derived.set(field, value);
            lead.enrichment = lead.enrichment.merged_with(&derived);
        }
    }
}

impl Enricher for RuleEnricher {
    fn enrich(&self, lead: &LeadRecord) -> LeadRecord {
        let mut enriched = lead.clone();

        let region = self.derive_region(&enriched);
        Self::fill(&mut enriched, EnrichmentField::Region, region);

        let tier = self
            .matcher()
            .size_tier(&enriched.company_size)
            .map(|tier| tier.label().to_string());
        Self::fill(&mut enriched, EnrichmentField::CompanySizeTier, tier);

        let function = self.derive_job_function(&enriched);
        Self::fill(&mut enriched, EnrichmentField::JobFunction, function);

        let (fit, reason) = self.derive_icp_fit(&enriched);
        Self::fill(&mut enriched, EnrichmentField::IcpFitLabel, Some(fit.label().to_string()));
        Self::fill(&mut enriched, EnrichmentField::IcpFitReason, Some(reason));

        let risk = self.derive_risk_flag(&enriched);
        Self::fill(&mut enriched, EnrichmentField::RiskFlag, risk);

        let channel = self.derive_channel(&enriched);
        Self::fill(&mut enriched, EnrichmentField::SuggestedPrimaryChannel, Some(channel));

        let notes = self.build_notes(&enriched);
        Self::fill(&mut enriched, EnrichmentField::AiNotes, Some(notes));

        debug!(
            lead_id = %enriched.lead_id,
            icp_fit = ?enriched.enrichment.icp_fit_label,
            risk = ?enriched.enrichment.risk_flag,
            "Enriched lead"
        );
        enriched
    }
}

impl Default for RuleEnricher {
    fn default() -> Self {
        Self::new(ProfileConfig::default(), EnrichmentConfig::default())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategic_lead() -> LeadRecord {
        LeadRecord {
            lead_id: "1".to_string(),
            full_name: "Ana Lim".to_string(),
            company_name: "PayGrid".to_string(),
            email: "ana@paygrid.io".to_string(),
            industry: "Fintech".to_string(),
            company_size: "1001-5000".to_string(),
            country: "Singapore".to_string(),
            job_title: "VP Engineering".to_string(),
            seniority_level: "VP".to_string(),
            lead_status: "New".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_derives_all_fields_for_profile_lead() {
        let lead = RuleEnricher::default().enrich(&strategic_lead());
        let e = &lead.enrichment;

        assert_eq!(e.region.as_deref(), Some("APAC"));
        assert_eq!(e.company_size_tier.as_deref(), Some("Enterprise"));
        assert_eq!(e.job_function.as_deref(), Some("Technology"));
        assert_eq!(e.icp_fit_label.as_deref(), Some("High"));
        assert!(e.icp_fit_reason.as_deref().unwrap().contains("In-profile industry"));
        assert!(e.risk_flag.is_none());
        assert_eq!(e.suggested_primary_channel.as_deref(), Some("Executive email + LinkedIn"));

        let notes = e.ai_notes.as_deref().unwrap();
        assert!(notes.starts_with("PayGrid operates in Fintech"));
        assert!(notes.contains("ICP fit. High"));
        assert!(notes.contains("Channel. Executive email + LinkedIn"));
        assert!(!notes.contains("Risk."));
    }

    #[test]
    fn test_supplied_values_are_not_overwritten() {
        let mut input = strategic_lead();
        input.enrichment.set(EnrichmentField::IcpFitLabel, "Low");
        input.enrichment.set(EnrichmentField::Region, "Custom");

        let lead = RuleEnricher::default().enrich(&input);
        assert_eq!(lead.enrichment.icp_fit_label.as_deref(), Some("Low"));
        assert_eq!(lead.enrichment.region.as_deref(), Some("Custom"));
        assert!(lead.enrichment.ai_notes.as_deref().unwrap().contains("ICP fit. Low"));
    }

    #[test]
    fn test_risk_flags_are_joined() {
        let input = LeadRecord {
            email: "ana at gmail".to_string(),
            lead_status: "Lost".to_string(),
            ..strategic_lead()
        };
        let lead = RuleEnricher::default().enrich(&input);
        assert_eq!(
            lead.enrichment.risk_flag.as_deref(),
            Some("Invalid email format; Disqualified lead status")
        );
        assert_eq!(lead.enrichment.suggested_primary_channel.as_deref(), Some("LinkedIn outreach"));

        let personal = LeadRecord {
            email: "ana@Gmail.com".to_string(),
            ..strategic_lead()
        };
        let lead = RuleEnricher::default().enrich(&personal);
        assert_eq!(lead.enrichment.risk_flag.as_deref(), Some("Personal email domain"));
    }

    #[test]
    fn test_sparse_lead_gets_low_fit_and_no_function() {
        let input = LeadRecord {
            lead_id: "9".to_string(),
            full_name: "Bo".to_string(),
            ..Default::default()
        };
        let lead = RuleEnricher::default().enrich(&input);
        assert_eq!(lead.enrichment.icp_fit_label.as_deref(), Some("Low"));
        assert_eq!(lead.enrichment.icp_fit_reason.as_deref(), Some("No profile signals"));
        assert!(lead.enrichment.job_function.is_none());
        assert!(lead.enrichment.region.is_none());
        assert_eq!(lead.enrichment.risk_flag.as_deref(), Some("Missing email"));
    }

    #[test]
    fn test_notes_carry_fixed_sections_in_order() {
        let lead = RuleEnricher::default().enrich(&strategic_lead());
        let notes = lead.enrichment.ai_notes.unwrap();

        let sections: Vec<&str> = notes.split(" | ").collect();
        assert_eq!(sections[1], "Pain points: manual reporting and fragmented data, slow outbound cycles");
        assert_eq!(sections[2], "Signals: signs of growth or recent hiring");
        assert_eq!(
            sections[3],
            "Value drivers: workflow automation, pipeline visibility, AI-assisted prioritization"
        );
        assert_eq!(sections[4], "Risks: unclear decision-maker");
        assert_eq!(sections[5], "ICP fit. High");
    }

    #[test]
    fn test_empty_note_sections_are_omitted() {
        let config = EnrichmentConfig {
            pain_points: Vec::new(),
            risk_factors: Vec::new(),
            ..Default::default()
        };
        let lead = RuleEnricher::new(ProfileConfig::default(), config).enrich(&strategic_lead());
        let notes = lead.enrichment.ai_notes.unwrap();

        assert!(!notes.contains("Pain points:"));
        assert!(!notes.contains("Risks:"));
        assert!(notes.contains("Signals: signs of growth or recent hiring"));
    }

    #[test]
    fn test_unknown_title_defaults_to_general() {
        let input = LeadRecord {
            job_title: "Office Wrangler".to_string(),
            ..strategic_lead()
        };
        let lead = RuleEnricher::default().enrich(&input);
        assert_eq!(lead.enrichment.job_function.as_deref(), Some("General"));
    }
}
