use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{CanonicalField, SeniorityBand, Segment, SizeTier};
use crate::error::{PipelineError, Result};

/// Complete configuration for one pipeline run. Every section falls back to
/// its defaults when omitted from the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub profile: ProfileConfig,
    pub normalizer: NormalizerConfig,
    pub enrichment: EnrichmentConfig,
    pub scoring: ScoringConfig,
    pub segmentation: SegmentationConfig,
    pub report: ReportConfig,
}

impl PipelineConfig {
    /// Load from a TOML file, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    PipelineError::Config(format!(
                        "Failed to read config file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                toml::from_str(&content)?
            }
            None => PipelineConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if !(seg.high_threshold >= seg.mid_threshold
            && seg.mid_threshold >= seg.contactable_threshold
            && seg.contactable_threshold >= seg.minimal_threshold)
        {
            return Err(PipelineError::Config(format!(
                "segment thresholds must satisfy high >= mid >= contactable >= minimal (got {} / {} / {} / {})",
                seg.high_threshold, seg.mid_threshold, seg.contactable_threshold, seg.minimal_threshold
            )));
        }
        for (name, value) in [
            ("high_threshold", seg.high_threshold),
            ("low_priority_cutoff", seg.low_priority_cutoff),
            ("residual_floor", seg.residual_floor),
        ] {
            if !(0.0..=crate::constants::MAX_STRATEGIC_SCORE).contains(&value) {
                return Err(PipelineError::Config(format!(
                    "segmentation.{} must lie within the score range, got {}",
                    name, value
                )));
            }
        }
        if self.profile.in_profile_industries.is_empty() {
            return Err(PipelineError::Config(
                "profile.in_profile_industries must not be empty".to_string(),
            ));
        }
        if self.profile.seniority_tiers.is_empty() {
            return Err(PipelineError::Config(
                "profile.seniority_tiers must not be empty".to_string(),
            ));
        }
        let size = &self.profile.company_size;
        if !(size.enterprise_min > size.mid_market_min && size.mid_market_min > size.smb_min) {
            return Err(PipelineError::Config(
                "profile.company_size thresholds must be strictly descending".to_string(),
            ));
        }
        for (field, value) in self.normalizer.header_aliases.iter() {
            if CanonicalField::from_column_name(value).is_none()
                && !crate::domain::EnrichmentField::ALL
                    .iter()
                    .any(|f| f.column_name() == value)
            {
                return Err(PipelineError::Config(format!(
                    "header alias '{}' maps to unknown column '{}'",
                    field, value
                )));
            }
        }
        if self.report.excerpt_limit == 0 || self.report.top_leads_limit == 0 {
            return Err(PipelineError::Config(
                "report excerpt limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ideal customer profile shared by enrichment, scoring and segmentation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub in_profile_industries: Vec<String>,
    pub adjacent_industries: Vec<String>,
    /// Countries or regions treated as strategic hubs
    pub hub_locations: Vec<String>,
    /// Job functions considered decision-making for the offer
    pub in_profile_functions: Vec<String>,
    /// Ordered keyword tiers; the first tier with a matching keyword wins
    pub seniority_tiers: Vec<SeniorityTierConfig>,
    pub company_size: CompanySizeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeniorityTierConfig {
    pub band: SeniorityBand,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompanySizeConfig {
    /// Exact bracket text (lookup key) to tier
    pub brackets: HashMap<String, SizeTier>,
    pub enterprise_min: u64,
    pub mid_market_min: u64,
    pub smb_min: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            in_profile_industries: strings(&["Fintech", "Cybersecurity", "IT Services", "SaaS"]),
            adjacent_industries: strings(&[
                "Banking",
                "Financial Services",
                "Insurance",
                "Software",
                "Telecommunications",
                "Healthcare",
            ]),
            hub_locations: strings(&[
                "Singapore",
                "United States",
                "United Kingdom",
                "United Arab Emirates",
            ]),
            in_profile_functions: strings(&["Security", "Technology", "Finance", "Executive"]),
            seniority_tiers: vec![
                SeniorityTierConfig {
                    band: SeniorityBand::Executive,
                    keywords: strings(&[
                        "c-level",
                        "c-suite",
                        "chief",
                        "ceo",
                        "cto",
                        "cfo",
                        "cio",
                        "ciso",
                        "coo",
                        "founder",
                        "co-founder",
                        "president",
                        "vp",
                        "vice president",
                        "svp",
                        "evp",
                        "owner",
                        "partner",
                    ]),
                },
                SeniorityTierConfig {
                    band: SeniorityBand::Director,
                    keywords: strings(&["director", "head", "lead", "principal"]),
                },
            ],
            company_size: CompanySizeConfig::default(),
        }
    }
}

impl Default for CompanySizeConfig {
    fn default() -> Self {
        let brackets = [
            ("1-10", SizeTier::StartupOrMicro),
            ("11-50", SizeTier::StartupOrMicro),
            ("startup", SizeTier::StartupOrMicro),
            ("micro", SizeTier::StartupOrMicro),
            ("51-200", SizeTier::Smb),
            ("smb", SizeTier::Smb),
            ("small", SizeTier::Smb),
            ("200-500", SizeTier::MidMarket),
            ("201-500", SizeTier::MidMarket),
            ("mid market", SizeTier::MidMarket),
            ("mid-market", SizeTier::MidMarket),
            ("midmarket", SizeTier::MidMarket),
            ("500+", SizeTier::Enterprise),
            ("501-1000", SizeTier::Enterprise),
            ("1000+", SizeTier::Enterprise),
            ("1001-5000", SizeTier::Enterprise),
            ("5000+", SizeTier::Enterprise),
            ("enterprise", SizeTier::Enterprise),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            brackets,
            enterprise_min: 500,
            mid_market_min: 200,
            smb_min: 50,
        }
    }
}

/// Header alias and category folding tables for the normalizer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Normalized header key to target column name
    pub header_aliases: HashMap<String, String>,
    pub country_aliases: HashMap<String, String>,
    pub industry_aliases: HashMap<String, String>,
    pub seniority_aliases: HashMap<String, String>,
    pub company_size_aliases: HashMap<String, String>,
    /// Drop rows whose company name is empty or shorter than this
    pub min_company_name_len: Option<usize>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            header_aliases: pairs(&[
                ("lead_id", "LeadID"),
                ("id", "LeadID"),
                ("full_name", "FullName"),
                ("name", "FullName"),
                ("contact_name", "FullName"),
                ("contact", "FullName"),
                ("company", "CompanyName"),
                ("company_name", "CompanyName"),
                ("biz", "CompanyName"),
                ("business_name", "CompanyName"),
                ("organization", "CompanyName"),
                ("organisation", "CompanyName"),
                ("account", "CompanyName"),
                ("mail", "Email"),
                ("email_address", "Email"),
                ("e_mail", "Email"),
                ("work_email", "Email"),
                ("industry_sector", "Industry"),
                ("sector", "Industry"),
                ("vertical", "Industry"),
                ("company_size", "CompanySize"),
                ("size", "CompanySize"),
                ("employees", "CompanySize"),
                ("headcount", "CompanySize"),
                ("country_code", "Country"),
                ("location", "Country"),
                ("nation", "Country"),
                ("job_title", "JobTitle"),
                ("title", "JobTitle"),
                ("role", "JobTitle"),
                ("position", "JobTitle"),
                ("seniority", "SeniorityLevel"),
                ("seniority_level", "SeniorityLevel"),
                ("level", "SeniorityLevel"),
                ("status", "LeadStatus"),
                ("lead_status", "LeadStatus"),
                ("priority", "PriorityScore"),
                ("priority_score", "PriorityScore"),
                ("icp_fit", "ICPFitLabel"),
                ("icp_fit_label", "ICPFitLabel"),
                ("icp_fit_reason", "ICPFitReason"),
                ("risk", "RiskFlag"),
                ("risk_flag", "RiskFlag"),
                ("channel", "SuggestedPrimaryChannel"),
                ("suggested_primary_channel", "SuggestedPrimaryChannel"),
                ("notes", "AI_Notes"),
                ("ai_notes", "AI_Notes"),
                ("company_size_tier", "CompanySizeTier"),
                ("job_function", "JobFunction"),
            ]),
            country_aliases: pairs(&[
                ("usa", "United States"),
                ("us", "United States"),
                ("u.s.", "United States"),
                ("u.s", "United States"),
                ("u.s.a.", "United States"),
                ("united states of america", "United States"),
                ("america", "United States"),
                ("uk", "United Kingdom"),
                ("u.k.", "United Kingdom"),
                ("gb", "United Kingdom"),
                ("great britain", "United Kingdom"),
                ("england", "United Kingdom"),
                ("uae", "United Arab Emirates"),
                ("u.a.e.", "United Arab Emirates"),
                ("sg", "Singapore"),
                ("sgp", "Singapore"),
                ("ksa", "Saudi Arabia"),
                ("saudi", "Saudi Arabia"),
                ("au", "Australia"),
                ("nz", "New Zealand"),
                ("de", "Germany"),
                ("in", "India"),
                ("ph", "Philippines"),
            ]),
            industry_aliases: pairs(&[
                ("fintech", "Fintech"),
                ("fin tech", "Fintech"),
                ("fin-tech", "Fintech"),
                ("financial technology", "Fintech"),
                ("saas", "SaaS"),
                ("software as a service", "SaaS"),
                ("cyber security", "Cybersecurity"),
                ("cyber-security", "Cybersecurity"),
                ("cybersecurity", "Cybersecurity"),
                ("infosec", "Cybersecurity"),
                ("it services", "IT Services"),
                ("it service", "IT Services"),
                ("information technology", "IT Services"),
                ("it", "IT Services"),
                ("telecom", "Telecommunications"),
                ("telco", "Telecommunications"),
                ("finserv", "Financial Services"),
            ]),
            seniority_aliases: pairs(&[
                ("c level", "C-Level"),
                ("c-level", "C-Level"),
                ("clevel", "C-Level"),
                ("c-suite", "C-Level"),
                ("c suite", "C-Level"),
                ("executive", "C-Level"),
                ("vp", "VP"),
                ("vice president", "VP"),
                ("director", "Director"),
                ("head", "Head"),
                ("manager", "Manager"),
                ("senior", "Senior"),
                ("mid", "Mid"),
                ("mid-level", "Mid"),
                ("junior", "Junior"),
                ("entry", "Junior"),
            ]),
            company_size_aliases: pairs(&[
                ("enterprise", "500+"),
                ("1 - 10", "1-10"),
                ("11 - 50", "11-50"),
                ("51 - 200", "51-200"),
                ("201 - 500", "201-500"),
                ("500 +", "500+"),
            ]),
            min_company_name_len: None,
        }
    }
}

/// Rule tables for the local enrichment stage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// Country lookup key to sales region
    pub region_by_country: HashMap<String, String>,
    /// Ordered; the first function with a matching keyword wins
    pub job_functions: Vec<KeywordRuleConfig>,
    pub default_job_function: String,
    pub personal_email_domains: Vec<String>,
    pub disqualified_statuses: Vec<String>,
    pub executive_channel: String,
    pub email_channel: String,
    pub fallback_channel: String,
    /// Fixed note sections appended after the narrative; empty lists are omitted
    pub pain_points: Vec<String>,
    pub maturity_signals: Vec<String>,
    pub value_drivers: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRuleConfig {
    pub label: String,
    pub keywords: Vec<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        let mut region_by_country = HashMap::new();
        for (region, countries) in [
            ("AMER", &["united states", "canada", "mexico", "brazil"][..]),
            (
                "EMEA",
                &[
                    "united kingdom",
                    "united arab emirates",
                    "dubai",
                    "abu dhabi",
                    "qatar",
                    "saudi arabia",
                    "kuwait",
                    "bahrain",
                    "germany",
                    "france",
                    "netherlands",
                    "ireland",
                ][..],
            ),
            (
                "APAC",
                &[
                    "singapore",
                    "australia",
                    "new zealand",
                    "malaysia",
                    "thailand",
                    "vietnam",
                    "philippines",
                    "india",
                    "indonesia",
                    "japan",
                ][..],
            ),
        ] {
            for country in countries {
                region_by_country.insert(country.to_string(), region.to_string());
            }
        }

        let rule = |label: &str, keywords: &[&str]| KeywordRuleConfig {
            label: label.to_string(),
            keywords: strings(keywords),
        };

        Self {
            enabled: true,
            region_by_country,
            job_functions: vec![
                rule("Security", &["ciso", "security", "infosec", "soc"]),
                rule(
                    "Technology",
                    &["cto", "cio", "it", "infrastructure", "devops", "engineering", "engineer", "technology"],
                ),
                rule("Finance", &["finance", "cfo", "treasury", "fp&a", "controller"]),
                rule("Operations", &["operations", "coo", "ops", "service delivery"]),
                rule("Product", &["product", "pm"]),
                rule("Marketing", &["marketing", "growth", "demand gen", "cmo"]),
                rule("Sales", &["sales", "bd", "business development", "account executive", "cro"]),
                rule("Executive", &["founder", "ceo", "vp", "vice president", "chief", "director", "president"]),
            ],
            default_job_function: "General".to_string(),
            personal_email_domains: strings(&[
                "gmail.com",
                "yahoo.com",
                "hotmail.com",
                "outlook.com",
                "icloud.com",
                "aol.com",
            ]),
            disqualified_statuses: strings(&["unqualified", "disqualified", "lost", "do not contact", "bounced"]),
            executive_channel: "Executive email + LinkedIn".to_string(),
            email_channel: "Email sequence".to_string(),
            fallback_channel: "LinkedIn outreach".to_string(),
            pain_points: strings(&["manual reporting and fragmented data", "slow outbound cycles"]),
            maturity_signals: strings(&["signs of growth or recent hiring"]),
            value_drivers: strings(&[
                "workflow automation",
                "pipeline visibility",
                "AI-assisted prioritization",
            ]),
            risk_factors: strings(&["unclear decision-maker"]),
        }
    }
}

/// Point weights of the additive strategic score
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub completeness_full: f64,
    pub completeness_partial: f64,
    pub in_profile_industry: f64,
    pub adjacent_industry: f64,
    pub hub_location: f64,
    pub executive_seniority: f64,
    pub director_seniority: f64,
    pub enterprise_size: f64,
    pub mid_market_size: f64,
    pub smb_size: f64,
    pub startup_size: f64,
    pub icp_high: f64,
    pub icp_medium: f64,
    pub icp_low: f64,
    pub risk_penalty: f64,
    pub engaged_status_bonus: f64,
    pub engaged_statuses: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            completeness_full: 20.0,
            completeness_partial: 10.0,
            in_profile_industry: 20.0,
            adjacent_industry: 10.0,
            hub_location: 15.0,
            executive_seniority: 20.0,
            director_seniority: 12.0,
            enterprise_size: 15.0,
            mid_market_size: 10.0,
            smb_size: 5.0,
            startup_size: 0.0,
            icp_high: 8.0,
            icp_medium: 4.0,
            icp_low: -4.0,
            risk_penalty: 10.0,
            engaged_status_bonus: 5.0,
            engaged_statuses: strings(&[
                "engaged",
                "contacted",
                "replied",
                "qualified",
                "working",
                "meeting booked",
                "demo scheduled",
            ]),
        }
    }
}

/// Cut-offs for the ordered segment rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub high_threshold: f64,
    pub mid_threshold: f64,
    pub contactable_threshold: f64,
    pub minimal_threshold: f64,
    pub low_priority_cutoff: f64,
    /// Fallback contactable requires a score strictly above this
    pub residual_floor: f64,
    pub disqualifying_risk_keywords: Vec<String>,
    pub top_n: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            high_threshold: 70.0,
            mid_threshold: 50.0,
            contactable_threshold: 35.0,
            minimal_threshold: 20.0,
            low_priority_cutoff: 25.0,
            residual_floor: 0.0,
            disqualifying_risk_keywords: strings(&[
                "invalid",
                "blacklist",
                "blacklisted",
                "disqualif",
                "do not contact",
                "unsubscribed",
                "bounced",
            ]),
            top_n: 3,
        }
    }
}

/// Report rendering limits, finding thresholds and playbook templates
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub playbook_title: String,
    pub excerpt_limit: usize,
    pub top_leads_limit: usize,
    pub required_contact_fields: Vec<CanonicalField>,
    pub required_missing_high_pct: f64,
    pub required_missing_medium_pct: f64,
    pub optional_missing_medium_pct: f64,
    pub optional_missing_low_pct: f64,
    pub unusable_email_high_pct: f64,
    pub invalid_email_high_pct: f64,
    pub invalid_email_medium_pct: f64,
    pub disqualified_share_medium_pct: f64,
    pub templates: Vec<SegmentTemplate>,
}

/// Fixed messaging block rendered for one segment
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentTemplate {
    pub segment: Segment,
    pub goal: String,
    pub owner: String,
    pub channels: String,
    pub cadence: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let template = |segment, goal: &str, owner: &str, channels: &str, cadence: &str| SegmentTemplate {
            segment,
            goal: goal.to_string(),
            owner: owner.to_string(),
            channels: channels.to_string(),
            cadence: cadence.to_string(),
        };

        Self {
            playbook_title: "Outbound Playbook".to_string(),
            excerpt_limit: 5,
            top_leads_limit: 5,
            required_contact_fields: vec![
                CanonicalField::FullName,
                CanonicalField::CompanyName,
                CanonicalField::Email,
            ],
            required_missing_high_pct: 40.0,
            required_missing_medium_pct: 15.0,
            optional_missing_medium_pct: 60.0,
            optional_missing_low_pct: 25.0,
            unusable_email_high_pct: 40.0,
            invalid_email_high_pct: 15.0,
            invalid_email_medium_pct: 5.0,
            disqualified_share_medium_pct: 50.0,
            templates: vec![
                template(
                    Segment::Strategic,
                    "land multi-year strategic accounts",
                    "senior AE plus leadership sponsor",
                    "warm introductions, executive email, LinkedIn, targeted events",
                    "1:1 highly personalized outreach, weekly touchpoints",
                ),
                template(
                    Segment::StandardIcp,
                    "convert into ARR within one to two quarters",
                    "mid-market AE supported by SDR",
                    "outbound email sequences, LinkedIn, occasional calls",
                    "5 to 7 touch sequence over 3 to 4 weeks",
                ),
                template(
                    Segment::Contactable,
                    "qualify fit before investing sales time",
                    "SDR on low-touch sequences",
                    "short email sequence, LinkedIn connection",
                    "3 touch sequence, then monthly value emails",
                ),
                template(
                    Segment::AiPotential,
                    "educate and stay top of mind until contact data improves",
                    "marketing automation",
                    "newsletters, product updates, one-to-many webinars",
                    "monthly nurture, quarterly data refresh",
                ),
                template(
                    Segment::Disqualified,
                    "collect more context, do not over-invest",
                    "automated flows only",
                    "retargeting where possible, data enrichment",
                    "no active outreach",
                ),
            ],
        }
    }
}

impl ReportConfig {
    pub fn template_for(&self, segment: Segment) -> Option<&SegmentTemplate> {
        self.templates.iter().find(|t| t.segment == segment)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn pairs(values: &[(&str, &str)]) -> HashMap<String, String> {
    values
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [segmentation]
            high_threshold = 80.0

            [normalizer]
            min_company_name_len = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.segmentation.high_threshold, 80.0);
        assert_eq!(config.segmentation.mid_threshold, 50.0);
        assert_eq!(config.normalizer.min_company_name_len, Some(2));
        assert!(config.normalizer.header_aliases.contains_key("mail"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = PipelineConfig::default();
        config.segmentation.mid_threshold = 90.0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_alias_to_unknown_column_rejected() {
        let mut config = PipelineConfig::default();
        config
            .normalizer
            .header_aliases
            .insert("phone".to_string(), "Phone".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_templates_deserialize_segment_labels() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [[report.templates]]
            segment = "Standard ICP"
            goal = "g"
            owner = "o"
            channels = "c"
            cadence = "k"
            "#,
        )
        .unwrap();
        assert_eq!(config.report.templates.len(), 1);
        assert!(config.report.template_for(Segment::StandardIcp).is_some());
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config.report.excerpt_limit, 5);
    }
}
