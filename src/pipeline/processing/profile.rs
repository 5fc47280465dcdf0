use crate::config::{CompanySizeConfig, ProfileConfig};
use crate::domain::{LeadRecord, SeniorityBand, SizeTier};
use crate::pipeline::utils::TextUtils;

/// How an industry relates to the ideal customer profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndustryFit {
    InProfile,
    Adjacent,
    Outside,
}

/// Read-only view over the profile tables, shared by every stage that asks
/// "does this lead look like our customer"
#[derive(Debug, Clone, Copy)]
pub struct ProfileMatcher<'a> {
    profile: &'a ProfileConfig,
}

impl<'a> ProfileMatcher<'a> {
    pub fn new(profile: &'a ProfileConfig) -> Self {
        Self { profile }
    }

    pub fn industry_fit(&self, industry: &str) -> IndustryFit {
        if matches_any(industry, &self.profile.in_profile_industries) {
            IndustryFit::InProfile
        } else if matches_any(industry, &self.profile.adjacent_industries) {
            IndustryFit::Adjacent
        } else {
            IndustryFit::Outside
        }
    }

    pub fn is_in_profile_industry(&self, industry: &str) -> bool {
        self.industry_fit(industry) == IndustryFit::InProfile
    }

    /// Country or derived region is one of the strategic hubs
    pub fn is_hub(&self, lead: &LeadRecord) -> bool {
        matches_any(&lead.country, &self.profile.hub_locations)
            || lead
                .enrichment
                .region
                .as_deref()
                .is_some_and(|region| matches_any(region, &self.profile.hub_locations))
    }

    /// Seniority band from `SeniorityLevel`, falling back to `JobTitle`.
    /// Tiers are tried in order and the first keyword hit wins.
    pub fn seniority(&self, lead: &LeadRecord) -> Option<SeniorityBand> {
        [&lead.seniority_level, &lead.job_title]
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .find_map(|text| {
                self.profile
                    .seniority_tiers
                    .iter()
                    .find(|tier| TextUtils::contains_any_keyword(text, &tier.keywords))
                    .map(|tier| tier.band)
            })
    }

    pub fn is_in_profile_function(&self, job_function: Option<&str>) -> bool {
        job_function.is_some_and(|function| matches_any(function, &self.profile.in_profile_functions))
    }

    pub fn size_tier(&self, company_size: &str) -> Option<SizeTier> {
        parse_size_tier(company_size, &self.profile.company_size)
    }
}

/// Parse a free-text size bracket. Exact bracket text is looked up first;
/// otherwise the leading number before `-` or `+` is bucketed by threshold.
pub fn parse_size_tier(text: &str, config: &CompanySizeConfig) -> Option<SizeTier> {
    let key = TextUtils::lookup_key(text);
    if key.is_empty() {
        return None;
    }
    if let Some(tier) = config.brackets.get(&key) {
        return Some(*tier);
    }

    let cleaned = key.replace(',', "");
    let leading = cleaned.split(['-', '+']).next().unwrap_or("").trim();
    let digits: String = leading.chars().take_while(char::is_ascii_digit).collect();
    let count: u64 = digits.parse().ok()?;

    let tier = if count >= config.enterprise_min {
        SizeTier::Enterprise
    } else if count >= config.mid_market_min {
        SizeTier::MidMarket
    } else if count >= config.smb_min {
        SizeTier::Smb
    } else {
        SizeTier::StartupOrMicro
    };
    Some(tier)
}

fn matches_any(value: &str, candidates: &[String]) -> bool {
    let key = TextUtils::lookup_key(value);
    !key.is_empty() && candidates.iter().any(|c| TextUtils::lookup_key(c) == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(seniority: &str, title: &str) -> LeadRecord {
        LeadRecord {
            seniority_level: seniority.to_string(),
            job_title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_industry_fit_is_case_insensitive() {
        let profile = ProfileConfig::default();
        let matcher = ProfileMatcher::new(&profile);
        assert_eq!(matcher.industry_fit("fintech"), IndustryFit::InProfile);
        assert_eq!(matcher.industry_fit("Banking"), IndustryFit::Adjacent);
        assert_eq!(matcher.industry_fit("Retail"), IndustryFit::Outside);
        assert_eq!(matcher.industry_fit(""), IndustryFit::Outside);
    }

    #[test]
    fn test_seniority_prefers_level_over_title() {
        let profile = ProfileConfig::default();
        let matcher = ProfileMatcher::new(&profile);
        assert_eq!(matcher.seniority(&lead("Director", "CTO")), Some(SeniorityBand::Director));
        assert_eq!(matcher.seniority(&lead("", "VP Engineering")), Some(SeniorityBand::Executive));
        assert_eq!(matcher.seniority(&lead("Manager", "Director of IT")), Some(SeniorityBand::Director));
        assert_eq!(matcher.seniority(&lead("", "Analyst")), None);
    }

    #[test]
    fn test_hub_matches_country_or_region() {
        let profile = ProfileConfig::default();
        let matcher = ProfileMatcher::new(&profile);
        let mut record = LeadRecord {
            country: "Singapore".to_string(),
            ..Default::default()
        };
        assert!(matcher.is_hub(&record));

        record.country = "Malaysia".to_string();
        assert!(!matcher.is_hub(&record));

        record.enrichment.region = Some("United Kingdom".to_string());
        assert!(matcher.is_hub(&record));
    }

    #[test]
    fn test_size_tier_parsing() {
        let config = CompanySizeConfig::default();
        assert_eq!(parse_size_tier("51-200", &config), Some(SizeTier::Smb));
        assert_eq!(parse_size_tier("Enterprise", &config), Some(SizeTier::Enterprise));
        assert_eq!(parse_size_tier("2,500+", &config), Some(SizeTier::Enterprise));
        assert_eq!(parse_size_tier("250 - 499", &config), Some(SizeTier::MidMarket));
        assert_eq!(parse_size_tier("75", &config), Some(SizeTier::Smb));
        assert_eq!(parse_size_tier("12", &config), Some(SizeTier::StartupOrMicro));
        assert_eq!(parse_size_tier("lots", &config), None);
        assert_eq!(parse_size_tier("", &config), None);
    }
}
