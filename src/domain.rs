//! Lead data shapes shared across pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical input columns every normalized record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    #[serde(rename = "LeadID")]
    LeadId,
    FullName,
    CompanyName,
    Email,
    Industry,
    CompanySize,
    Country,
    JobTitle,
    SeniorityLevel,
    LeadStatus,
    PriorityScore,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::LeadId,
        CanonicalField::FullName,
        CanonicalField::CompanyName,
        CanonicalField::Email,
        CanonicalField::Industry,
        CanonicalField::CompanySize,
        CanonicalField::Country,
        CanonicalField::JobTitle,
        CanonicalField::SeniorityLevel,
        CanonicalField::LeadStatus,
        CanonicalField::PriorityScore,
    ];

    /// Column header used on input and output
    pub fn column_name(&self) -> &'static str {
        match self {
            CanonicalField::LeadId => "LeadID",
            CanonicalField::FullName => "FullName",
            CanonicalField::CompanyName => "CompanyName",
            CanonicalField::Email => "Email",
            CanonicalField::Industry => "Industry",
            CanonicalField::CompanySize => "CompanySize",
            CanonicalField::Country => "Country",
            CanonicalField::JobTitle => "JobTitle",
            CanonicalField::SeniorityLevel => "SeniorityLevel",
            CanonicalField::LeadStatus => "LeadStatus",
            CanonicalField::PriorityScore => "PriorityScore",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Optional descriptive columns produced by enrichment or supplied by the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrichmentField {
    IcpFitLabel,
    IcpFitReason,
    RiskFlag,
    SuggestedPrimaryChannel,
    AiNotes,
    Region,
    CompanySizeTier,
    JobFunction,
}

impl EnrichmentField {
    pub const ALL: [EnrichmentField; 8] = [
        EnrichmentField::Region,
        EnrichmentField::CompanySizeTier,
        EnrichmentField::JobFunction,
        EnrichmentField::IcpFitLabel,
        EnrichmentField::IcpFitReason,
        EnrichmentField::RiskFlag,
        EnrichmentField::SuggestedPrimaryChannel,
        EnrichmentField::AiNotes,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            EnrichmentField::IcpFitLabel => "ICPFitLabel",
            EnrichmentField::IcpFitReason => "ICPFitReason",
            EnrichmentField::RiskFlag => "RiskFlag",
            EnrichmentField::SuggestedPrimaryChannel => "SuggestedPrimaryChannel",
            EnrichmentField::AiNotes => "AI_Notes",
            EnrichmentField::Region => "Region",
            EnrichmentField::CompanySizeTier => "CompanySizeTier",
            EnrichmentField::JobFunction => "JobFunction",
        }
    }
}

impl fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Any column the normalizer knows how to map a header onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadField {
    Canonical(CanonicalField),
    Enrichment(EnrichmentField),
}

impl LeadField {
    pub fn column_name(&self) -> &'static str {
        match self {
            LeadField::Canonical(field) => field.column_name(),
            LeadField::Enrichment(field) => field.column_name(),
        }
    }

    /// Every mappable column, canonical first
    pub fn all() -> Vec<LeadField> {
        CanonicalField::ALL
            .into_iter()
            .map(LeadField::Canonical)
            .chain(EnrichmentField::ALL.into_iter().map(LeadField::Enrichment))
            .collect()
    }
}

/// Enrichment values attached to a lead. `None` means the value is absent,
/// as opposed to present and empty, which the normalizer never produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub icp_fit_label: Option<String>,
    pub icp_fit_reason: Option<String>,
    pub risk_flag: Option<String>,
    pub suggested_primary_channel: Option<String>,
    pub ai_notes: Option<String>,
    pub region: Option<String>,
    pub company_size_tier: Option<String>,
    pub job_function: Option<String>,
}

impl Enrichment {
    pub fn get(&self, field: EnrichmentField) -> Option<&str> {
        let value = match field {
            EnrichmentField::IcpFitLabel => &self.icp_fit_label,
            EnrichmentField::IcpFitReason => &self.icp_fit_reason,
            EnrichmentField::RiskFlag => &self.risk_flag,
            EnrichmentField::SuggestedPrimaryChannel => &self.suggested_primary_channel,
            EnrichmentField::AiNotes => &self.ai_notes,
            EnrichmentField::Region => &self.region,
            EnrichmentField::CompanySizeTier => &self.company_size_tier,
            EnrichmentField::JobFunction => &self.job_function,
        };
        value.as_deref()
    }

    /// Store a value; blank text is treated as absent.
    pub fn set(&mut self, field: EnrichmentField, value: impl Into<String>) {
        let value = value.into();
        let value = if value.trim().is_empty() { None } else { Some(value) };
        let slot = match field {
            EnrichmentField::IcpFitLabel => &mut self.icp_fit_label,
            EnrichmentField::IcpFitReason => &mut self.icp_fit_reason,
            EnrichmentField::RiskFlag => &mut self.risk_flag,
            EnrichmentField::SuggestedPrimaryChannel => &mut self.suggested_primary_channel,
            EnrichmentField::AiNotes => &mut self.ai_notes,
            EnrichmentField::Region => &mut self.region,
            EnrichmentField::CompanySizeTier => &mut self.company_size_tier,
            EnrichmentField::JobFunction => &mut self.job_function,
        };
        *slot = value;
    }

    /// Fill every absent field from `derived`, keeping values already present.
    pub fn merged_with(&self, derived: &Enrichment) -> Enrichment {
        let mut merged = self.clone();
        for field in EnrichmentField::ALL {
            if merged.get(field).is_none() {
                if let Some(value) = derived.get(field) {
                    merged.set(field, value);
                }
            }
        }
        merged
    }

    pub fn icp_fit(&self) -> Option<IcpFit> {
        self.icp_fit_label.as_deref().and_then(IcpFit::parse)
    }
}

/// A prospective contact in canonical shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: String,
    pub full_name: String,
    pub company_name: String,
    pub email: String,
    pub industry: String,
    pub company_size: String,
    pub country: String,
    pub job_title: String,
    pub seniority_level: String,
    pub lead_status: String,
    pub priority_score: Option<f64>,
    pub enrichment: Enrichment,
}

impl LeadRecord {
    /// Text value of a canonical column; the priority is rendered without
    /// trailing zeros and is empty when absent.
    pub fn text(&self, field: CanonicalField) -> String {
        match field {
            CanonicalField::LeadId => self.lead_id.clone(),
            CanonicalField::FullName => self.full_name.clone(),
            CanonicalField::CompanyName => self.company_name.clone(),
            CanonicalField::Email => self.email.clone(),
            CanonicalField::Industry => self.industry.clone(),
            CanonicalField::CompanySize => self.company_size.clone(),
            CanonicalField::Country => self.country.clone(),
            CanonicalField::JobTitle => self.job_title.clone(),
            CanonicalField::SeniorityLevel => self.seniority_level.clone(),
            CanonicalField::LeadStatus => self.lead_status.clone(),
            CanonicalField::PriorityScore => self
                .priority_score
                .map(format_number)
                .unwrap_or_default(),
        }
    }

    pub fn is_missing(&self, field: CanonicalField) -> bool {
        match field {
            CanonicalField::PriorityScore => self.priority_score.is_none(),
            other => self.text(other).trim().is_empty(),
        }
    }

    pub fn email_status(&self) -> EmailStatus {
        EmailStatus::classify(&self.email)
    }
}

/// Render a number with at most two decimals and no trailing zeros
pub fn format_number(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Validity class of an email address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailStatus {
    Valid,
    Empty,
    Invalid,
}

impl EmailStatus {
    /// Non-empty, contains `@`, contains no whitespace
    pub fn classify(email: &str) -> Self {
        let email = email.trim();
        if email.is_empty() {
            EmailStatus::Empty
        } else if email.contains('@') && !email.chars().any(char::is_whitespace) {
            EmailStatus::Valid
        } else {
            EmailStatus::Invalid
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, EmailStatus::Valid)
    }
}

/// Strength of ideal-customer-profile fit carried in `ICPFitLabel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IcpFit {
    Low,
    Medium,
    High,
}

impl IcpFit {
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        if label.starts_with("high") || label == "strong" {
            Some(IcpFit::High)
        } else if label.starts_with("med") || label == "moderate" {
            Some(IcpFit::Medium)
        } else if label.starts_with("low") || label == "weak" {
            Some(IcpFit::Low)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IcpFit::Low => "Low",
            IcpFit::Medium => "Medium",
            IcpFit::High => "High",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, IcpFit::Medium | IcpFit::High)
    }
}

/// Mutually exclusive outreach bucket, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "Strategic")]
    Strategic,
    #[serde(rename = "Standard ICP")]
    StandardIcp,
    #[serde(rename = "Contactable")]
    Contactable,
    #[serde(rename = "AI-Potential")]
    AiPotential,
    #[serde(rename = "Disqualified")]
    Disqualified,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Strategic,
        Segment::StandardIcp,
        Segment::Contactable,
        Segment::AiPotential,
        Segment::Disqualified,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Strategic => "Strategic",
            Segment::StandardIcp => "Standard ICP",
            Segment::Contactable => "Contactable",
            Segment::AiPotential => "AI-Potential",
            Segment::Disqualified => "Disqualified",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Position in the fixed priority ranking, 0 being highest
    pub fn rank(&self) -> usize {
        match self {
            Segment::Strategic => 0,
            Segment::StandardIcp => 1,
            Segment::Contactable => 2,
            Segment::AiPotential => 3,
            Segment::Disqualified => 4,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Company size bracket derived from free-text `CompanySize`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeTier {
    #[serde(rename = "Enterprise")]
    Enterprise,
    #[serde(rename = "Mid Market")]
    MidMarket,
    #[serde(rename = "SMB")]
    Smb,
    #[serde(rename = "Startup or Micro")]
    StartupOrMicro,
}

impl SizeTier {
    pub const ALL: [SizeTier; 4] = [
        SizeTier::Enterprise,
        SizeTier::MidMarket,
        SizeTier::Smb,
        SizeTier::StartupOrMicro,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeTier::Enterprise => "Enterprise",
            SizeTier::MidMarket => "Mid Market",
            SizeTier::Smb => "SMB",
            SizeTier::StartupOrMicro => "Startup or Micro",
        }
    }
}

/// Seniority bands recognised by keyword, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityBand {
    Executive,
    Director,
}

impl SeniorityBand {
    pub fn label(&self) -> &'static str {
        match self {
            SeniorityBand::Executive => "Executive",
            SeniorityBand::Director => "Director",
        }
    }
}

/// Trust in a lead's descriptive fields; the more of them were inferred
/// rather than supplied, the lower it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_inferred_count(count: usize) -> Self {
        match count {
            0 | 1 => ConfidenceLevel::High,
            2 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

/// Per-lead data-quality flags written next to the scored lead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataQualityFlags {
    /// Email is empty or malformed
    pub missing_email: bool,
    pub missing_industry: bool,
    /// Non-empty Region, CompanySizeTier and JobFunction values
    pub inferred_fields: usize,
    pub confidence: ConfidenceLevel,
}

impl DataQualityFlags {
    pub const COLUMNS: [&'static str; 4] = [
        "DQ_MissingEmail",
        "DQ_MissingIndustry",
        "DQ_InferredFieldsCount",
        "DQ_ConfidenceLevel",
    ];

    const INFERRED_FIELDS: [EnrichmentField; 3] = [
        EnrichmentField::Region,
        EnrichmentField::CompanySizeTier,
        EnrichmentField::JobFunction,
    ];

    pub fn for_lead(lead: &LeadRecord) -> Self {
        let inferred_fields = Self::INFERRED_FIELDS
            .iter()
            .filter(|f| lead.enrichment.get(**f).is_some())
            .count();
        Self {
            missing_email: !lead.email_status().is_usable(),
            missing_industry: lead.industry.trim().is_empty(),
            inferred_fields,
            confidence: ConfidenceLevel::from_inferred_count(inferred_fields),
        }
    }

    /// Cell values in `COLUMNS` order
    pub fn cells(&self) -> [String; 4] {
        [
            self.missing_email.to_string(),
            self.missing_industry.to_string(),
            self.inferred_fields.to_string(),
            self.confidence.label().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_classification() {
        assert_eq!(EmailStatus::classify("ana@acme.io"), EmailStatus::Valid);
        assert_eq!(EmailStatus::classify("   "), EmailStatus::Empty);
        assert_eq!(EmailStatus::classify("ana at acme"), EmailStatus::Invalid);
        assert_eq!(EmailStatus::classify("ana @acme.io"), EmailStatus::Invalid);
    }

    #[test]
    fn test_enrichment_merge_keeps_existing_values() {
        let mut supplied = Enrichment::default();
        supplied.set(EnrichmentField::IcpFitLabel, "High");

        let mut derived = Enrichment::default();
        derived.set(EnrichmentField::IcpFitLabel, "Low");
        derived.set(EnrichmentField::Region, "APAC");

        let merged = supplied.merged_with(&derived);
        assert_eq!(merged.icp_fit_label.as_deref(), Some("High"));
        assert_eq!(merged.region.as_deref(), Some("APAC"));
    }

    #[test]
    fn test_blank_enrichment_value_is_absent() {
        let mut enrichment = Enrichment::default();
        enrichment.set(EnrichmentField::RiskFlag, "  ");
        assert!(enrichment.risk_flag.is_none());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(72.5), "72.5");
        assert_eq!(format_number(33.333), "33.33");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_segment_labels_round_trip() {
        for segment in Segment::ALL {
            assert_eq!(Segment::from_label(segment.label()), Some(segment));
        }
        assert_eq!(Segment::from_label("standard icp"), Some(Segment::StandardIcp));
        assert_eq!(Segment::from_label("Nurture"), None);
    }

    #[test]
    fn test_confidence_tiers_follow_inferred_count() {
        assert_eq!(ConfidenceLevel::from_inferred_count(0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_inferred_count(1), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_inferred_count(2), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_inferred_count(3), ConfidenceLevel::Low);
    }

    #[test]
    fn test_data_quality_flags_for_lead() {
        let mut lead = LeadRecord {
            email: "not-an-email".to_string(),
            industry: "Fintech".to_string(),
            ..Default::default()
        };
        let flags = DataQualityFlags::for_lead(&lead);
        assert!(flags.missing_email);
        assert!(!flags.missing_industry);
        assert_eq!(flags.inferred_fields, 0);
        assert_eq!(flags.confidence, ConfidenceLevel::High);

        lead.email = "ana@paygrid.io".to_string();
        lead.industry = String::new();
        lead.enrichment.set(EnrichmentField::Region, "APAC");
        lead.enrichment.set(EnrichmentField::JobFunction, "Technology");
        let flags = DataQualityFlags::for_lead(&lead);
        assert!(!flags.missing_email);
        assert!(flags.missing_industry);
        assert_eq!(flags.cells(), ["false", "true", "2", "Medium"]);

        lead.enrichment.set(EnrichmentField::CompanySizeTier, "SMB");
        assert_eq!(DataQualityFlags::for_lead(&lead).confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_icp_fit_parse() {
        assert_eq!(IcpFit::parse("High fit"), Some(IcpFit::High));
        assert_eq!(IcpFit::parse("medium"), Some(IcpFit::Medium));
        assert_eq!(IcpFit::parse("LOW"), Some(IcpFit::Low));
        assert_eq!(IcpFit::parse("unknown"), None);
    }
}
