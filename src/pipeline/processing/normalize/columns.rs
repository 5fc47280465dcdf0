use std::collections::HashMap;

use crate::config::NormalizerConfig;
use crate::domain::{CanonicalField, EnrichmentField, LeadField};
use crate::pipeline::utils::TextUtils;

/// Which input columns feed each lead field, in fill priority order:
/// the canonical column first, then raw aliases in header order.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    sources: HashMap<LeadField, Vec<usize>>,
    pub unmapped: Vec<String>,
}

impl ColumnMapping {
    pub fn build(headers: &[String], config: &NormalizerConfig) -> Self {
        let fields = LeadField::all();
        let canonical_keys: Vec<(String, LeadField)> = fields
            .iter()
            .map(|f| (TextUtils::normalize_header(f.column_name()), *f))
            .collect();

        let mut canonical: HashMap<LeadField, Vec<usize>> = HashMap::new();
        let mut aliased: HashMap<LeadField, Vec<usize>> = HashMap::new();
        let mut unmapped = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            let key = TextUtils::normalize_header(header);
            if let Some((_, field)) = canonical_keys.iter().find(|(k, _)| *k == key) {
                canonical.entry(*field).or_default().push(index);
            } else if let Some(field) = config
                .header_aliases
                .get(&key)
                .and_then(|target| resolve_column(target))
            {
                aliased.entry(field).or_default().push(index);
            } else if !key.is_empty() {
                unmapped.push(header.trim().to_string());
            }
        }

        let mut sources = HashMap::new();
        for field in fields {
            let mut indices = canonical.remove(&field).unwrap_or_default();
            indices.extend(aliased.remove(&field).unwrap_or_default());
            if !indices.is_empty() {
                sources.insert(field, indices);
            }
        }

        Self { sources, unmapped }
    }

    pub fn sources(&self, field: LeadField) -> &[usize] {
        self.sources.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_mapped(&self, field: LeadField) -> bool {
        !self.sources(field).is_empty()
    }

    /// Canonical columns with no input source at all
    pub fn missing_canonical(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| !self.is_mapped(LeadField::Canonical(*f)))
            .collect()
    }

    /// First non-empty trimmed value among the field's sources
    pub fn value<'a>(&self, field: LeadField, row: &'a [String]) -> &'a str {
        self.sources(field)
            .iter()
            .filter_map(|&i| row.get(i))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }
}

fn resolve_column(name: &str) -> Option<LeadField> {
    if let Some(field) = CanonicalField::from_column_name(name) {
        return Some(LeadField::Canonical(field));
    }
    EnrichmentField::ALL
        .into_iter()
        .find(|f| f.column_name() == name)
        .map(LeadField::Enrichment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_aliases_map_to_canonical_fields() {
        let config = NormalizerConfig::default();
        let mapping = ColumnMapping::build(&headers(&["full name", "mail", "biz", "Notes Col"]), &config);

        assert_eq!(mapping.sources(LeadField::Canonical(CanonicalField::FullName)), &[0]);
        assert_eq!(mapping.sources(LeadField::Canonical(CanonicalField::Email)), &[1]);
        assert_eq!(mapping.sources(LeadField::Canonical(CanonicalField::CompanyName)), &[2]);
        assert_eq!(mapping.unmapped, vec!["Notes Col".to_string()]);
    }

    #[test]
    fn test_canonical_column_precedes_alias() {
        let config = NormalizerConfig::default();
        let mapping = ColumnMapping::build(&headers(&["mail", "Email"]), &config);
        assert_eq!(mapping.sources(LeadField::Canonical(CanonicalField::Email)), &[1, 0]);

        let row = headers(&["raw@acme.io", "canon@acme.io"]);
        assert_eq!(mapping.value(LeadField::Canonical(CanonicalField::Email), &row), "canon@acme.io");

        let row = headers(&["raw@acme.io", "  "]);
        assert_eq!(mapping.value(LeadField::Canonical(CanonicalField::Email), &row), "raw@acme.io");
    }

    #[test]
    fn test_missing_canonical_columns_reported() {
        let config = NormalizerConfig::default();
        let mapping = ColumnMapping::build(&headers(&["Email"]), &config);
        let missing = mapping.missing_canonical();
        assert!(missing.contains(&CanonicalField::FullName));
        assert!(!missing.contains(&CanonicalField::Email));
        assert_eq!(missing.len(), CanonicalField::ALL.len() - 1);
    }

    #[test]
    fn test_enrichment_columns_are_recognised() {
        let config = NormalizerConfig::default();
        let mapping = ColumnMapping::build(&headers(&["ICPFitLabel", "risk flag", "AI_Notes"]), &config);
        assert!(mapping.is_mapped(LeadField::Enrichment(EnrichmentField::IcpFitLabel)));
        assert!(mapping.is_mapped(LeadField::Enrichment(EnrichmentField::RiskFlag)));
        assert!(mapping.is_mapped(LeadField::Enrichment(EnrichmentField::AiNotes)));
        assert!(mapping.unmapped.is_empty());
    }
}
