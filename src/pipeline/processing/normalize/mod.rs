use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::NormalizerConfig;
use crate::domain::{CanonicalField, EnrichmentField, LeadField, LeadRecord};
use crate::error::{PipelineError, Result};
use crate::observability::metrics;
use crate::pipeline::ingestion::RawLeadTable;
use crate::pipeline::utils::TextUtils;

pub mod columns;

use columns::ColumnMapping;

/// Output of the normalizer: canonical records plus what cleaning did
#[derive(Debug, Clone)]
pub struct NormalizedLeadSet {
    pub records: Vec<LeadRecord>,
    pub report: NormalizationReport,
}

/// Counts and notes collected while normalizing, surfaced in the quality report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub input_rows: usize,
    pub blank_rows_dropped: usize,
    pub short_company_dropped: usize,
    pub duplicate_emails_dropped: usize,
    pub duplicate_ids_dropped: usize,
    pub assigned_ids: usize,
    /// Input headers that map to no known column
    pub unmapped_columns: Vec<String>,
    /// Canonical columns absent from the input and filled empty
    pub synthesized_columns: Vec<String>,
    /// Non-empty priority values that did not parse as numbers
    pub unparsable_priority: usize,
    pub output_rows: usize,
}

/// Trait for mapping raw tables onto the canonical lead schema
pub trait Normalizer {
    fn normalize(&self, table: &RawLeadTable) -> Result<NormalizedLeadSet>;
}

/// Alias-table driven normalizer
pub struct DefaultNormalizer {
    config: NormalizerConfig,
}

impl DefaultNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Build one canonical record from a raw row
    fn map_row(&self, mapping: &ColumnMapping, row: &[String], report: &mut NormalizationReport) -> LeadRecord {
        let value = |field: CanonicalField| mapping.value(LeadField::Canonical(field), row);

        let priority_raw = value(CanonicalField::PriorityScore);
        let priority_score = if priority_raw.is_empty() {
            None
        } else {
            match priority_raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    debug!("Unparsable priority value '{}'", priority_raw);
                    report.unparsable_priority += 1;
                    metrics::normalize::field_anomaly("PriorityScore");
                    None
                }
            }
        };

        let mut record = LeadRecord {
            lead_id: TextUtils::collapse_whitespace(value(CanonicalField::LeadId)),
            full_name: TextUtils::title_case(value(CanonicalField::FullName)),
            company_name: TextUtils::collapse_whitespace(value(CanonicalField::CompanyName)),
            email: normalize_email(value(CanonicalField::Email)),
            industry: fold(&self.config.industry_aliases, value(CanonicalField::Industry), TextUtils::title_case),
            company_size: fold(
                &self.config.company_size_aliases,
                value(CanonicalField::CompanySize),
                TextUtils::collapse_whitespace,
            ),
            country: fold(&self.config.country_aliases, value(CanonicalField::Country), TextUtils::title_case),
            job_title: TextUtils::collapse_whitespace(value(CanonicalField::JobTitle)),
            seniority_level: fold(
                &self.config.seniority_aliases,
                value(CanonicalField::SeniorityLevel),
                TextUtils::title_case,
            ),
            lead_status: TextUtils::title_case(value(CanonicalField::LeadStatus)),
            priority_score,
            ..Default::default()
        };

        for field in EnrichmentField::ALL {
            let raw = mapping.value(LeadField::Enrichment(field), row);
            if !raw.is_empty() {
                record.enrichment.set(field, TextUtils::collapse_whitespace(raw));
            }
        }

        record
    }

    fn is_blank_identity(record: &LeadRecord) -> bool {
        record.email.is_empty() && record.full_name.is_empty() && record.company_name.is_empty()
    }

    fn company_too_short(&self, record: &LeadRecord) -> bool {
        match self.config.min_company_name_len {
            Some(min) => record.company_name.chars().count() < min.max(1),
            None => false,
        }
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, table: &RawLeadTable) -> Result<NormalizedLeadSet> {
        let mapping = ColumnMapping::build(&table.headers, &self.config);
        let mut report = NormalizationReport {
            input_rows: table.len(),
            unmapped_columns: mapping.unmapped.clone(),
            synthesized_columns: mapping
                .missing_canonical()
                .iter()
                .map(|f| f.column_name().to_string())
                .collect(),
            ..Default::default()
        };
        metrics::normalize::rows_read(table.len());

        if !report.synthesized_columns.is_empty() {
            warn!(
                "Input lacks canonical columns {:?}; filling them empty",
                report.synthesized_columns
            );
        }
        if !report.unmapped_columns.is_empty() {
            debug!("Ignoring unmapped columns {:?}", report.unmapped_columns);
        }

        // Keep the 1-based input row number for synthetic ids
        let mut rows: Vec<(usize, LeadRecord)> = Vec::with_capacity(table.len());
        for (index, row) in table.rows.iter().enumerate() {
            let record = self.map_row(&mapping, row, &mut report);
            if Self::is_blank_identity(&record) {
                report.blank_rows_dropped += 1;
                continue;
            }
            if self.company_too_short(&record) {
                report.short_company_dropped += 1;
                continue;
            }
            rows.push((index + 1, record));
        }

        // Email identity is stronger than a possibly synthetic id, so it goes first.
        // Placeholders such as "n/a" identify no one and are never deduplicated.
        let mut seen_emails = HashSet::new();
        rows.retain(|(_, record)| {
            if !record.email_status().is_usable() || seen_emails.insert(record.email.clone()) {
                true
            } else {
                report.duplicate_emails_dropped += 1;
                false
            }
        });

        let mut used_ids: HashSet<String> = rows
            .iter()
            .filter(|(_, r)| !r.lead_id.is_empty())
            .map(|(_, r)| r.lead_id.clone())
            .collect();
        for (row_number, record) in rows.iter_mut() {
            if record.lead_id.is_empty() {
                record.lead_id = next_free_id(*row_number, &used_ids);
                used_ids.insert(record.lead_id.clone());
                report.assigned_ids += 1;
            }
        }

        let mut seen_ids = HashSet::new();
        let records: Vec<LeadRecord> = rows
            .into_iter()
            .filter_map(|(_, record)| {
                if seen_ids.insert(record.lead_id.clone()) {
                    Some(record)
                } else {
                    report.duplicate_ids_dropped += 1;
                    None
                }
            })
            .collect();

        report.output_rows = records.len();
        metrics::normalize::rows_dropped("blank_identity", report.blank_rows_dropped);
        metrics::normalize::rows_dropped("short_company", report.short_company_dropped);
        metrics::normalize::rows_dropped("duplicate_email", report.duplicate_emails_dropped);
        metrics::normalize::rows_dropped("duplicate_id", report.duplicate_ids_dropped);
        metrics::normalize::records_emitted(records.len());

        info!(
            input = report.input_rows,
            output = report.output_rows,
            blank = report.blank_rows_dropped,
            duplicate_emails = report.duplicate_emails_dropped,
            duplicate_ids = report.duplicate_ids_dropped,
            "Normalized lead records"
        );

        if records.is_empty() {
            return Err(PipelineError::NoUsableRecords);
        }

        Ok(NormalizedLeadSet { records, report })
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

fn normalize_email(raw: &str) -> String {
    let email = raw.trim().to_lowercase();
    email
        .strip_prefix("mailto:")
        .map(str::to_string)
        .unwrap_or(email)
}

/// Look the value up in a spelling-variant table, otherwise apply `fallback`
fn fold(table: &std::collections::HashMap<String, String>, raw: &str, fallback: fn(&str) -> String) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match table.get(&TextUtils::lookup_key(raw)) {
        Some(canonical) => canonical.clone(),
        None => fallback(raw),
    }
}

/// The row number itself, or `"<row>-<k>"` for the smallest free k >= 2
fn next_free_id(row_number: usize, used: &HashSet<String>) -> String {
    let base = row_number.to_string();
    if !used.contains(&base) {
        return base;
    }
    (2..)
        .map(|k| format!("{}-{}", row_number, k))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}
