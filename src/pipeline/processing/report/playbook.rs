use crate::config::ReportConfig;
use crate::domain::{format_number, Segment};
use crate::pipeline::processing::segment::{SegmentSummaryRow, SegmentedLead};

use super::{cell, ReportInput};

const NOTE_EXCERPT_CHARS: usize = 240;

pub fn render(input: ReportInput<'_>, config: &ReportConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n", config.playbook_title));
    out.push('\n');
    out.push_str(&format!("Total leads: {}\n", input.leads.len()));
    out.push('\n');

    render_overview(&mut out, &input.summary.rows);

    for row in &input.summary.rows {
        let members: Vec<&SegmentedLead> = input
            .leads
            .iter()
            .filter(|l| l.segment == row.segment)
            .collect();
        render_segment(&mut out, row, &members, config);
    }

    render_next_actions(&mut out, &input.summary.rows, config);
    out
}

fn render_overview(out: &mut String, rows: &[SegmentSummaryRow]) {
    out.push_str("## Segment overview\n");
    out.push('\n');
    if rows.is_empty() {
        out.push_str("_No segments to report._\n");
        out.push('\n');
        return;
    }
    out.push_str(
        "| Segment | Leads | Avg score | Valid email % | ICP positive % | Top size tier | Top channel | Top industries | Top functions | Top regions |\n",
    );
    out.push_str("|---|---:|---:|---:|---:|---|---|---|---|---|\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.2} | {} | {} | {} | {} | {} |\n",
            row.segment,
            row.lead_count,
            format_number(row.avg_score),
            row.valid_email_pct,
            row.icp_positive_pct,
            cell(row.top_company_size_tier.as_deref().unwrap_or("")),
            cell(row.top_channel.as_deref().unwrap_or("")),
            cell(&row.top_industries.join(", ")),
            cell(&row.top_job_functions.join(", ")),
            cell(&row.top_regions.join(", ")),
        ));
    }
    out.push('\n');
}

fn render_segment(out: &mut String, row: &SegmentSummaryRow, members: &[&SegmentedLead], config: &ReportConfig) {
    out.push_str(&format!("## {} ({} leads)\n", row.segment, row.lead_count));
    out.push('\n');

    match config.template_for(row.segment) {
        Some(template) => {
            out.push_str(&format!("- **Goal:** {}\n", template.goal));
            out.push_str(&format!("- **Owner:** {}\n", template.owner));
            out.push_str(&format!("- **Channels:** {}\n", template.channels));
            out.push_str(&format!("- **Cadence:** {}\n", template.cadence));
        }
        None => {
            out.push_str("_No messaging template configured for this segment._\n");
        }
    }
    out.push('\n');

    out.push_str("### Top leads\n");
    out.push('\n');
    let top = top_leads(members, config.top_leads_limit);
    if top.is_empty() {
        out.push_str("_No leads in this segment._\n");
    } else {
        for lead in top {
            out.push_str(&format!("- {}\n", describe_lead(lead)));
        }
    }
    out.push('\n');

    out.push_str("### Enrichment notes\n");
    out.push('\n');
    let notes = note_excerpts(members, config.excerpt_limit);
    if notes.is_empty() {
        out.push_str("_No enrichment notes available._\n");
    } else {
        for (lead_id, note) in notes {
            out.push_str(&format!("- **{}:** {}\n", lead_id, note));
        }
    }
    out.push('\n');
}

fn render_next_actions(out: &mut String, rows: &[SegmentSummaryRow], config: &ReportConfig) {
    out.push_str("## Next Best Actions\n");
    out.push('\n');
    if rows.is_empty() {
        out.push_str("_No actions: no leads were segmented._\n");
        return;
    }
    for (index, row) in rows.iter().enumerate() {
        let action = match row.segment {
            Segment::Strategic => "assign owners and start personalized outreach this week",
            Segment::StandardIcp => "enroll in the standard outbound sequence",
            Segment::Contactable => "run a short qualification sequence",
            Segment::AiPotential => "add to nurture and refresh contact data",
            Segment::Disqualified => "hold back from outreach and fix data gaps",
        };
        let goal = config
            .template_for(row.segment)
            .map(|t| format!(" Goal: {}.", t.goal))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}. **{}** ({} leads): {}.{}\n",
            index + 1,
            row.segment,
            row.lead_count,
            action,
            goal
        ));
    }
}

/// Highest scores first; equal scores keep input order
fn top_leads<'a>(members: &[&'a SegmentedLead], limit: usize) -> Vec<&'a SegmentedLead> {
    let mut ranked: Vec<&SegmentedLead> = members.to_vec();
    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
    ranked.truncate(limit);
    ranked
}

/// First non-blank notes in input order
fn note_excerpts(members: &[&SegmentedLead], limit: usize) -> Vec<(String, String)> {
    members
        .iter()
        .filter_map(|lead| {
            let notes = lead.scored_lead.lead.enrichment.ai_notes.as_deref()?.trim();
            if notes.is_empty() {
                return None;
            }
            Some((lead.scored_lead.lead.lead_id.clone(), excerpt(notes)))
        })
        .take(limit)
        .collect()
}

fn excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= NOTE_EXCERPT_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(NOTE_EXCERPT_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}

fn describe_lead(lead: &SegmentedLead) -> String {
    let record = &lead.scored_lead.lead;
    let name = if record.full_name.is_empty() {
        format!("Lead {}", record.lead_id)
    } else {
        record.full_name.clone()
    };
    let mut parts = vec![name];
    if !record.job_title.is_empty() {
        parts.push(record.job_title.clone());
    }
    if !record.company_name.is_empty() {
        parts.push(record.company_name.clone());
    }
    format!("{} (score {})", parts.join(", "), format_number(lead.score()))
}
