// src/report/renderer.rs

use chrono::NaiveDateTime;

use super::{layout, CellValue, Report, Section, TableRow};
use crate::domain::period::ReportingPeriod;
use crate::domain::provider::Provider;
use crate::domain::status::status_chip;

const MISSING: &str = "N/A";
const NOTES_FALLBACK: &str = "No observations recorded";
const TAGLINE: &str = "Questions about this report? Contact your compliance desk.";
const COUNCIL_STATEMENT: &str = "Technical responsibility for the services covered by this \
report is registered with the regional engineering council under the registration and case \
numbers below.";

/// Build the full paginated report for one provider. Pure and
/// deterministic: identical inputs (including `generated_at`) produce an
/// identical Report. The orchestrator computes the period and timestamp
/// once per run so every report in a batch shares them.
pub fn render(provider: &Provider, period: ReportingPeriod, generated_at: NaiveDateTime) -> Report {
    let mut sections = Vec::with_capacity(6);

    sections.push(Section::Header {
        title: format!("REPORT — {}", period.label()),
        period_label: format!("Reporting period: {}", period.label()),
    });

    sections.push(provider_info_table(provider));
    sections.push(council_block(provider));
    sections.push(regulatory_table(provider));
    sections.push(notes_section(provider));

    sections.push(Section::Footer {
        generated_at: generated_at.format("Generated on %B %-d, %Y at %H:%M").to_string(),
        tagline: TAGLINE.to_string(),
    });

    Report {
        pages: layout::paginate(sections),
    }
}

fn text_or_missing(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => MISSING.to_string(),
    }
}

fn provider_info_table(provider: &Provider) -> Section {
    let text_row = |label: &str, value: Option<&str>| TableRow {
        label: label.to_string(),
        value: CellValue::Text(text_or_missing(value)),
    };

    Section::InfoTable {
        title: "Provider Information".to_string(),
        rows: vec![
            text_row("Legal Name", provider.legal_name.as_deref()),
            text_row("Tax ID", provider.tax_id.as_deref()),
            text_row("Tax Regime", provider.tax_regime.as_deref()),
            text_row("ANATEL Registration", provider.anatel_registration.as_deref()),
            text_row("SCM License Number", provider.scm_license_number.as_deref()),
            TableRow {
                label: "Company Status".to_string(),
                value: CellValue::Chip(status_chip(provider.company_status.as_deref())),
            },
        ],
    }
}

fn council_block(provider: &Provider) -> Section {
    let council = &provider.council;

    let responsible = match (
        council.responsible_first_name.as_deref().map(str::trim),
        council.responsible_last_name.as_deref().map(str::trim),
    ) {
        (Some(f), Some(l)) if !f.is_empty() && !l.is_empty() => format!("{f} {l}"),
        (Some(f), _) if !f.is_empty() => f.to_string(),
        (_, Some(l)) if !l.is_empty() => l.to_string(),
        _ => MISSING.to_string(),
    };

    let registration = text_or_missing(council.registration_number.as_deref());
    let cases = text_or_missing(council.case_numbers.as_deref());

    Section::CouncilBlock {
        statement_lines: layout::wrap_text(COUNCIL_STATEMENT, layout::NOTES_WRAP_WIDTH),
        responsible: format!("Responsible: {responsible} (reg. {registration})"),
        case_numbers: format!("Case numbers: {cases}"),
    }
}

fn regulatory_table(provider: &Provider) -> Section {
    Section::InfoTable {
        title: "Regulatory Information".to_string(),
        rows: provider
            .regulatory
            .rows()
            .into_iter()
            .map(|(label, value)| TableRow {
                label: label.to_string(),
                value: CellValue::Chip(status_chip(value)),
            })
            .collect(),
    }
}

fn notes_section(provider: &Provider) -> Section {
    let notes = provider
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOTES_FALLBACK);

    Section::Notes {
        lines: layout::wrap_text(notes, layout::NOTES_WRAP_WIDTH),
    }
}
