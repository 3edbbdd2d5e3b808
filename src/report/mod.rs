mod layout;
mod pdf;
mod renderer;

pub use layout::{paginate, wrap_text, NOTES_WRAP_WIDTH, PAGE_CONTENT_HEIGHT};
pub use pdf::serialize_pdf;
pub use renderer::render;

use crate::domain::status::StatusChip;

/// A compliance report: ordered pages of ordered sections. Ephemeral,
/// rebuilt on every run, flattened to PDF bytes for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub sections: Vec<Section>,
}

/// One visual block. Sections are laid out top-to-bottom and never split
/// across pages.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Header {
        title: String,
        period_label: String,
    },
    InfoTable {
        title: String,
        rows: Vec<TableRow>,
    },
    CouncilBlock {
        statement_lines: Vec<String>,
        responsible: String,
        case_numbers: String,
    },
    Notes {
        lines: Vec<String>,
    },
    Footer {
        generated_at: String,
        tagline: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Chip(StatusChip),
}
