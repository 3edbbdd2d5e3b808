// src/report/pdf.rs
//
// Flattens a Report into a self-contained PDF 1.4 byte stream: one page
// object + content stream per report page, built-in Helvetica fonts,
// WinAnsi text. No compression, no external resources, deterministic
// output for identical reports.

use super::layout::{LINE_HEIGHT, ROW_HEIGHT, SECTION_GAP};
use super::{CellValue, Page, Report, Section};
use crate::domain::status::Rgb;

const PAGE_WIDTH: f32 = 595.0; // A4 portrait, points
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const LABEL_X: f32 = MARGIN;
const VALUE_X: f32 = 240.0;

const INK: Rgb = (17, 24, 39);
const MUTED: Rgb = (107, 114, 128);
const PANEL_BG: Rgb = (243, 244, 246);

/// Serialize the report to PDF bytes.
pub fn serialize_pdf(report: &Report) -> Vec<u8> {
    let mut objects: Vec<Vec<u8>> = Vec::new();

    let n_pages = report.pages.len();
    // Object numbering: 1 catalog, 2 page tree, 3/4 fonts, then for each
    // page an even/odd pair (page object, content stream).
    let page_obj = |i: usize| 5 + 2 * i;
    let content_obj = |i: usize| 6 + 2 * i;

    let kids: Vec<String> = (0..n_pages).map(|i| format!("{} 0 R", page_obj(i))).collect();

    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            n_pages
        )
        .into_bytes(),
    );
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec());
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>".to_vec());

    for (i, page) in report.pages.iter().enumerate() {
        let stream = page_content(page);

        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
/Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                content_obj(i)
            )
            .into_bytes(),
        );

        let mut content = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        content.extend_from_slice(&stream);
        content.extend_from_slice(b"\nendstream");
        objects.push(content);
    }

    assemble(&objects)
}

/// Lay the file out: header, numbered objects, xref table, trailer.
fn assemble(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );

    out
}

fn page_content(page: &Page) -> Vec<u8> {
    let mut ops = ContentOps::default();
    let mut y = PAGE_HEIGHT - MARGIN;

    for section in &page.sections {
        y = draw_section(&mut ops, section, y);
        y -= SECTION_GAP;
    }

    ops.buf
}

/// Draw one section with its top edge at `y`; returns the y below it.
fn draw_section(ops: &mut ContentOps, section: &Section, top: f32) -> f32 {
    let mut y = top;
    match section {
        Section::Header { title, period_label } => {
            y -= 18.0;
            ops.text("F2", 18.0, MARGIN, y, INK, title);
            y -= 16.0;
            ops.text("F1", 10.0, MARGIN, y, MUTED, period_label);
            y -= 8.0;
        }
        Section::InfoTable { title, rows } => {
            y -= 12.0;
            ops.text("F2", 12.0, MARGIN, y, INK, title);
            y -= 10.0;
            for row in rows {
                y -= ROW_HEIGHT;
                ops.text("F1", 9.0, LABEL_X, y, MUTED, &row.label);
                match &row.value {
                    CellValue::Text(text) => ops.text("F1", 9.0, VALUE_X, y, INK, text),
                    CellValue::Chip(chip) => ops.chip(VALUE_X, y, chip),
                }
            }
        }
        Section::CouncilBlock {
            statement_lines,
            responsible,
            case_numbers,
        } => {
            let inner = 22.0
                + statement_lines.len() as f32 * LINE_HEIGHT
                + 2.0 * ROW_HEIGHT
                + 12.0;
            ops.rect(MARGIN - 8.0, y - inner, PAGE_WIDTH - 2.0 * MARGIN + 16.0, inner, PANEL_BG);

            y -= 18.0;
            ops.text("F2", 11.0, MARGIN, y, INK, "Council Registration");
            for line in statement_lines {
                y -= LINE_HEIGHT;
                ops.text("F1", 9.0, MARGIN, y, INK, line);
            }
            y -= ROW_HEIGHT;
            ops.text("F1", 9.0, MARGIN, y, INK, responsible);
            y -= ROW_HEIGHT;
            ops.text("F1", 9.0, MARGIN, y, INK, case_numbers);
            y -= 12.0;
        }
        Section::Notes { lines } => {
            y -= 12.0;
            ops.text("F2", 12.0, MARGIN, y, INK, "Notes");
            y -= 10.0;
            for line in lines {
                y -= LINE_HEIGHT;
                ops.text("F1", 9.0, MARGIN, y, INK, line);
            }
        }
        Section::Footer { generated_at, tagline } => {
            y -= 14.0;
            ops.text("F1", 8.0, MARGIN, y, MUTED, generated_at);
            y -= 12.0;
            ops.text("F1", 8.0, MARGIN, y, MUTED, tagline);
        }
    }
    y
}

#[derive(Default)]
struct ContentOps {
    buf: Vec<u8>,
}

impl ContentOps {
    fn fill_color(&mut self, (r, g, b): Rgb) {
        self.buf.extend_from_slice(
            format!(
                "{:.3} {:.3} {:.3} rg\n",
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0
            )
            .as_bytes(),
        );
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.fill_color(color);
        self.buf
            .extend_from_slice(format!("{x:.1} {y:.1} {w:.1} {h:.1} re f\n").as_bytes());
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, color: Rgb, s: &str) {
        self.fill_color(color);
        self.buf
            .extend_from_slice(format!("BT /{font} {size:.1} Tf {x:.1} {y:.1} Td ").as_bytes());
        self.buf.push(b'(');
        self.buf.extend_from_slice(&pdf_string_bytes(s));
        self.buf.extend_from_slice(b") Tj ET\n");
    }

    /// Status chip: filled pill behind the label, label in the bucket's
    /// foreground color.
    fn chip(&mut self, x: f32, baseline: f32, chip: &crate::domain::status::StatusChip) {
        let width = chip.label.chars().count() as f32 * 5.0 + 12.0;
        self.rect(x - 6.0, baseline - 3.5, width, 14.0, chip.background);
        self.text("F1", 9.0, x, baseline, chip.foreground, &chip.label);
    }
}

/// Encode a string for a PDF literal: WinAnsi (Latin-1) bytes with
/// parens/backslash escaped; characters outside Latin-1 degrade to '?'.
fn pdf_string_bytes(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            c if (c as u32) < 256 => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}
