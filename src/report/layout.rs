// src/report/layout.rs
//
// Pure text/page layout: word wrapping against a fixed character width
// and greedy pagination of sections against a fixed page height.

use super::{Page, Section};

/// Usable vertical space per page, in points (A4 minus top/bottom margins).
pub const PAGE_CONTENT_HEIGHT: f32 = 742.0;

/// Character width the notes block is wrapped against.
pub const NOTES_WRAP_WIDTH: usize = 90;

pub(crate) const LINE_HEIGHT: f32 = 13.0;
pub(crate) const ROW_HEIGHT: f32 = 18.0;
pub(crate) const SECTION_GAP: f32 = 16.0;

/// Wrap `text` into lines of at most `max_width` characters, breaking at
/// whitespace. A single word longer than `max_width` keeps its own line
/// unmodified. Blank input yields no lines.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Vertical space a section occupies, including its trailing gap.
pub fn section_height(section: &Section) -> f32 {
    let body = match section {
        Section::Header { .. } => 42.0,
        Section::InfoTable { rows, .. } => 22.0 + rows.len() as f32 * ROW_HEIGHT,
        Section::CouncilBlock {
            statement_lines, ..
        } => 22.0 + statement_lines.len() as f32 * LINE_HEIGHT + 2.0 * ROW_HEIGHT + 12.0,
        Section::Notes { lines } => {
            22.0 + lines.len().max(1) as f32 * LINE_HEIGHT
        }
        Section::Footer { .. } => 30.0,
    };
    body + SECTION_GAP
}

/// Greedy top-to-bottom pagination. A section that would overflow the
/// remaining height of the current page starts a new page; a section
/// taller than a whole page still gets placed (alone) rather than being
/// rejected.
pub fn paginate(sections: Vec<Section>) -> Vec<Page> {
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<Section> = Vec::new();
    let mut consumed: f32 = 0.0;

    for section in sections {
        let h = section_height(&section);
        if !current.is_empty() && consumed + h > PAGE_CONTENT_HEIGHT {
            pages.push(Page { sections: current });
            current = Vec::new();
            consumed = 0.0;
        }
        consumed += h;
        current.push(section);
    }

    if !current.is_empty() {
        pages.push(Page { sections: current });
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_of(n_lines: usize) -> Section {
        Section::Notes {
            lines: vec!["x".to_string(); n_lines],
        }
    }

    #[test]
    fn wrap_respects_max_width() {
        let text = "the quick brown fox jumps over the lazy dog and keeps on running";
        let lines = wrap_text(text, 20);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 20, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_never_splits_words() {
        let lines = wrap_text("alpha beta gamma", 10);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, "alpha beta gamma");
    }

    #[test]
    fn overlength_word_gets_its_own_line_unmodified() {
        let long = "supercalifragilisticexpialidocious";
        let lines = wrap_text(&format!("ok {long} ok"), 10);
        assert!(lines.contains(&long.to_string()));
        assert_eq!(lines, vec!["ok", long, "ok"]);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap_text("", 40).is_empty());
        assert!(wrap_text("   \n  ", 40).is_empty());
    }

    #[test]
    fn sections_fill_then_overflow_to_next_page() {
        // Each notes block of 50 lines is ~688pt; two never fit one page.
        let pages = paginate(vec![notes_of(50), notes_of(50)]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].sections.len(), 1);
        assert_eq!(pages[1].sections.len(), 1);
    }

    #[test]
    fn small_sections_share_a_page() {
        let pages = paginate(vec![
            Section::Header {
                title: "t".into(),
                period_label: "p".into(),
            },
            notes_of(2),
            Section::Footer {
                generated_at: "now".into(),
                tagline: "tag".into(),
            },
        ]);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].sections.len(), 3);
    }

    #[test]
    fn oversized_section_is_still_placed() {
        // Taller than a whole page on its own.
        let pages = paginate(vec![notes_of(500)]);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].sections.len(), 1);
    }

    #[test]
    fn oversized_section_does_not_drag_neighbors_onto_its_page() {
        let pages = paginate(vec![notes_of(3), notes_of(500), notes_of(3)]);
        assert_eq!(pages.len(), 3);
    }
}
