//! Pick a chunking strategy from document statistics.
//!
//! | Condition                                           | Strategy  |
//! |-----------------------------------------------------|-----------|
//! | fewer than 500 characters                           | sentence  |
//! | 2+ paragraphs averaging between 100 and 3000 chars  | paragraph |
//! | fewer than 1500 characters                          | sentence  |
//! | otherwise                                           | overlap   |
//!
//! Rows are evaluated top to bottom; the first match wins.

use ragchunk_core::types::{Element, Strategy};

use crate::paragraph::count_paragraphs;

pub const TINY_DOC_CHARS: usize = 500;
pub const SMALL_DOC_CHARS: usize = 1500;
pub const MIN_AVG_SECTION_CHARS: f64 = 100.0;
pub const MAX_AVG_SECTION_CHARS: f64 = 3000.0;

/// Word window used when the selector falls back to overlap on plain text.
pub const AUTO_OVERLAP_CHUNK_SIZE: usize = 500;
pub const AUTO_OVERLAP: usize = 50;

/// Statistics the selector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub char_count: usize,
    /// Paragraphs for plain text, non-empty elements for element documents.
    pub sections: usize,
}

impl TextStats {
    pub fn of_text(text: &str) -> Self {
        Self { char_count: text.chars().count(), sections: count_paragraphs(text) }
    }

    pub fn of_elements(elements: &[Element]) -> Self {
        let texts: Vec<&str> =
            elements.iter().map(|e| e.text.trim()).filter(|t| !t.is_empty()).collect();
        Self { char_count: texts.join("\n\n").chars().count(), sections: texts.len() }
    }

    fn has_sized_sections(&self) -> bool {
        if self.sections < 2 {
            return false;
        }
        let avg = self.char_count as f64 / self.sections as f64;
        MIN_AVG_SECTION_CHARS < avg && avg < MAX_AVG_SECTION_CHARS
    }
}

pub fn select_strategy(text: &str) -> Strategy {
    select_for_stats(&TextStats::of_text(text))
}

pub fn select_for_stats(stats: &TextStats) -> Strategy {
    if stats.char_count < TINY_DOC_CHARS {
        return Strategy::Sentence;
    }
    if stats.has_sized_sections() {
        return Strategy::Paragraph;
    }
    if stats.char_count < SMALL_DOC_CHARS {
        return Strategy::Sentence;
    }
    Strategy::Overlap
}

/// Selection for documents delivered as elements. Elements stand in for
/// paragraphs, and a multi-element document whose elements are badly sized
/// goes straight to overlap.
pub fn select_element_strategy(elements: &[Element]) -> Strategy {
    let stats = TextStats::of_elements(elements);
    if stats.char_count < TINY_DOC_CHARS {
        return Strategy::Sentence;
    }
    if stats.sections >= 2 {
        return if stats.has_sized_sections() { Strategy::Element } else { Strategy::Overlap };
    }
    if stats.char_count < SMALL_DOC_CHARS {
        return Strategy::Sentence;
    }
    Strategy::Overlap
}
