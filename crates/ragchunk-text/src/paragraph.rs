use once_cell::sync::Lazy;
use regex::Regex;

use ragchunk_core::traits::TextSplitter;
use ragchunk_core::types::Strategy;
use ragchunk_core::Result;

// A blank line: two line breaks with only whitespace between them.
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("Invalid paragraph regex pattern"));

/// Split on blank lines; segments are trimmed and empty ones dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn count_paragraphs(text: &str) -> usize {
    PARAGRAPH_BREAK.split(text).filter(|p| !p.trim().is_empty()).count()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphSplitter;

impl TextSplitter for ParagraphSplitter {
    fn strategy(&self) -> Strategy {
        Strategy::Paragraph
    }

    fn split(&self, text: &str) -> Result<Vec<String>> {
        Ok(split_paragraphs(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines_only() {
        let text = "First line\nstill first.\n\nSecond.\n   \n\t\nThird.\r\n\r\nFourth.";
        assert_eq!(
            split_paragraphs(text),
            vec!["First line\nstill first.", "Second.", "Third.", "Fourth."]
        );
        assert_eq!(count_paragraphs(text), 4);
    }

    #[test]
    fn empty_input_has_no_paragraphs() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n\n  \n\n").is_empty());
        assert_eq!(count_paragraphs(" \n\n "), 0);
    }

    #[test]
    fn resplitting_a_paragraph_returns_it() {
        let text = "Alpha beta.\n\nGamma\ndelta.\n\n\n\nEpsilon.";
        for paragraph in split_paragraphs(text) {
            assert_eq!(split_paragraphs(&paragraph), vec![paragraph.clone()]);
        }
    }
}
