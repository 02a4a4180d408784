//! Sentence splitting with protection against false boundaries.
//!
//! Text goes through an ordered list of rewrite passes that hide periods
//! which do not end a sentence behind sentinels (abbreviations, initials,
//! decimals, ellipses, URLs and emails). Boundaries are then found on the
//! protected text and every sentinel is restored in the emitted sentences.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use ragchunk_core::config::AbbreviationLexicon;
use ragchunk_core::traits::TextSplitter;
use ragchunk_core::types::Strategy;
use ragchunk_core::{Error, Result};

// Private-use code points; these never appear in extracted document text.
const ABBR: &str = "\u{E000}";
const INITIAL: &str = "\u{E001}";
const DEC: &str = "\u{E002}";
const ELLIPSIS: &str = "\u{E003}";
const DOT: &str = "\u{E004}";

const RESTORE: [(&str, &str); 5] = [
    (ABBR, "."),
    (INITIAL, "."),
    (DEC, "."),
    (ELLIPSIS, "..."),
    (DOT, "."),
];

#[derive(Clone, Copy)]
enum Rewrite {
    /// Every period inside the match becomes the sentinel.
    Dots(&'static str),
    /// Like `Dots`, but trailing sentence punctuation stays visible.
    InnerDots(&'static str),
    /// Regex replacement template.
    Template(&'static str),
}

#[derive(Clone)]
struct Pass {
    pattern: Regex,
    rewrite: Rewrite,
}

impl Pass {
    fn new(pattern: &str, rewrite: Rewrite) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::Pattern(e.to_string()))?;
        Ok(Self { pattern, rewrite })
    }

    fn apply(&self, text: &str) -> String {
        match self.rewrite {
            Rewrite::Dots(sentinel) => self
                .pattern
                .replace_all(text, |caps: &Captures| caps[0].replace('.', sentinel))
                .into_owned(),
            Rewrite::InnerDots(sentinel) => self
                .pattern
                .replace_all(text, |caps: &Captures| {
                    let span = &caps[0];
                    let body = span.trim_end_matches(['.', '!', '?']);
                    format!("{}{}", body.replace('.', sentinel), &span[body.len()..])
                })
                .into_owned(),
            Rewrite::Template(template) => self.pattern.replace_all(text, template).into_owned(),
        }
    }
}

static FIXED_PASSES: Lazy<Vec<Pass>> = Lazy::new(|| {
    let passes = [
        (r"\b([A-Z])\.", Rewrite::Template("${1}\u{E001}")),
        (r"(\d)\.(\d)", Rewrite::Template("${1}\u{E002}${2}")),
        (r"\.{3}|\x{E2}\x{20AC}\x{A6}", Rewrite::Template(ELLIPSIS)),
        (r"https?://\S+", Rewrite::InnerDots(DOT)),
        (r"www\.\S+", Rewrite::InnerDots(DOT)),
        (r"\S+@\S+\.\S+", Rewrite::InnerDots(DOT)),
    ];
    passes
        .into_iter()
        .map(|(pattern, rewrite)| Pass::new(pattern, rewrite))
        .collect::<Result<Vec<_>>>()
        .expect("Invalid sentence protection pattern")
});

static DEFAULT_SPLITTER: Lazy<SentenceSplitter> = Lazy::new(|| {
    SentenceSplitter::new(&AbbreviationLexicon::default()).expect("Invalid built-in abbreviation lexicon")
});

/// Split `text` into sentences using the built-in abbreviation lexicon.
pub fn split_sentences(text: &str) -> Vec<String> {
    DEFAULT_SPLITTER.split_sentences(text)
}

/// Sentence splitter built from an abbreviation lexicon.
#[derive(Clone)]
pub struct SentenceSplitter {
    abbreviations: Vec<Pass>,
}

impl SentenceSplitter {
    pub fn new(lexicon: &AbbreviationLexicon) -> Result<Self> {
        let mut abbreviations = Vec::with_capacity(2);
        if let Some(alts) = alternation(&lexicon.multi_period) {
            abbreviations.push(Pass::new(&format!(r"(?i)\b(?:{alts})\.?"), Rewrite::Dots(ABBR))?);
        }
        if let Some(alts) = alternation(&lexicon.single_period) {
            abbreviations.push(Pass::new(&format!(r"(?i)\b(?:{alts})\."), Rewrite::Dots(ABBR))?);
        }
        Ok(Self { abbreviations })
    }

    pub fn split_sentences(&self, text: &str) -> Vec<String> {
        let protected = self.protect(text);
        boundaries(&protected).into_iter().map(restore).collect()
    }

    fn protect(&self, text: &str) -> String {
        self.abbreviations
            .iter()
            .chain(FIXED_PASSES.iter())
            .fold(text.to_string(), |acc, pass| pass.apply(&acc))
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        DEFAULT_SPLITTER.clone()
    }
}

impl TextSplitter for SentenceSplitter {
    fn strategy(&self) -> Strategy {
        Strategy::Sentence
    }

    fn split(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.split_sentences(text))
    }
}

/// Longest entries first so "U.S.A" wins over "U.S".
fn alternation(entries: &[String]) -> Option<String> {
    let mut entries: Vec<&str> = entries.iter().map(|e| e.trim()).filter(|e| !e.is_empty()).collect();
    if entries.is_empty() {
        return None;
    }
    entries.sort_by_key(|e| std::cmp::Reverse(e.len()));
    Some(entries.into_iter().map(regex::escape).collect::<Vec<_>>().join("|"))
}

fn opens_sentence(c: char) -> bool {
    c.is_uppercase() || matches!(c, '"' | '\'' | '(' | '[' | '\u{201C}' | '\u{2018}')
}

/// A `.`, `!` or `?` ends a sentence when followed by whitespace and a
/// sentence opener, or by nothing but trailing whitespace.
fn boundaries(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let rest = &text[end..];
        let after = rest.trim_start();
        let is_boundary = after.is_empty()
            || (after.len() < rest.len() && after.chars().next().is_some_and(opens_sentence));
        if is_boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn restore(sentence: &str) -> String {
    RESTORE
        .iter()
        .fold(sentence.to_string(), |acc, (sentinel, original)| acc.replace(sentinel, original))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Dr. Smith went to Washington. He met J. K. Rowling there! Did he enjoy it? \
        Yes... he did. The price was $29.99 for the book. Visit www.example.com for more info. \
        This is version 2.0 of the software.";

    #[test]
    fn protects_known_false_boundaries() {
        let sentences = split_sentences(SAMPLE);
        assert_eq!(
            sentences,
            vec![
                "Dr. Smith went to Washington.",
                "He met J. K. Rowling there!",
                "Did he enjoy it?",
                "Yes... he did.",
                "The price was $29.99 for the book.",
                "Visit www.example.com for more info.",
                "This is version 2.0 of the software.",
            ]
        );
    }

    #[test]
    fn quoted_exclamation_stays_inside_sentence() {
        let sentences = split_sentences("\"Amazing!\" she exclaimed. Then she left.");
        assert_eq!(sentences, vec!["\"Amazing!\" she exclaimed.", "Then she left."]);
    }

    #[test]
    fn multi_period_abbreviations_and_emails() {
        let sentences =
            split_sentences("She moved to the U.S.A. In 2020 she got a Ph.D. Write to jane.doe@uni.edu. Thanks!");
        assert_eq!(
            sentences,
            vec!["She moved to the U.S.A. In 2020 she got a Ph.D. Write to jane.doe@uni.edu.", "Thanks!"]
        );
    }

    #[test]
    fn url_keeps_trailing_period_as_boundary() {
        let sentences = split_sentences("Docs live at https://docs.rs/regex. Read them.");
        assert_eq!(sentences, vec!["Docs live at https://docs.rs/regex.", "Read them."]);
    }

    #[test]
    fn unterminated_tail_is_emitted() {
        assert_eq!(split_sentences("First one. second part"), vec!["First one. second part"]);
        assert_eq!(split_sentences("First one. Trailing words"), vec!["First one.", "Trailing words"]);
    }

    #[test]
    fn mis_decoded_ellipsis_is_restored_as_dots() {
        assert_eq!(split_sentences("Wait\u{e2}\u{20ac}\u{a6} What now?"), vec!["Wait... What now?"]);
    }

    #[test]
    fn placeholder_like_markup_is_left_alone() {
        let text = "Write <DOT> or <ELLIPSIS> in HTML. Use <ABBR> and <DEC> tags too. Done.";
        let sentences = split_sentences(text);
        assert_eq!(
            sentences,
            vec!["Write <DOT> or <ELLIPSIS> in HTML.", "Use <ABBR> and <DEC> tags too.", "Done."]
        );
        assert_eq!(sentences.join(" "), text);
    }

    #[test]
    fn protected_text_round_trips_exactly() {
        let text = "Dr. Lee paid $3.50 at 9 a.m. on Main St. near www.shop.example.com today... Then J. R. left.";
        assert_eq!(split_sentences(text).join(" "), text);
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn custom_lexicon_changes_protection() {
        let lexicon = AbbreviationLexicon { multi_period: vec![], single_period: vec!["Approx".into()] };
        let splitter = SentenceSplitter::new(&lexicon).unwrap();
        assert_eq!(splitter.split_sentences("Approx. Ten people came."), vec!["Approx. Ten people came."]);
        assert_eq!(splitter.split_sentences("Ask Dr. Who."), vec!["Ask Dr.", "Who."]);
    }

    #[test]
    fn resplitting_a_sentence_is_stable() {
        for sentence in split_sentences(SAMPLE) {
            assert_eq!(split_sentences(&sentence), vec![sentence.clone()]);
        }
    }
}
