//! Domain types shared by the splitters, the assembler and the indexers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// One text element supplied by a document reader, with the page it came
/// from when the reader knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub text: String,
    pub page: Option<u32>,
}

impl Element {
    pub fn new(text: impl Into<String>, page: Option<u32>) -> Self {
        Self { text: text.into(), page }
    }
}

/// A loaded document. `filename` is only used for provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub filename: String,
    pub elements: Vec<Element>,
}

impl Document {
    /// A plain-text document without page information.
    pub fn from_text(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self { filename: filename.into(), elements: vec![Element::new(text, None)] }
    }

    pub fn from_elements(filename: impl Into<String>, elements: Vec<Element>) -> Self {
        Self { filename: filename.into(), elements }
    }

    /// Element texts joined by a blank line.
    pub fn raw_text(&self) -> String {
        self.elements.iter().map(|e| e.text.as_str()).collect::<Vec<_>>().join("\n\n")
    }

    pub fn file_type(&self) -> String {
        file_type(&self.filename)
    }
}

/// Lowercased extension including the dot (".pdf"), or "" when absent.
pub fn file_type(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Page attribution of a chunk: a single page, or the sorted pages a chunk spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Page {
    Single(u32),
    Span(Vec<u32>),
}

impl Page {
    /// Collapse the pages that contributed to a chunk. Unknown pages are
    /// ignored; `None` when no page is known.
    pub fn from_pages<I>(pages: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<u32>>,
    {
        let pages: BTreeSet<u32> = pages.into_iter().flatten().collect();
        match pages.len() {
            0 => None,
            1 => pages.into_iter().next().map(Page::Single),
            _ => Some(Page::Span(pages.into_iter().collect())),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Single(p) => write!(f, "Page {p}"),
            Page::Span(pages) => {
                let list = pages.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
                write!(f, "Pages {list}")
            }
        }
    }
}

/// The splitting algorithm applied to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Sentence,
    Paragraph,
    Overlap,
    Element,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Sentence => "sentence",
            Strategy::Paragraph => "paragraph",
            Strategy::Overlap => "overlap",
            Strategy::Element => "element",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finalized chunk ready for embedding.
///
/// - `index`: 0-based position within the source document
/// - `total`: number of chunks produced for the document
/// - `char_count`: length of `text` in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub page: Option<Page>,
    pub index: usize,
    pub total: usize,
    pub char_count: usize,
}

impl Chunk {
    /// Source label used when quoting the chunk back to a user.
    pub fn citation(&self) -> String {
        match &self.page {
            Some(page) => format!("[{}, {}]", self.source, page),
            None => format!("[{}]", self.source),
        }
    }

    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            source: self.source.clone(),
            file_type: file_type(&self.source),
            page: self.page.clone(),
            chunk_index: self.index,
            total_chunks: self.total,
            char_count: self.char_count,
        }
    }
}

/// Per-chunk metadata stored next to the embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub file_type: String,
    pub page: Option<Page>,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub char_count: usize,
}

/// Stable id for a chunk: `{sanitized stem}_chunk_{index}`.
///
/// The stem has spaces and dashes replaced by underscores and is cut to
/// 20 characters.
pub fn chunk_id(filename: &str, index: usize) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sanitized: String = stem.replace([' ', '-'], "_").chars().take(20).collect();
    format!("{sanitized}_chunk_{index}")
}

/// Parallel lists handed to a vector store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<ChunkMetadata>,
}

impl IndexBatch {
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        let mut batch = Self::default();
        for chunk in chunks {
            batch.ids.push(chunk_id(&chunk.source, chunk.index));
            batch.documents.push(chunk.text.clone());
            batch.metadatas.push(chunk.metadata());
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_collapses_to_single_or_span() {
        assert_eq!(Page::from_pages([None, None]), None);
        assert_eq!(Page::from_pages([Some(3), Some(3), None]), Some(Page::Single(3)));
        assert_eq!(Page::from_pages([Some(4), Some(2), Some(4)]), Some(Page::Span(vec![2, 4])));
    }

    #[test]
    fn page_serializes_as_int_or_list() {
        assert_eq!(serde_json::to_string(&Page::Single(2)).unwrap(), "2");
        assert_eq!(serde_json::to_string(&Page::Span(vec![1, 2])).unwrap(), "[1,2]");
        let back: Page = serde_json::from_str("[5,6]").unwrap();
        assert_eq!(back, Page::Span(vec![5, 6]));
    }

    #[test]
    fn chunk_id_sanitizes_stem() {
        assert_eq!(chunk_id("my report-v2.pdf", 3), "my_report_v2_chunk_3");
        assert_eq!(chunk_id("a very long file name indeed.txt", 0), "a_very_long_file_nam_chunk_0");
        assert_eq!(chunk_id("notes", 1), "notes_chunk_1");
    }

    #[test]
    fn strategy_uses_snake_case_names() {
        for s in [Strategy::Sentence, Strategy::Paragraph, Strategy::Overlap, Strategy::Element] {
            assert_eq!(serde_json::to_string(&s).unwrap(), format!("\"{}\"", s.as_str()));
        }
        assert!(serde_json::from_str::<Strategy>("\"fixed\"").is_err());
    }

    #[test]
    fn citation_formats_pages() {
        let mut chunk = Chunk {
            text: "x".into(),
            source: "doc.pdf".into(),
            page: Some(Page::Single(2)),
            index: 0,
            total: 1,
            char_count: 1,
        };
        assert_eq!(chunk.citation(), "[doc.pdf, Page 2]");
        assert_eq!(chunk.metadata().file_type, ".pdf");
        chunk.page = Some(Page::Span(vec![2, 3]));
        assert_eq!(chunk.citation(), "[doc.pdf, Pages 2, 3]");
        chunk.page = None;
        assert_eq!(chunk.citation(), "[doc.pdf]");
    }

    #[test]
    fn document_file_type_and_raw_text() {
        let doc = Document::from_elements(
            "Report.PDF",
            vec![Element::new("one", Some(1)), Element::new("two", Some(2))],
        );
        assert_eq!(doc.file_type(), ".pdf");
        assert_eq!(doc.raw_text(), "one\n\ntwo");
        assert_eq!(Document::from_text("README", "b").file_type(), "");
    }
}
