use ragchunk_core::types::{Chunk, Page};

/// Splitter output before provenance is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub text: String,
    pub page: Option<Page>,
}

impl Piece {
    pub fn new(text: impl Into<String>, page: Option<Page>) -> Self {
        Self { text: text.into(), page }
    }

    pub fn unpaged(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }
}

/// Turn a document's ordered pieces into chunk records.
///
/// Pieces that are empty after trimming are dropped before numbering, so
/// indices are dense and `total` is the final count for the document.
pub fn assemble(source: &str, pieces: Vec<Piece>) -> Vec<Chunk> {
    let kept: Vec<Piece> = pieces
        .into_iter()
        .filter_map(|p| {
            let text = p.text.trim();
            (!text.is_empty()).then(|| Piece::new(text, p.page.clone()))
        })
        .collect();

    let total = kept.len();
    kept.into_iter()
        .enumerate()
        .map(|(index, piece)| Chunk {
            char_count: piece.text.chars().count(),
            text: piece.text,
            source: source.to_string(),
            page: piece.page,
            index,
            total,
        })
        .collect()
}
