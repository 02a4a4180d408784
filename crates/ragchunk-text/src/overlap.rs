//! Word windows, with or without overlap, and the page-aware element window.

use ragchunk_core::config::validate_window;
use ragchunk_core::traits::TextSplitter;
use ragchunk_core::types::{Element, Page, Strategy};
use ragchunk_core::Result;

use crate::metadata::Piece;

/// Split whitespace-separated words into windows of `chunk_size` words.
/// Each window after the first starts with the last `overlap` words of the
/// one before it.
///
/// The final window may be shorter than `chunk_size`. It is only emitted
/// when it holds words not already emitted, so input that ends exactly on
/// a window boundary produces no trailing chunk made of overlap alone.
pub fn split_overlap(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    validate_window(chunk_size, overlap)?;

    let mut chunks = Vec::new();
    let mut window: Vec<&str> = Vec::with_capacity(chunk_size);
    // words at the front of `window` copied from the previous chunk
    let mut carried = 0;

    for word in text.split_whitespace() {
        window.push(word);
        if window.len() == chunk_size {
            chunks.push(window.join(" "));
            window.drain(..chunk_size - overlap);
            carried = window.len();
        }
    }

    if window.len() > carried {
        chunks.push(window.join(" "));
    }
    Ok(chunks)
}

/// Non-overlapping windows of `chunk_size` words.
pub fn split_fixed(text: &str, chunk_size: usize) -> Result<Vec<String>> {
    split_overlap(text, chunk_size, 0)
}

#[derive(Debug, Clone, Copy)]
pub struct OverlapSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl OverlapSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate_window(chunk_size, overlap)?;
        Ok(Self { chunk_size, overlap })
    }
}

impl TextSplitter for OverlapSplitter {
    fn strategy(&self) -> Strategy {
        Strategy::Overlap
    }

    fn split(&self, text: &str) -> Result<Vec<String>> {
        split_overlap(text, self.chunk_size, self.overlap)
    }
}

/// Combine whole elements until the next one would push the chunk past
/// `chunk_size` characters.
///
/// A new chunk opens with the last `overlap` words of the previous chunk
/// (all of it when it is that short). Only elements merged into a chunk
/// count towards its page; the carried words do not. A single element
/// longer than `chunk_size` becomes one oversized chunk.
pub fn split_elements(elements: &[Element], chunk_size: usize, overlap: usize) -> Result<Vec<Piece>> {
    validate_window(chunk_size, overlap)?;

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;
    let mut pages: Vec<Option<u32>> = Vec::new();

    for element in elements {
        let text = element.text.trim();
        if text.is_empty() {
            continue;
        }
        let len = text.chars().count();

        if !current.is_empty() && current_chars + len > chunk_size {
            pieces.push(Piece::new(current.trim(), Page::from_pages(pages.drain(..))));
            current = overlap_tail(&current, overlap);
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(text);
        current_chars = current.chars().count();
        pages.push(element.page);
    }

    if !current.trim().is_empty() {
        pieces.push(Piece::new(current.trim(), Page::from_pages(pages)));
    }
    Ok(pieces)
}

fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > overlap {
        words[words.len() - overlap..].join(" ")
    } else {
        text.to_string()
    }
}
