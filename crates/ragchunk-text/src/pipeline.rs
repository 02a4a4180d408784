//! Document -> strategy -> splitter -> chunk records -> indexer.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use ragchunk_core::config::{ChunkingConfig, Config};
use ragchunk_core::traits::ChunkIndexer;
use ragchunk_core::types::{Chunk, Document, IndexBatch, Page, Strategy};
use ragchunk_core::{Error, Result};

use crate::metadata::{assemble, Piece};
use crate::overlap::{split_elements, split_overlap};
use crate::paragraph::split_paragraphs;
use crate::selector::{
    select_element_strategy, select_for_stats, TextStats, AUTO_OVERLAP, AUTO_OVERLAP_CHUNK_SIZE,
};
use crate::sentence::SentenceSplitter;

/// Splits documents into chunk records. Holds only configuration, so one
/// instance can be shared across threads.
#[derive(Clone)]
pub struct Chunker {
    config: ChunkingConfig,
    sentences: SentenceSplitter,
}

/// Outcome of ingesting a batch of documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub total_chunks: usize,
    /// Processed documents per file extension.
    pub by_type: BTreeMap<String, usize>,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, sentences: SentenceSplitter::default() })
    }

    /// Build from the `[chunking]` and `[abbreviations]` sections.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let sentences = SentenceSplitter::new(&config.lexicon()?)?;
        Ok(Self::new(config.chunking()?)?.with_sentence_splitter(sentences))
    }

    pub fn with_sentence_splitter(mut self, sentences: SentenceSplitter) -> Self {
        self.sentences = sentences;
        self
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// The strategy `chunk` would use for `doc`.
    pub fn select(&self, doc: &Document) -> Strategy {
        self.config.strategy.unwrap_or_else(|| selection(doc).0)
    }

    /// Chunk with the configured strategy, or one selected from the
    /// document's statistics when none is configured.
    pub fn chunk(&self, doc: &Document) -> Result<Vec<Chunk>> {
        if let Some(strategy) = self.config.strategy {
            info!(source = %doc.filename, strategy = %strategy, "using configured chunking strategy");
            return self.run(doc, strategy, (self.config.chunk_size, self.config.overlap));
        }

        let (strategy, stats) = selection(doc);
        info!(
            source = %doc.filename,
            strategy = %strategy,
            chars = stats.char_count,
            sections = stats.sections,
            "selected chunking strategy"
        );
        let window = (AUTO_OVERLAP_CHUNK_SIZE, AUTO_OVERLAP);
        self.run(doc, strategy, window)
    }

    /// Chunk with a caller-chosen strategy and the configured windows.
    pub fn chunk_with(&self, doc: &Document, strategy: Strategy) -> Result<Vec<Chunk>> {
        debug!(source = %doc.filename, strategy = %strategy, "chunking with explicit strategy");
        self.run(doc, strategy, (self.config.chunk_size, self.config.overlap))
    }

    fn run(&self, doc: &Document, strategy: Strategy, word_window: (usize, usize)) -> Result<Vec<Chunk>> {
        let pieces = self.pieces(doc, strategy, word_window)?;
        let chunks = assemble(&doc.filename, pieces);
        debug!(source = %doc.filename, chunks = chunks.len(), "document chunked");
        Ok(chunks)
    }

    fn pieces(&self, doc: &Document, strategy: Strategy, word_window: (usize, usize)) -> Result<Vec<Piece>> {
        let per_element = |split: &dyn Fn(&str) -> Vec<String>| -> Vec<Piece> {
            doc.elements
                .iter()
                .flat_map(|el| {
                    let page = Page::from_pages([el.page]);
                    split(el.text.as_str()).into_iter().map(move |text| Piece::new(text, page.clone()))
                })
                .collect()
        };

        let pieces = match strategy {
            Strategy::Sentence => per_element(&|text: &str| self.sentences.split_sentences(text)),
            Strategy::Paragraph => per_element(&split_paragraphs),
            Strategy::Element => per_element(&|text: &str| vec![text.to_string()]),
            Strategy::Overlap => match doc.elements.as_slice() {
                [single] => {
                    let (chunk_size, overlap) = word_window;
                    let page = Page::from_pages([single.page]);
                    split_overlap(&single.text, chunk_size, overlap)?
                        .into_iter()
                        .map(|text| Piece::new(text, page.clone()))
                        .collect()
                }
                elements => {
                    split_elements(elements, self.config.element_chunk_size, self.config.element_overlap)?
                }
            },
        };
        Ok(pieces)
    }

    /// Chunk one document and hand it to `indexer`, replacing whatever the
    /// store held for the same source. Returns the number of chunks indexed;
    /// a document without chunks is not sent and its old chunks stay.
    pub fn ingest(&self, doc: &Document, indexer: &dyn ChunkIndexer) -> Result<usize> {
        let chunks = self.chunk(doc)?;
        if chunks.is_empty() {
            warn!(source = %doc.filename, "no chunks created, skipping");
            return Ok(0);
        }

        match indexer.remove_source(&doc.filename) {
            Ok(0) => {}
            Ok(removed) => info!(source = %doc.filename, removed, "replaced existing chunks"),
            // an unreadable store still gets the new chunks
            Err(e) => warn!(source = %doc.filename, error = %e, "could not remove existing chunks"),
        }

        let batch = IndexBatch::from_chunks(&chunks);
        indexer
            .index(&batch)
            .map_err(|e| Error::Operation(format!("indexing {} failed: {e:#}", doc.filename)))?;
        info!(source = %doc.filename, chunks = batch.len(), "document indexed");
        Ok(batch.len())
    }

    /// Ingest documents independently; a failure only affects its own document.
    pub fn ingest_all<'a, I>(&self, docs: I, indexer: &dyn ChunkIndexer) -> IngestStats
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut stats = IngestStats::default();
        for doc in docs {
            match self.ingest(doc, indexer) {
                Ok(0) => stats.documents_failed += 1,
                Ok(count) => {
                    stats.documents_processed += 1;
                    stats.total_chunks += count;
                    *stats.by_type.entry(doc.file_type()).or_insert(0) += 1;
                }
                Err(e) => {
                    warn!(source = %doc.filename, error = %e, "document failed");
                    stats.documents_failed += 1;
                }
            }
        }
        info!(
            processed = stats.documents_processed,
            failed = stats.documents_failed,
            chunks = stats.total_chunks,
            "ingestion complete"
        );
        stats
    }
}

// A single element is plain text; several are treated as page-aware elements.
fn selection(doc: &Document) -> (Strategy, TextStats) {
    match doc.elements.as_slice() {
        [single] => {
            let stats = TextStats::of_text(&single.text);
            (select_for_stats(&stats), stats)
        }
        elements => (select_element_strategy(elements), TextStats::of_elements(elements)),
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self { config: ChunkingConfig::default(), sentences: SentenceSplitter::default() }
    }
}
