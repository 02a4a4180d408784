use crate::types::{IndexBatch, Strategy};

/// Splits raw text into trimmed, non-empty pieces.
pub trait TextSplitter: Send + Sync {
    fn strategy(&self) -> Strategy;
    fn split(&self, text: &str) -> crate::Result<Vec<String>>;
}

/// Receives finished chunk batches (embedding + vector store).
pub trait ChunkIndexer: Send + Sync {
    fn index(&self, batch: &IndexBatch) -> anyhow::Result<()>;

    /// Delete every stored chunk whose metadata `source` equals `source`.
    /// Returns how many were removed.
    fn remove_source(&self, source: &str) -> anyhow::Result<usize>;
}
