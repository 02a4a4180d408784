#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod metadata;
pub mod overlap;
pub mod paragraph;
pub mod pipeline;
pub mod selector;
pub mod sentence;

pub use metadata::{assemble, Piece};
pub use overlap::{split_elements, split_fixed, split_overlap, OverlapSplitter};
pub use paragraph::{split_paragraphs, ParagraphSplitter};
pub use pipeline::{Chunker, IngestStats};
pub use selector::{select_element_strategy, select_strategy};
pub use sentence::{split_sentences, SentenceSplitter};
