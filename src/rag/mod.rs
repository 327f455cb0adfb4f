//! Knowledge-base retrieval.
//!
//! This module provides:
//! - `VectorIndex`: nearest-neighbor lookup over passage embeddings
//! - `SqliteVectorIndex` / `IndexWriter`: the on-disk index and its writer
//! - `Chunker` and `IndexBuilder`: the offline corpus-to-index build

mod chunker;
mod ingest;
mod sqlite;
mod store;
mod vector_math;

pub use chunker::{Chunker, ChunkerConfig, TextChunk};
pub use ingest::{
    load_dataset_records, load_documents, load_pdf_pages, BuildReport, DatasetFields, Document,
    IndexBuilder, IngestError,
};
pub use sqlite::{IndexWriter, NewPassage, SqliteVectorIndex};
pub use store::{Passage, VectorIndex};
pub use vector_math::cosine_similarity;
