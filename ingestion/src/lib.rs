//! # Vigil Ingestion
//!
//! Turns raw threat-intelligence documents into indexable chunks:
//!
//! - **Chunker**: overlapping word-window chunking with deterministic ids
//! - **Parser**: raw JSON → typed domain models
//! - **Loader**: bulk-load JSON documents from a data directory
//! - **Synthetic**: seeded generation of a realistic development corpus

pub mod chunker;
pub mod error;
pub mod loader;
pub mod parser;
pub mod synthetic;

pub use chunker::TextChunker;
pub use error::{IngestError, Result};
pub use loader::DataLoader;
pub use parser::DocumentParser;
pub use synthetic::SyntheticCorpus;
