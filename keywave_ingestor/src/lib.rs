//! The keyword ingestion pipeline.
//!
//! Moves gzip-compressed, newline-delimited JSON archives of keyword metrics
//! from an object store into a full-text search index: list keys under a
//! prefix, filter them by file ordinal, transform each object into index
//! documents, and write the documents in concurrent bulk requests with
//! at-least-once delivery.

pub mod chunk;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod provision;
pub mod transform;
pub mod types;
pub mod writer;

pub use chunk::{ChunkSizes, InvalidChunkSizes};
pub use cursor::ObjectCursor;
pub use error::{IngestorError, Result};
pub use filter::KeyFilter;
pub use pipeline::IngestionPipeline;
pub use provision::IndexProvisioner;
pub use transform::RecordTransformer;
pub use types::{AcceptedKey, IngestionOptions, IngestionSummary, OrdinalRange};
pub use writer::{BulkWriter, ChunkOutcome, PoisonedChunk, PoisonedChunkSender, RetryPolicy};
