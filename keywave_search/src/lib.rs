//! Client layer for the full-text search index.
//!
//! The `SearchIndex` trait is the seam between the ingestion pipeline and the
//! search service: an Elasticsearch-compatible HTTP implementation for
//! production and an in-memory implementation for tests.

pub mod document;
pub mod elastic;
pub mod error;
pub mod memory;
pub mod name;
pub mod schema;

use serde::Serialize;

pub use document::KeywordDocument;
pub use elastic::{ElasticsearchConfig, ElasticsearchIndex};
pub use error::{Result, SearchIndexError};
pub use memory::InMemorySearchIndex;
pub use name::{IndexName, InvalidIndexName};
pub use schema::IndexSchema;

/// Outcome of an idempotent create-index request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The index did not exist and was created.
    Created,
    /// The index already existed; nothing was changed.
    AlreadyExists,
}

/// How a search term matches the keyword field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Every term must match, in any order.
    Broad,
    /// The terms must match as an exact phrase.
    Phrase,
}

/// A ranked keyword search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub term: String,
    pub mode: SearchMode,
    /// Maximum number of hits returned.
    pub limit: usize,
}

impl SearchRequest {
    pub const DEFAULT_LIMIT: usize = 1000;

    pub fn broad(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            mode: SearchMode::Broad,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn phrase(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            mode: SearchMode::Phrase,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One ranked search hit: a keyword and its search volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedKeyword {
    pub keyword: String,
    pub volume: Option<i64>,
}

/// Write and query interface of the target search index.
#[async_trait::async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the index with the given schema if it does not exist yet.
    ///
    /// Never alters the settings or mappings of a pre-existing index.
    async fn create_index(&self, name: &IndexName, schema: &IndexSchema)
        -> Result<CreateOutcome>;

    /// Issue a single bulk-write request indexing every document.
    ///
    /// Any per-document rejection fails the whole request.
    async fn bulk_write(&self, index: &IndexName, documents: &[KeywordDocument]) -> Result<()>;

    /// Return ranked (keyword, volume) pairs matching the request,
    /// ordered by volume descending, excluding spelling variants.
    async fn search(&self, index: &IndexName, request: SearchRequest)
        -> Result<Vec<RankedKeyword>>;
}
