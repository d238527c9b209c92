use keywave_search::SearchIndexError;
use snafu::Snafu;

/// Ingestion pipeline error types.
///
/// Only fatal conditions appear here. Skip-worthy conditions (malformed
/// keys, out-of-range ordinals, non-numeric metric fields) are logged and
/// skipped; retryable bulk-write failures are absorbed by the bulk writer.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestorError {
    /// Listing a page of object keys failed.
    #[snafu(display("failed to list objects under {prefix}"))]
    List {
        prefix: String,
        source: object_store::Error,
    },
    /// Fetching one object body failed.
    #[snafu(display("failed to fetch object {key}"))]
    Fetch {
        key: String,
        source: object_store::Error,
    },
    /// The object body is not a valid gzip stream.
    #[snafu(display("failed to decompress object {key}"))]
    Decompress {
        key: String,
        source: std::io::Error,
    },
    /// One line of the object body is not a valid record.
    #[snafu(display("failed to parse record at {key}:{line}"))]
    RecordParse {
        key: String,
        line: usize,
        source: serde_json::Error,
    },
    /// A search index operation outside the retried bulk write failed.
    #[snafu(display("search index operation {operation} failed"))]
    SearchIndex {
        operation: &'static str,
        source: SearchIndexError,
    },
    /// A chunk exhausted its write attempts and no poison channel is configured.
    #[snafu(display(
        "bulk write to {index} gave up after {attempts} attempts ({documents} documents)"
    ))]
    RetriesExhausted {
        index: String,
        attempts: u32,
        documents: usize,
        source: SearchIndexError,
    },
}

pub type Result<T, E = IngestorError> = std::result::Result<T, E>;
