use reqwest::StatusCode;
use snafu::Snafu;

/// Search index error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SearchIndexError {
    /// Transport-level failure talking to the search service.
    #[snafu(display("search index request failed during {operation}"))]
    Request {
        operation: &'static str,
        source: reqwest::Error,
    },
    /// The search service answered with a non-success status.
    #[snafu(display("search index returned {status} during {operation}: {message}"))]
    Response {
        operation: &'static str,
        status: StatusCode,
        message: String,
    },
    /// The bulk request succeeded but some documents were rejected.
    #[snafu(display("bulk write to {index} rejected {rejected} of {total} documents"))]
    BulkRejected {
        index: String,
        rejected: usize,
        total: usize,
    },
    /// Internal error.
    #[snafu(display("internal search index error: {message}"))]
    Internal { message: String },
}

pub type Result<T, E = SearchIndexError> = std::result::Result<T, E>;
