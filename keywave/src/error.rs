use keywave_ingestor::{IngestorError, InvalidChunkSizes};
use keywave_object_store::InvalidContainerName;
use keywave_search::{InvalidIndexName, SearchIndexError};
use snafu::Snafu;

/// CLI error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CliError {
    #[snafu(display("Invalid {name} argument: {message}"))]
    InvalidArgument { name: &'static str, message: String },
    #[snafu(display("Invalid container name"))]
    Container { source: InvalidContainerName },
    #[snafu(display("Invalid index name"))]
    Index { source: InvalidIndexName },
    #[snafu(display("Invalid chunk sizes"))]
    Chunks { source: InvalidChunkSizes },
    #[snafu(display("Object store error"))]
    ObjectStore { source: object_store::Error },
    #[snafu(display("Search index error"))]
    SearchIndex { source: SearchIndexError },
    #[snafu(display("Ingestion failed"))]
    Ingestion { source: IngestorError },
    #[snafu(display("IO error"))]
    Io { source: std::io::Error },
    #[snafu(display("CSV error"))]
    Csv { source: csv::Error },
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
