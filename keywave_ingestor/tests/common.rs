use std::io::Write;
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::time::Duration;

use flate2::{Compression, write::GzEncoder};
use keywave_ingestor::{IngestionOptions, OrdinalRange, RetryPolicy};
use keywave_object_store::{ContainerName, ObjectStoreFactory, TemporaryFileSystemFactory};
use keywave_search::InMemorySearchIndex;
use object_store::{ObjectStore, PutPayload, path::Path};

/// A throwaway object store backed by a temporary directory.
///
/// The factory must stay alive for as long as the store is used.
pub async fn create_test_store() -> (TemporaryFileSystemFactory, Arc<dyn ObjectStore>) {
    let factory = TemporaryFileSystemFactory::new().expect("object store factory");
    let container = ContainerName::new("keyword-archives").expect("container name");
    let store = factory
        .create_object_store(&container)
        .await
        .expect("create object store");

    (factory, store)
}

pub fn create_search_index() -> Arc<InMemorySearchIndex> {
    Arc::new(InMemorySearchIndex::new())
}

/// Options over the 2022/12 prefix with a fast retry policy for tests.
pub fn test_options(lower: u64, upper: u64) -> IngestionOptions {
    let mut options =
        IngestionOptions::new("2022", "12", OrdinalRange::new(lower, upper), "keywords");
    options.retry = RetryPolicy {
        max_attempts: NonZeroU32::new(5),
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(4),
    };
    options
}

pub fn page_size(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size).expect("page size")
}

/// A well-formed source record.
pub fn record(keyword: &str, volume: i64) -> serde_json::Value {
    serde_json::json!({
        "keyword": keyword,
        "spell_type": null,
        "keyword_info": {
            "cpc": 1.25,
            "competition": 0.5,
            "search_volume": volume,
            "history": { "2022-11": volume },
            "categories": [10, 20],
        },
    })
}

pub fn gzip_lines(lines: &[serde_json::Value]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for line in lines {
        encoder
            .write_all(line.to_string().as_bytes())
            .expect("write line");
        encoder.write_all(b"\n").expect("write newline");
    }
    encoder.finish().expect("finish gzip")
}

/// Gzip an arbitrary text body, valid or not.
pub fn gzip_text(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .expect("write text");
    encoder.finish().expect("finish gzip")
}

pub async fn seed_object(store: &Arc<dyn ObjectStore>, key: &str, lines: &[serde_json::Value]) {
    store
        .put(&Path::from(key), PutPayload::from(gzip_lines(lines)))
        .await
        .expect("seed object");
}

pub async fn seed_raw_object(store: &Arc<dyn ObjectStore>, key: &str, body: Vec<u8>) {
    store
        .put(&Path::from(key), PutPayload::from(body))
        .await
        .expect("seed raw object");
}
