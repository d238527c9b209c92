//! Paginated listing of object keys under a prefix.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::{StreamExt, stream::BoxStream};
use object_store::{ObjectMeta, ObjectStore, path::Path};

/// Lazily pages through every object under a prefix.
///
/// Each page holds at most `page_size` keys and is released before the next
/// one is requested; the full listing is never held in memory at once.
pub struct ObjectCursor {
    stream: BoxStream<'static, Result<ObjectMeta, object_store::Error>>,
    page_size: usize,
    exhausted: bool,
}

impl ObjectCursor {
    /// Start listing under `prefix`, optionally resuming after a known key.
    pub fn new(
        store: &Arc<dyn ObjectStore>,
        prefix: &Path,
        page_size: NonZeroUsize,
        resume_after: Option<&Path>,
    ) -> Self {
        let stream = match resume_after {
            Some(offset) => store.list_with_offset(Some(prefix), offset),
            None => store.list(Some(prefix)),
        };

        Self {
            stream,
            page_size: page_size.get(),
            exhausted: false,
        }
    }

    /// The next page of keys, or `None` once the prefix is exhausted.
    ///
    /// A listing failure propagates to the caller and ends the cursor; the
    /// caller decides whether to abandon the prefix or restart from the last
    /// key it fully processed.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ObjectMeta>>, object_store::Error> {
        if self.exhausted {
            return Ok(None);
        }

        let mut page = Vec::with_capacity(self.page_size);

        while page.len() < self.page_size {
            match self.stream.next().await {
                Some(Ok(meta)) => page.push(meta),
                Some(Err(error)) => {
                    self.exhausted = true;
                    return Err(error);
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        if page.is_empty() {
            return Ok(None);
        }

        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::{PutPayload, memory::InMemory};

    async fn seeded_store(keys: &[&str]) -> Arc<dyn ObjectStore> {
        let store = InMemory::new();
        for key in keys {
            store
                .put(&Path::from(*key), PutPayload::from_static(b"data"))
                .await
                .expect("seed object");
        }
        Arc::new(store)
    }

    fn page_size(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).expect("page size")
    }

    async fn collect_keys(cursor: &mut ObjectCursor) -> Vec<String> {
        let mut keys = Vec::new();
        while let Some(page) = cursor.next_page().await.expect("next page") {
            assert!(!page.is_empty());
            keys.extend(page.iter().map(|meta| meta.location.to_string()));
        }
        keys
    }

    #[tokio::test]
    async fn test_yields_every_key_exactly_once_for_any_page_size() {
        let keys = [
            "2022/12/us/en/1.json.gz",
            "2022/12/us/en/2.json.gz",
            "2022/12/us/en/3.json.gz",
            "2022/12/us/en/4.json.gz",
            "2022/12/us/en/5.json.gz",
        ];
        let store = seeded_store(&keys).await;
        let prefix = Path::from("2022/12");

        for size in [1, 2, 3, 5, 300] {
            let mut cursor = ObjectCursor::new(&store, &prefix, page_size(size), None);
            let listed = collect_keys(&mut cursor).await;
            assert_eq!(listed, keys, "page size {size}");
        }
    }

    #[tokio::test]
    async fn test_page_length_is_bounded() {
        let keys = [
            "2022/12/us/en/1.json.gz",
            "2022/12/us/en/2.json.gz",
            "2022/12/us/en/3.json.gz",
        ];
        let store = seeded_store(&keys).await;
        let prefix = Path::from("2022/12");

        let mut cursor = ObjectCursor::new(&store, &prefix, page_size(2), None);
        let first = cursor.next_page().await.unwrap().expect("first page");
        assert_eq!(first.len(), 2);
        let second = cursor.next_page().await.unwrap().expect("second page");
        assert_eq!(second.len(), 1);
        assert!(cursor.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_prefix_yields_no_pages() {
        let store = seeded_store(&["other/1.json.gz"]).await;
        let prefix = Path::from("2022/12");

        let mut cursor = ObjectCursor::new(&store, &prefix, page_size(10), None);
        assert!(cursor.next_page().await.unwrap().is_none());
        // Restartable from none: asking again keeps answering `None`.
        assert!(cursor.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_after_skips_earlier_keys() {
        let keys = [
            "2022/12/us/en/1.json.gz",
            "2022/12/us/en/2.json.gz",
            "2022/12/us/en/3.json.gz",
        ];
        let store = seeded_store(&keys).await;
        let prefix = Path::from("2022/12");
        let offset = Path::from("2022/12/us/en/2.json.gz");

        let mut cursor = ObjectCursor::new(&store, &prefix, page_size(10), Some(&offset));
        let listed = collect_keys(&mut cursor).await;
        assert_eq!(listed, vec!["2022/12/us/en/3.json.gz"]);
    }
}
