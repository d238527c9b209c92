//! In-memory implementation of the search index trait.
//!
//! This implementation stores all documents in memory and is suitable for
//! testing and development. Matching approximates the analyzed text matching
//! of the real service: broad mode requires every term of the query to appear
//! as a word of the keyword, phrase mode requires the terms to appear
//! contiguously and in order.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use crate::{
    CreateOutcome, IndexName, IndexSchema, KeywordDocument, RankedKeyword, SearchIndex,
    SearchMode, SearchRequest,
    error::{InternalSnafu, Result},
};

#[derive(Debug, Default)]
struct SearchIndexStore {
    /// Map of index name to its stored documents, keyed by document identity.
    indices: HashMap<String, BTreeMap<String, KeywordDocument>>,
    /// Bulk-write attempts observed, including failed ones.
    bulk_attempts: u64,
    /// Remaining bulk writes that fail on purpose.
    failures_to_inject: u32,
}

/// In-memory implementation of the search index.
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    store: RwLock<SearchIndexStore>,
}

impl InMemorySearchIndex {
    /// Create a new in-memory search index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` bulk writes fail with an internal error.
    pub async fn inject_write_failures(&self, count: u32) {
        let mut store = self.store.write().await;
        store.failures_to_inject = count;
    }

    /// Total bulk-write attempts observed so far, including failed ones.
    pub async fn bulk_attempts(&self) -> u64 {
        let store = self.store.read().await;
        store.bulk_attempts
    }

    /// Names of the indices created so far, sorted.
    pub async fn index_names(&self) -> Vec<String> {
        let store = self.store.read().await;
        let mut names: Vec<_> = store.indices.keys().cloned().collect();
        names.sort();
        names
    }

    /// All documents stored in the index, in identity order.
    pub async fn documents(&self, index: &IndexName) -> Vec<KeywordDocument> {
        let store = self.store.read().await;
        store
            .indices
            .get(index.as_str())
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn create_index(
        &self,
        name: &IndexName,
        _schema: &IndexSchema,
    ) -> Result<CreateOutcome> {
        let mut store = self.store.write().await;

        if store.indices.contains_key(name.as_str()) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        store.indices.insert(name.to_string(), BTreeMap::new());
        Ok(CreateOutcome::Created)
    }

    async fn bulk_write(&self, index: &IndexName, documents: &[KeywordDocument]) -> Result<()> {
        let mut store = self.store.write().await;
        store.bulk_attempts += 1;

        if store.failures_to_inject > 0 {
            store.failures_to_inject -= 1;
            return InternalSnafu {
                message: "injected bulk write failure".to_string(),
            }
            .fail();
        }

        let stored = store.indices.entry(index.to_string()).or_default();
        for document in documents {
            stored.insert(document.id.clone(), document.clone());
        }

        Ok(())
    }

    async fn search(
        &self,
        index: &IndexName,
        request: SearchRequest,
    ) -> Result<Vec<RankedKeyword>> {
        let store = self.store.read().await;

        let Some(documents) = store.indices.get(index.as_str()) else {
            return Ok(Vec::new());
        };

        let terms: Vec<String> = request
            .term
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut matches: Vec<&KeywordDocument> = documents
            .values()
            .filter(|document| document.spell_type.is_none())
            .filter(|document| {
                let words: Vec<String> = document
                    .keyword
                    .to_lowercase()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();

                match request.mode {
                    SearchMode::Broad => terms.iter().all(|term| words.contains(term)),
                    SearchMode::Phrase => {
                        !terms.is_empty() && words.windows(terms.len()).any(|w| w == terms)
                    }
                }
            })
            .collect();

        matches.sort_by(|a, b| match (a.volume, b.volume) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        matches.truncate(request.limit);

        Ok(matches
            .into_iter()
            .map(|document| RankedKeyword {
                keyword: document.keyword.clone(),
                volume: document.volume,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, keyword: &str, volume: Option<i64>) -> KeywordDocument {
        KeywordDocument {
            id: id.to_string(),
            keyword: keyword.to_string(),
            volume,
            cpc: None,
            competition: None,
            spell_type: None,
            history: None,
            categories: None,
        }
    }

    fn index_name() -> IndexName {
        IndexName::new("keywords", "en", "us", "2022", "12").expect("index name")
    }

    #[tokio::test]
    async fn test_create_index_is_idempotent() {
        let index = InMemorySearchIndex::new();
        let name = index_name();

        let first = index
            .create_index(&name, &IndexSchema::default())
            .await
            .unwrap();
        let second = index
            .create_index(&name, &IndexSchema::default())
            .await
            .unwrap();

        assert_eq!(first, CreateOutcome::Created);
        assert_eq!(second, CreateOutcome::AlreadyExists);
        assert_eq!(index.index_names().await, vec![name.to_string()]);
    }

    #[tokio::test]
    async fn test_bulk_write_overwrites_by_identity() {
        let index = InMemorySearchIndex::new();
        let name = index_name();

        let documents = vec![document("1-1", "first", Some(10))];
        index.bulk_write(&name, &documents).await.unwrap();
        index.bulk_write(&name, &documents).await.unwrap();

        assert_eq!(index.documents(&name).await.len(), 1);
        assert_eq!(index.bulk_attempts().await, 2);
    }

    #[tokio::test]
    async fn test_injected_failures_then_success() {
        let index = InMemorySearchIndex::new();
        let name = index_name();
        index.inject_write_failures(2).await;

        let documents = vec![document("1-1", "first", Some(10))];
        assert!(index.bulk_write(&name, &documents).await.is_err());
        assert!(index.bulk_write(&name, &documents).await.is_err());
        index.bulk_write(&name, &documents).await.unwrap();

        assert_eq!(index.documents(&name).await.len(), 1);
        assert_eq!(index.bulk_attempts().await, 3);
    }

    #[tokio::test]
    async fn test_search_broad_and_phrase() {
        let index = InMemorySearchIndex::new();
        let name = index_name();

        index
            .bulk_write(
                &name,
                &[
                    document("1-1", "sams club hours", Some(500)),
                    document("1-2", "club sams", Some(900)),
                    document("1-3", "unrelated keyword", Some(100)),
                ],
            )
            .await
            .unwrap();

        let broad = index
            .search(&name, SearchRequest::broad("sams club"))
            .await
            .unwrap();
        assert_eq!(broad.len(), 2);
        assert_eq!(broad[0].keyword, "club sams");
        assert_eq!(broad[0].volume, Some(900));

        let phrase = index
            .search(&name, SearchRequest::phrase("sams club"))
            .await
            .unwrap();
        assert_eq!(phrase.len(), 1);
        assert_eq!(phrase[0].keyword, "sams club hours");
    }

    #[tokio::test]
    async fn test_search_excludes_spelling_variants() {
        let index = InMemorySearchIndex::new();
        let name = index_name();

        let mut variant = document("1-1", "walmart", Some(1000));
        variant.spell_type = Some("corrected".to_string());

        index
            .bulk_write(&name, &[variant, document("1-2", "walmart", Some(700))])
            .await
            .unwrap();

        let results = index
            .search(&name, SearchRequest::broad("walmart"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].volume, Some(700));
    }
}
