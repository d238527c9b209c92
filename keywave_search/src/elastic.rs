//! Elasticsearch-compatible HTTP implementation of [`SearchIndex`].

use reqwest::{Method, StatusCode, header};
use serde::Deserialize;
use serde_json::json;
use snafu::ResultExt;

use crate::{
    CreateOutcome, IndexName, IndexSchema, KeywordDocument, RankedKeyword, SearchIndex,
    SearchMode, SearchRequest,
    error::{BulkRejectedSnafu, RequestSnafu, Result, SearchIndexError},
};

/// Connection configuration for the search service.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Maximum idle connections kept per host; bounds the connection pool.
    pub pool_max_idle_per_host: usize,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9200".to_string(),
            username: None,
            password: None,
            pool_max_idle_per_host: 32,
        }
    }
}

/// A client for an Elasticsearch-compatible search service over HTTP.
#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl ElasticsearchIndex {
    /// Create a new search index client.
    pub fn new(config: ElasticsearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .context(RequestSnafu {
                operation: "build_client",
            })?;

        let credentials = config
            .username
            .map(|username| (username, config.password.unwrap_or_default()));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let request = self.client.request(method, url);

        match &self.credentials {
            Some((username, password)) => request.basic_auth(username, Some(password)),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn create_index(
        &self,
        name: &IndexName,
        schema: &IndexSchema,
    ) -> Result<CreateOutcome> {
        let url = format!("{}/{}", self.base_url, name);

        let response = self
            .request(Method::PUT, url)
            .json(&schema.to_body())
            .send()
            .await
            .context(RequestSnafu {
                operation: "create_index",
            })?;

        if response.status().is_success() {
            return Ok(CreateOutcome::Created);
        }

        let status = response.status();
        let message = response.text().await.unwrap_or_default();

        if status == StatusCode::BAD_REQUEST
            && message.contains("resource_already_exists_exception")
        {
            return Ok(CreateOutcome::AlreadyExists);
        }

        Err(SearchIndexError::Response {
            operation: "create_index",
            status,
            message,
        })
    }

    async fn bulk_write(&self, index: &IndexName, documents: &[KeywordDocument]) -> Result<()> {
        let mut body = String::with_capacity(documents.len() * 256);

        for document in documents {
            let action = json!({ "index": { "_index": index.as_str(), "_id": document.id } });
            body.push_str(&action.to_string());
            body.push('\n');

            let source =
                serde_json::to_string(document).map_err(|e| SearchIndexError::Internal {
                    message: format!("failed to serialize document {}: {e}", document.id),
                })?;
            body.push_str(&source);
            body.push('\n');
        }

        let url = format!("{}/_bulk", self.base_url);

        let response = self
            .request(Method::POST, url)
            .header(header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .context(RequestSnafu {
                operation: "bulk_write",
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::Response {
                operation: "bulk_write",
                status,
                message,
            });
        }

        let response: BulkResponse = response.json().await.context(RequestSnafu {
            operation: "bulk_write",
        })?;

        if response.errors {
            let rejected = response.items.iter().filter(|item| item.failed()).count();
            return BulkRejectedSnafu {
                index: index.to_string(),
                rejected,
                total: documents.len(),
            }
            .fail();
        }

        Ok(())
    }

    async fn search(
        &self,
        index: &IndexName,
        request: SearchRequest,
    ) -> Result<Vec<RankedKeyword>> {
        let match_clause = match request.mode {
            SearchMode::Broad => json!({
                "match": { "keyword": { "query": request.term, "operator": "and" } }
            }),
            SearchMode::Phrase => json!({
                "match_phrase": { "keyword": request.term }
            }),
        };

        let body = json!({
            "size": request.limit,
            "sort": [{ "volume": "desc" }],
            "query": {
                "bool": {
                    "must": [match_clause],
                    "must_not": [{ "exists": { "field": "spell_type" } }],
                },
            },
            "fields": ["keyword", "volume"],
            "_source": false,
        });

        let url = format!("{}/{}/_search", self.base_url, index);

        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .context(RequestSnafu {
                operation: "search",
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::Response {
                operation: "search",
                status,
                message,
            });
        }

        let response: SearchResponse = response.json().await.context(RequestSnafu {
            operation: "search",
        })?;

        let results = response
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| {
                let keyword = hit.fields.keyword.into_iter().next()?;
                let volume = hit.fields.volume.into_iter().next();
                Some(RankedKeyword { keyword, volume })
            })
            .collect();

        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<BulkItem>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(rename = "index")]
    index: Option<BulkItemStatus>,
}

#[derive(Debug, Deserialize)]
struct BulkItemStatus {
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl BulkItem {
    fn failed(&self) -> bool {
        self.index.as_ref().is_some_and(|status| status.error.is_some())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    fields: HitFields,
}

#[derive(Debug, Default, Deserialize)]
struct HitFields {
    #[serde(default)]
    keyword: Vec<String>,
    #[serde(default)]
    volume: Vec<i64>,
}
