use serde_json::{Value, json};

/// Fixed field mapping and settings for keyword indices.
///
/// Dynamic mapping is off: only the fields below are indexed. The index is
/// sorted by volume descending so top-volume queries terminate early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self {
            number_of_shards: 10,
            number_of_replicas: 1,
        }
    }
}

impl IndexSchema {
    /// Render the create-index request body.
    pub fn to_body(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas,
                "index": {
                    "sort.field": "volume",
                    "sort.order": "desc",
                },
            },
            "mappings": {
                "dynamic": false,
                "properties": {
                    "keyword": { "type": "text" },
                    "volume": { "type": "long" },
                    "cpc": { "type": "float" },
                    "competition": { "type": "float" },
                    "spell_type": { "type": "keyword" },
                    "history": { "type": "object" },
                    "categories": { "type": "object" },
                },
            },
        })
    }
}
