use serde::Serialize;
use serde_json::Value;

/// A keyword-metric document as persisted in the search index.
///
/// Numeric fields that could not be coerced from the source data are stored
/// as absent, never as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordDocument {
    /// Stable document identity, derived from the source coordinates.
    ///
    /// Not part of the indexed body; it addresses the document so retried
    /// bulk writes overwrite instead of duplicating.
    #[serde(skip_serializing)]
    pub id: String,
    pub keyword: String,
    pub volume: Option<i64>,
    pub cpc: Option<f64>,
    pub competition: Option<f64>,
    pub spell_type: Option<String>,
    pub history: Option<Value>,
    pub categories: Option<Value>,
}
