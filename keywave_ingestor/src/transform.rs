//! Fetching and transforming source objects into index documents.

use std::io::{BufRead, BufReader};
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use keywave_search::KeywordDocument;
use object_store::ObjectStore;
use serde::Deserialize;
use serde_json::Value;
use snafu::ResultExt;

use crate::{
    error::{DecompressSnafu, FetchSnafu, RecordParseSnafu, Result},
    types::AcceptedKey,
};

/// One line of a source object.
///
/// Metric fields arrive with unreliable types, so they are parsed as raw
/// values and coerced afterwards: a wrong type becomes an absent metric
/// instead of a failed record. A line that is not a JSON object with a
/// string keyword is a parse failure, which is fatal for the object.
#[derive(Debug, Deserialize)]
struct RawRecord {
    keyword: String,
    #[serde(default)]
    spell_type: Value,
    #[serde(default)]
    keyword_info: KeywordInfo,
}

/// The nested metrics sub-object, flattened into the document.
#[derive(Debug, Default, Deserialize)]
struct KeywordInfo {
    #[serde(default)]
    cpc: Value,
    #[serde(default)]
    competition: Value,
    #[serde(default)]
    search_volume: Value,
    #[serde(default)]
    history: Value,
    #[serde(default)]
    categories: Value,
}

/// Fetches source objects and projects them into index documents.
pub struct RecordTransformer {
    store: Arc<dyn ObjectStore>,
}

impl RecordTransformer {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Fetch, decompress and transform one accepted object.
    ///
    /// Produces one document per input line, preserving input order. An
    /// undecodable body or unparsable line is fatal for the object.
    pub async fn fetch_documents(&self, key: &AcceptedKey) -> Result<Vec<KeywordDocument>> {
        let body = self
            .store
            .get(&key.location)
            .await
            .context(FetchSnafu {
                key: key.location.as_ref(),
            })?
            .bytes()
            .await
            .context(FetchSnafu {
                key: key.location.as_ref(),
            })?;

        decode_documents(key, body.as_ref())
    }
}

/// Decompress a gzip body and parse one record per line.
pub fn decode_documents(key: &AcceptedKey, body: &[u8]) -> Result<Vec<KeywordDocument>> {
    let reader = BufReader::new(MultiGzDecoder::new(body));
    let mut documents = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.context(DecompressSnafu {
            key: key.location.as_ref(),
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let record: RawRecord = serde_json::from_str(&line).context(RecordParseSnafu {
            key: key.location.as_ref(),
            line: line_number,
        })?;

        documents.push(into_document(record, key.ordinal, line_number));
    }

    Ok(documents)
}

fn into_document(record: RawRecord, ordinal: u64, line_number: usize) -> KeywordDocument {
    let info = record.keyword_info;

    KeywordDocument {
        id: format!("{ordinal}-{line_number}"),
        keyword: record.keyword,
        volume: coerce_integer(&info.search_volume),
        cpc: coerce_metric(&info.cpc).map(round_metric),
        competition: coerce_metric(&info.competition).map(round_metric),
        spell_type: record.spell_type.as_str().map(str::to_string),
        history: opaque(info.history),
        categories: opaque(info.categories),
    }
}

/// Coerce a raw metric value into a finite float; anything else is absent.
fn coerce_metric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Round to 4 decimal digits, half away from zero.
fn round_metric(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn opaque(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::{Compression, write::GzEncoder};
    use object_store::path::Path;
    use serde_json::json;

    fn accepted_key(ordinal: u64) -> AcceptedKey {
        AcceptedKey {
            location: Path::from(format!("2022/12/us/en/{ordinal}.json.gz")),
            ordinal,
            country: "us".to_string(),
            language: "en".to_string(),
        }
    }

    fn gzip_lines(lines: &[Value]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        for line in lines {
            encoder
                .write_all(line.to_string().as_bytes())
                .expect("write line");
            encoder.write_all(b"\n").expect("write newline");
        }
        encoder.finish().expect("finish gzip")
    }

    #[test]
    fn test_flattens_metrics_and_preserves_order() {
        let body = gzip_lines(&[
            json!({
                "keyword": "walmart hours",
                "spell_type": null,
                "keyword_info": {
                    "cpc": 1.23456,
                    "competition": 0.5,
                    "search_volume": 1000,
                    "history": {"2022-11": 900},
                    "categories": [10, 20],
                },
            }),
            json!({
                "keyword": "walmart near me",
                "keyword_info": {"search_volume": 2000},
            }),
        ]);

        let documents = decode_documents(&accepted_key(12), &body).expect("decode");

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].id, "12-1");
        assert_eq!(documents[0].keyword, "walmart hours");
        assert_eq!(documents[0].volume, Some(1000));
        assert_eq!(documents[0].cpc, Some(1.2346));
        assert_eq!(documents[0].competition, Some(0.5));
        assert_eq!(documents[0].history, Some(json!({"2022-11": 900})));
        assert_eq!(documents[0].categories, Some(json!([10, 20])));
        assert_eq!(documents[1].id, "12-2");
        assert_eq!(documents[1].volume, Some(2000));
        assert_eq!(documents[1].cpc, None);
    }

    #[test]
    fn test_non_numeric_metrics_become_absent() {
        let body = gzip_lines(&[json!({
            "keyword": "moneycard",
            "keyword_info": {
                "cpc": "N/A",
                "competition": 0.12345,
                "search_volume": null,
            },
        })]);

        let documents = decode_documents(&accepted_key(1), &body).expect("decode");

        assert_eq!(documents[0].cpc, None);
        assert_eq!(documents[0].competition, Some(0.1235));
        assert_eq!(documents[0].volume, None);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let body = gzip_lines(&[json!({
            "keyword": "moneycard",
            "keyword_info": {"cpc": "1.5", "search_volume": "300"},
        })]);

        let documents = decode_documents(&accepted_key(1), &body).expect("decode");

        assert_eq!(documents[0].cpc, Some(1.5));
        assert_eq!(documents[0].volume, Some(300));
    }

    #[test]
    fn test_wrong_typed_spell_type_becomes_absent() {
        let body = gzip_lines(&[
            json!({"keyword": "a", "spell_type": "did_you_mean", "keyword_info": {}}),
            json!({"keyword": "b", "spell_type": 3, "keyword_info": {}}),
        ]);

        let documents = decode_documents(&accepted_key(1), &body).expect("decode");

        assert_eq!(documents[0].spell_type.as_deref(), Some("did_you_mean"));
        assert_eq!(documents[1].spell_type, None);
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(round_metric(0.12345), 0.1235);
        assert_eq!(round_metric(0.00005), 0.0001);
        assert_eq!(round_metric(-0.12345), -0.1235);
        assert_eq!(round_metric(1.0), 1.0);
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(b"{\"keyword\": \"a\", \"keyword_info\": {}}\n\n")
            .expect("write");
        let body = encoder.finish().expect("finish");

        let documents = decode_documents(&accepted_key(1), &body).expect("decode");
        assert_eq!(documents.len(), 1);
    }

    #[test]
    fn test_undecodable_body_is_fatal() {
        let result = decode_documents(&accepted_key(1), b"not gzip at all");
        assert!(matches!(
            result,
            Err(crate::IngestorError::Decompress { .. })
        ));
    }

    #[test]
    fn test_unparsable_line_is_fatal() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{\"keyword\": \"ok\", \"keyword_info\": {}}\nnot json\n").expect("write");
        let body = encoder.finish().expect("finish");

        let result = decode_documents(&accepted_key(1), &body);
        assert!(matches!(
            result,
            Err(crate::IngestorError::RecordParse { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_keyword_is_fatal() {
        let body = gzip_lines(&[json!({"keyword_info": {}})]);

        let result = decode_documents(&accepted_key(1), &body);
        assert!(matches!(
            result,
            Err(crate::IngestorError::RecordParse { line: 1, .. })
        ));
    }
}
