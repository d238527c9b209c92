//! Structural filtering of object keys.

use object_store::path::Path;
use tracing::debug;

use crate::types::{AcceptedKey, OrdinalRange};

/// Segment offsets within a source key:
/// `{year}/{month}/{country}/{language}/{ordinal}.{ext}`.
const COUNTRY_SEGMENT: usize = 2;
const LANGUAGE_SEGMENT: usize = 3;
const MIN_SEGMENTS: usize = 5;

/// Decides which keys under the prefix belong to this unit of work.
///
/// Total over every possible key: malformed keys and out-of-range ordinals
/// are excluded silently, never surfaced as errors.
#[derive(Debug, Clone)]
pub struct KeyFilter {
    range: OrdinalRange,
}

impl KeyFilter {
    pub fn new(range: OrdinalRange) -> Self {
        Self { range }
    }

    /// Accept the key if its ordinal is inside the half-open range.
    pub fn accept(&self, location: &Path) -> Option<AcceptedKey> {
        let Some(key) = derive_key(location) else {
            debug!(key = %location, "skipping malformed key");
            return None;
        };

        if !self.range.contains(key.ordinal) {
            debug!(key = %location, ordinal = key.ordinal, "skipping key outside ordinal range");
            return None;
        }

        Some(key)
    }
}

/// Derive (ordinal, country, language) from the key's path segments.
fn derive_key(location: &Path) -> Option<AcceptedKey> {
    let segments: Vec<&str> = location.as_ref().split('/').collect();

    if segments.len() < MIN_SEGMENTS {
        return None;
    }

    let country = segments[COUNTRY_SEGMENT];
    let language = segments[LANGUAGE_SEGMENT];
    if country.is_empty() || language.is_empty() {
        return None;
    }

    let file_name = segments.last()?;
    let ordinal = file_name.split('.').next()?.parse::<u64>().ok()?;

    Some(AcceptedKey {
        location: location.clone(),
        ordinal,
        country: country.to_lowercase(),
        language: language.to_lowercase(),
    })
}
