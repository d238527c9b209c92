use std::fmt;

use snafu::Snafu;

/// Name of a target index.
///
/// One logical index exists per language/country partition of a year/month
/// snapshot, named `{prefix}_{language}_{country}_{year}_{month}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexName(String);

#[derive(Debug, Snafu)]
#[snafu(display("invalid index name: {message}"))]
pub struct InvalidIndexName {
    pub message: String,
}

impl IndexName {
    /// Build an index name from its parts.
    ///
    /// Parts are lower-cased; each must be non-empty and contain only
    /// alphanumeric characters and dashes.
    pub fn new(
        prefix: &str,
        language: &str,
        country: &str,
        year: &str,
        month: &str,
    ) -> Result<Self, InvalidIndexName> {
        let parts = [prefix, language, country, year, month];

        let mut normalized = Vec::with_capacity(parts.len());
        for part in parts {
            let part = part.to_lowercase();
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(InvalidIndexName {
                    message: format!("invalid name part {part:?}"),
                });
            }
            normalized.push(part);
        }

        Ok(Self(normalized.join("_")))
    }

    /// Validate a full index name.
    pub fn parse(name: &str) -> Result<Self, InvalidIndexName> {
        let valid = !name.is_empty()
            && !name.starts_with('_')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !valid {
            return Err(InvalidIndexName {
                message: format!("invalid index name {name:?}"),
            });
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
