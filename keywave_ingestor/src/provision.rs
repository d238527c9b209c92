//! Idempotent provisioning of target indices.

use std::collections::HashSet;
use std::sync::Arc;

use keywave_search::{CreateOutcome, IndexName, IndexSchema, SearchIndex};
use snafu::ResultExt;
use tracing::{debug, info};

use crate::error::{Result, SearchIndexSnafu};

/// Ensures target indices exist before any chunk is written to them.
///
/// Creation is create-if-absent and memoized per run; an existing index is
/// never recreated or migrated.
pub struct IndexProvisioner {
    index: Arc<dyn SearchIndex>,
    schema: IndexSchema,
    provisioned: HashSet<IndexName>,
}

impl IndexProvisioner {
    pub fn new(index: Arc<dyn SearchIndex>, schema: IndexSchema) -> Self {
        Self {
            index,
            schema,
            provisioned: HashSet::new(),
        }
    }

    pub async fn ensure_index(&mut self, name: &IndexName) -> Result<()> {
        if self.provisioned.contains(name) {
            return Ok(());
        }

        let outcome = self
            .index
            .create_index(name, &self.schema)
            .await
            .context(SearchIndexSnafu {
                operation: "create_index",
            })?;

        match outcome {
            CreateOutcome::Created => info!(index = %name, "created index"),
            CreateOutcome::AlreadyExists => debug!(index = %name, "index already exists"),
        }

        self.provisioned.insert(name.clone());
        Ok(())
    }
}
