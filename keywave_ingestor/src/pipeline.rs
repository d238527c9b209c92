//! The end-to-end ingestion pipeline.

use std::sync::Arc;

use futures::{StreamExt, stream::FuturesUnordered};
use keywave_search::{IndexName, IndexSchema, KeywordDocument, SearchIndex};
use object_store::ObjectStore;
use snafu::ResultExt;
use tracing::{debug, error, info};

use crate::{
    cursor::ObjectCursor,
    error::{ListSnafu, Result},
    filter::KeyFilter,
    provision::IndexProvisioner,
    transform::RecordTransformer,
    types::{IngestionOptions, IngestionSummary},
    writer::{BulkWriter, ChunkOutcome, PoisonedChunkSender},
};

/// Drives one (container, prefix, ordinal range) unit of work end to end.
///
/// Pages are processed in listing order and keys within a page in page
/// order. Within one object, the fine chunks of a coarse group are written
/// concurrently and the whole group drains before the next group starts, so
/// at most one coarse group of documents is in flight at any time. Once
/// started, a unit of work runs to completion or fatal failure; no
/// cancellation is exposed.
pub struct IngestionPipeline {
    store: Arc<dyn ObjectStore>,
    search: Arc<dyn SearchIndex>,
    options: IngestionOptions,
    poison: Option<PoisonedChunkSender>,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        search: Arc<dyn SearchIndex>,
        options: IngestionOptions,
    ) -> Self {
        Self {
            store,
            search,
            options,
            poison: None,
        }
    }

    /// Report chunks abandoned by the retry policy on this channel instead
    /// of aborting the run when the policy is exhausted.
    pub fn with_poison_channel(mut self, sender: PoisonedChunkSender) -> Self {
        self.poison = Some(sender);
        self
    }

    /// Run the unit of work to completion.
    ///
    /// Fatal errors (listing, fetch, decompress, parse, provisioning) abort
    /// the run; the last fully processed key is logged so the caller can
    /// resume from it.
    pub async fn run(self) -> Result<IngestionSummary> {
        let prefix = self.options.prefix();
        info!(
            prefix = %prefix,
            lower = self.options.range.lower,
            upper = self.options.range.upper,
            "starting ingestion"
        );

        let mut summary = IngestionSummary::default();

        match self.run_to_completion(&mut summary).await {
            Ok(()) => {
                info!(
                    objects = summary.objects_ingested,
                    skipped = summary.objects_skipped,
                    documents = summary.documents_written,
                    "ingestion complete"
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    error = %err,
                    last_key = summary.last_key.as_deref().unwrap_or("<none>"),
                    "ingestion aborted"
                );
                Err(err)
            }
        }
    }

    async fn run_to_completion(&self, summary: &mut IngestionSummary) -> Result<()> {
        let prefix = self.options.prefix();
        let filter = KeyFilter::new(self.options.range);
        let transformer = RecordTransformer::new(self.store.clone());
        let mut provisioner = IndexProvisioner::new(self.search.clone(), IndexSchema::default());

        let mut writer = BulkWriter::new(self.search.clone(), self.options.retry);
        if let Some(sender) = &self.poison {
            writer = writer.with_poison_channel(sender.clone());
        }

        let mut cursor = ObjectCursor::new(
            &self.store,
            &prefix,
            self.options.page_size,
            self.options.resume_after.as_ref(),
        );

        while let Some(page) = cursor.next_page().await.context(ListSnafu {
            prefix: prefix.as_ref(),
        })? {
            for meta in &page {
                summary.objects_listed += 1;

                let Some(key) = filter.accept(&meta.location) else {
                    summary.objects_skipped += 1;
                    continue;
                };

                let index_name = match IndexName::new(
                    &self.options.index_prefix,
                    &key.language,
                    &key.country,
                    &self.options.year,
                    &self.options.month,
                ) {
                    Ok(name) => name,
                    Err(err) => {
                        // Unusable name parts get the same skip policy as malformed keys.
                        debug!(key = %meta.location, error = %err, "skipping key with unusable name parts");
                        summary.objects_skipped += 1;
                        continue;
                    }
                };

                provisioner.ensure_index(&index_name).await?;

                let documents = transformer.fetch_documents(&key).await?;
                info!(
                    key = %meta.location,
                    index = %index_name,
                    documents = documents.len(),
                    "ingesting object"
                );

                self.write_documents(&writer, &index_name, &documents, summary)
                    .await?;

                summary.objects_ingested += 1;
            }

            if let Some(last) = page.last() {
                summary.last_key = Some(last.location.to_string());
            }
        }

        Ok(())
    }

    /// Write all documents of one object, one coarse group at a time.
    async fn write_documents(
        &self,
        writer: &BulkWriter,
        index: &IndexName,
        documents: &[KeywordDocument],
        summary: &mut IngestionSummary,
    ) -> Result<()> {
        for group in self.options.chunks.coarse_groups(documents) {
            let mut writes = FuturesUnordered::new();

            for chunk in self.options.chunks.fine_chunks(group) {
                writes.push(async move {
                    writer
                        .write_chunk(index, chunk)
                        .await
                        .map(|outcome| (outcome, chunk.len()))
                });
            }

            // Every chunk of the group must drain before the next group starts.
            while let Some(written) = writes.next().await {
                let (outcome, chunk_len) = written?;
                match outcome {
                    ChunkOutcome::Written => {
                        summary.chunks_written += 1;
                        summary.documents_written += chunk_len as u64;
                    }
                    ChunkOutcome::Poisoned => summary.chunks_poisoned += 1,
                }
            }
        }

        Ok(())
    }
}
