use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;

use clap::Parser;
use keywave_ingestor::{
    ChunkSizes, IngestionOptions, IngestionPipeline, IngestionSummary, OrdinalRange, RetryPolicy,
};
use keywave_search::SearchIndex;
use object_store::path::Path;
use snafu::ResultExt;
use tokio::sync::mpsc;

use crate::{
    error::{ChunksSnafu, CliError, IngestionSnafu, Result},
    remote::{SearchServiceArgs, StoreArgs},
};

/// Ingest keyword archives from the object store into the search index
#[derive(Parser)]
pub struct IngestArgs {
    /// Year segment of the source prefix.
    #[arg(long)]
    year: String,

    /// Month segment of the source prefix.
    #[arg(long)]
    month: String,

    /// Lower bound (inclusive) of the file ordinal range.
    #[arg(long, default_value = "0")]
    lower: u64,

    /// Upper bound (exclusive) of the file ordinal range.
    #[arg(long, default_value = "10000")]
    upper: u64,

    /// First segment of derived index names.
    #[arg(long, default_value = "keywords")]
    index_prefix: String,

    /// Keys fetched per listing page.
    #[arg(long, default_value = "300")]
    page_size: usize,

    /// Documents per coarse group; bounds concurrent in-flight writes.
    #[arg(long, default_value = "15000")]
    coarse_chunk: usize,

    /// Documents per bulk-write request.
    #[arg(long, default_value = "1000")]
    fine_chunk: usize,

    /// Write attempts per chunk before giving up; 0 retries forever.
    #[arg(long, default_value = "8")]
    max_write_attempts: u32,

    /// Abandon chunks that exhaust their write attempts instead of aborting.
    #[arg(long)]
    abandon_poisoned: bool,

    /// Resume listing after this key.
    #[arg(long)]
    resume_after: Option<String>,

    #[clap(flatten)]
    store: StoreArgs,

    #[clap(flatten)]
    search: SearchServiceArgs,
}

impl IngestArgs {
    pub async fn run(self) -> Result<()> {
        let store = self.store.object_store().await?;
        let search: Arc<dyn SearchIndex> = Arc::new(self.search.search_index()?);

        let page_size =
            NonZeroUsize::new(self.page_size).ok_or_else(|| CliError::InvalidArgument {
                name: "page-size",
                message: "must be positive".to_string(),
            })?;

        let retry = match self.max_write_attempts {
            0 => RetryPolicy::unbounded(),
            attempts => RetryPolicy {
                max_attempts: NonZeroU32::new(attempts),
                ..RetryPolicy::default()
            },
        };

        let mut options = IngestionOptions::new(
            self.year,
            self.month,
            OrdinalRange::new(self.lower, self.upper),
            self.index_prefix,
        );
        options.page_size = page_size;
        options.chunks =
            ChunkSizes::new(self.coarse_chunk, self.fine_chunk).context(ChunksSnafu {})?;
        options.retry = retry;
        options.resume_after = self.resume_after.map(Path::from);

        let pipeline = IngestionPipeline::new(store, search, options);

        let summary = if self.abandon_poisoned {
            let (tx, mut rx) = mpsc::unbounded_channel::<keywave_ingestor::PoisonedChunk>();

            let reporter = tokio::spawn(async move {
                while let Some(chunk) = rx.recv().await {
                    tracing::warn!(
                        index = %chunk.index,
                        documents = chunk.documents.len(),
                        attempts = chunk.attempts,
                        error = %chunk.error,
                        "chunk abandoned"
                    );
                }
            });

            let summary = pipeline
                .with_poison_channel(tx)
                .run()
                .await
                .context(IngestionSnafu {})?;

            // The pipeline dropped its sender, so the reporter drains and stops.
            let _ = reporter.await;
            summary
        } else {
            pipeline.run().await.context(IngestionSnafu {})?
        };

        print_summary(&summary);

        Ok(())
    }
}

fn print_summary(summary: &IngestionSummary) {
    println!("Objects listed: {}", summary.objects_listed);
    println!("Objects skipped: {}", summary.objects_skipped);
    println!("Objects ingested: {}", summary.objects_ingested);
    println!("Documents written: {}", summary.documents_written);
    println!("Chunks written: {}", summary.chunks_written);

    if summary.chunks_poisoned > 0 {
        println!("Chunks abandoned: {}", summary.chunks_poisoned);
    }
}
