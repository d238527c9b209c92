//! Bulk writing of document chunks with retry.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use keywave_search::{IndexName, KeywordDocument, SearchIndex, SearchIndexError};
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::{IngestorError, Result};

/// Retry behavior for bulk writes.
///
/// The whole chunk is resubmitted on any failure. `max_attempts: None`
/// retries forever: delivery of well-formed data is guaranteed at the cost
/// of unbounded latency on a permanently failing chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<NonZeroU32>,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroU32::new(Self::DEFAULT_MAX_ATTEMPTS),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

    /// Retry forever with the default backoff.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            ..Self::default()
        }
    }

    /// Backoff before the next attempt, doubling per attempt up to the cap.
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }

    fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max.get())
    }
}

/// A chunk abandoned after exhausting its write attempts.
#[derive(Debug)]
pub struct PoisonedChunk {
    pub index: IndexName,
    pub documents: Vec<KeywordDocument>,
    pub attempts: u32,
    pub error: SearchIndexError,
}

pub type PoisonedChunkSender = mpsc::UnboundedSender<PoisonedChunk>;

/// Outcome of writing one fine chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk was acknowledged by the search index.
    Written,
    /// The retry policy gave the chunk up; it was reported on the poison channel.
    Poisoned,
}

/// Writes fine chunks to the search index, absorbing retryable failures.
pub struct BulkWriter {
    index: Arc<dyn SearchIndex>,
    policy: RetryPolicy,
    poison: Option<PoisonedChunkSender>,
}

impl BulkWriter {
    pub fn new(index: Arc<dyn SearchIndex>, policy: RetryPolicy) -> Self {
        Self {
            index,
            policy,
            poison: None,
        }
    }

    /// Report abandoned chunks on this channel instead of failing the run.
    pub fn with_poison_channel(mut self, sender: PoisonedChunkSender) -> Self {
        self.poison = Some(sender);
        self
    }

    /// Write one chunk, resubmitting the whole chunk on any failure.
    ///
    /// Returns once a request-level success is observed, or once the retry
    /// policy gives the chunk up. With a capped policy and no poison channel
    /// the exhaustion error is fatal for the caller.
    pub async fn write_chunk(
        &self,
        index: &IndexName,
        chunk: &[KeywordDocument],
    ) -> Result<ChunkOutcome> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let error = match self.index.bulk_write(index, chunk).await {
                Ok(()) => return Ok(ChunkOutcome::Written),
                Err(error) => error,
            };

            if self.policy.exhausted(attempt) {
                let Some(sender) = &self.poison else {
                    return Err(IngestorError::RetriesExhausted {
                        index: index.to_string(),
                        attempts: attempt,
                        documents: chunk.len(),
                        source: error,
                    });
                };

                warn!(
                    index = %index,
                    attempts = attempt,
                    documents = chunk.len(),
                    "abandoning chunk after exhausting write attempts"
                );

                // The receiver may already be gone; the chunk is abandoned either way.
                let _ = sender.send(PoisonedChunk {
                    index: index.clone(),
                    documents: chunk.to_vec(),
                    attempts: attempt,
                    error,
                });

                return Ok(ChunkOutcome::Poisoned);
            }

            let backoff = self.policy.backoff(attempt);
            warn!(
                index = %index,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "bulk write failed, retrying chunk"
            );
            tokio::time::sleep(backoff).await;
        }
    }
}
