//! Two-level chunking of document sequences.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(display("invalid chunk sizes: coarse {coarse} and fine {fine} must satisfy coarse >= fine > 0"))]
pub struct InvalidChunkSizes {
    pub coarse: usize,
    pub fine: usize,
}

/// Two-level batch sizes.
///
/// The coarse size bounds how many documents are in flight concurrently;
/// the fine size bounds one bulk-write request's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSizes {
    coarse: usize,
    fine: usize,
}

impl Default for ChunkSizes {
    fn default() -> Self {
        Self {
            coarse: Self::DEFAULT_COARSE,
            fine: Self::DEFAULT_FINE,
        }
    }
}

impl ChunkSizes {
    pub const DEFAULT_COARSE: usize = 15_000;
    pub const DEFAULT_FINE: usize = 1_000;

    pub fn new(coarse: usize, fine: usize) -> Result<Self, InvalidChunkSizes> {
        if coarse == 0 || fine == 0 || fine > coarse {
            return Err(InvalidChunkSizes { coarse, fine });
        }

        Ok(Self { coarse, fine })
    }

    pub fn coarse(&self) -> usize {
        self.coarse
    }

    pub fn fine(&self) -> usize {
        self.fine
    }

    /// Split into coarse groups, preserving order.
    ///
    /// A trailing group shorter than the coarse size is kept as-is.
    pub fn coarse_groups<'a, T>(&self, items: &'a [T]) -> impl Iterator<Item = &'a [T]> {
        items.chunks(self.coarse)
    }

    /// Split one coarse group into fine chunks, preserving order.
    pub fn fine_chunks<'a, T>(&self, group: &'a [T]) -> impl Iterator<Item = &'a [T]> {
        group.chunks(self.fine)
    }
}
