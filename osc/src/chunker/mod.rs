//! C3: the Chunker. Divides the source table into bounded key ranges for
//! parallel copy, supports resume-from-checkpoint via a low-watermark
//! protocol, and (for the universal variant) dynamically adjusts chunk
//! size to a target wall-clock processing duration.
//!
//! Three variants share one contract (`Chunker`) and are chosen once at
//! attach time by `ChunkerKind::detect`; this is modeled as a tagged
//! dispatch over a trait object, not inheritance.

mod composite;
mod optimistic;
mod universal;
mod watermark;

pub use composite::CompositeChunker;
pub use optimistic::OptimisticChunker;
pub use universal::UniversalChunker;

use std::sync::Arc;
use std::time::Duration;

use crate::datum::Datum;
use crate::db::Executor;
use crate::error::OscResult;
use crate::table_info::{Chunk, TableInfo};

pub const STARTING_CHUNK_SIZE: u64 = 1000;
pub const MIN_DYNAMIC_ROW_SIZE: u64 = 10;
pub const MAX_DYNAMIC_ROW_SIZE: u64 = 100_000;
pub const MAX_DYNAMIC_STEP_FACTOR: f64 = 1.5;
pub const DYNAMIC_PANIC_FACTOR: u32 = 5;
/// Cap on a single optimistic wide-gap chunk, relative to the current
/// chunk size.
pub const OPTIMISTIC_GAP_CAP_FACTOR: u64 = 10;
/// Timing samples needed before the universal chunker re-evaluates its
/// target size.
pub const TIMING_WINDOW: usize = 10;

/// Shared contract for all three chunker variants.
pub trait Chunker: Send + Sync {
    /// Opens the table for chunking. Idempotent within a run; a second call
    /// is an error.
    fn open(&self) -> OscResult<()>;

    /// Opens the table for chunking, resuming from a serialized `Chunk`
    /// checkpoint (the low watermark of an interrupted prior run).
    fn open_at_watermark(&self, checkpoint_json: &str) -> OscResult<()>;

    /// Emits the next range in key order. Thread-safe. Returns
    /// `OscError::TableIsRead` once the terminal chunk has been emitted.
    fn next(&self) -> OscResult<Chunk>;

    /// Informs adaptive sizing and advances the low watermark.
    fn feedback(&self, chunk: &Chunk, duration: Duration) -> OscResult<()>;

    /// Serialized low watermark, suitable for a checkpoint.
    fn low_watermark(&self) -> OscResult<String>;

    /// True whenever `key` is known not to be covered by any chunk emitted
    /// so far (i.e. the copier has not yet reached it, or chunking hasn't
    /// started). Used by the replay engine to skip unnecessary replay of
    /// keys the copier will handle anyway.
    fn key_above_high_watermark(&self, key: &Datum) -> bool;

    /// True once the terminal chunk has been emitted.
    fn is_read(&self) -> bool;
}

/// Chooses the chunker variant appropriate for a table's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkerKind {
    /// Single integer auto-increment PK with few gaps expected.
    Optimistic,
    /// Single PK, non-auto-increment or with gaps expected.
    Universal,
    /// Multi-column PK.
    Composite,
}

impl ChunkerKind {
    pub fn detect(table: &TableInfo) -> Self {
        if table.key_columns.len() > 1 {
            ChunkerKind::Composite
        } else if table.key_is_auto_inc() {
            ChunkerKind::Optimistic
        } else {
            ChunkerKind::Universal
        }
    }
}

/// Attaches the chunker variant chosen by `ChunkerKind::detect` to
/// `table`, targeting `target_chunk_time` for the universal variant's
/// adaptive sizing.
pub fn attach(
    table: Arc<TableInfo>,
    db: Arc<dyn Executor>,
    target_chunk_time: Duration,
    disable_dynamic_chunker: bool,
) -> OscResult<Box<dyn Chunker>> {
    match ChunkerKind::detect(&table) {
        ChunkerKind::Optimistic => Ok(Box::new(OptimisticChunker::new(table, target_chunk_time, disable_dynamic_chunker))),
        ChunkerKind::Universal => Ok(Box::new(UniversalChunker::new(table, target_chunk_time, disable_dynamic_chunker))),
        ChunkerKind::Composite => Ok(Box::new(CompositeChunker::new(table, db))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_composite_for_multi_column_key() {
        let mut t = TableInfo::new("s", "t");
        t.key_columns = vec!["a".into(), "b".into()];
        assert_eq!(ChunkerKind::detect(&t), ChunkerKind::Composite);
    }
}
