//! The optimistic chunker variant: a single integer auto-increment primary
//! key with few gaps expected. Strides the pointer by `chunk_size`; when
//! the actual row density is much sparser than expected (a large gap), a
//! naive stride would emit one enormous chunk holding a long-running lock.
//! A single wide chunk is never allowed to exceed `OPTIMISTIC_GAP_CAP_FACTOR
//! * chunk_size`; adaptive sizing is otherwise identical to the universal
//! variant's feedback loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ringbuffer::AllocRingBuffer;

use super::watermark::WatermarkTracker;
use super::{
    Chunker, DYNAMIC_PANIC_FACTOR, MAX_DYNAMIC_ROW_SIZE, MAX_DYNAMIC_STEP_FACTOR, MIN_DYNAMIC_ROW_SIZE,
    OPTIMISTIC_GAP_CAP_FACTOR, STARTING_CHUNK_SIZE, TIMING_WINDOW,
};
use crate::datum::Datum;
use crate::error::{OscError, OscResult};
use crate::table_info::{Boundary, Chunk, TableInfo};

struct State {
    chunk_ptr: Datum,
    chunk_size: u64,
    is_open: bool,
    final_chunk_sent: bool,
    timings: AllocRingBuffer<Duration>,
    watermark: WatermarkTracker,
}

pub struct OptimisticChunker {
    table: Arc<TableInfo>,
    target: Duration,
    disable_dynamic_chunker: bool,
    state: Mutex<State>,
}

impl OptimisticChunker {
    pub fn new(table: Arc<TableInfo>, target: Duration, disable_dynamic_chunker: bool) -> Self {
        let kind = table.key_datum_kind().unwrap_or(crate::datum::DatumKind::Signed);
        OptimisticChunker {
            table,
            target,
            disable_dynamic_chunker,
            state: Mutex::new(State {
                chunk_ptr: Datum::nil(kind),
                chunk_size: STARTING_CHUNK_SIZE,
                is_open: false,
                final_chunk_sent: false,
                timings: AllocRingBuffer::new(TIMING_WINDOW + 1),
                watermark: WatermarkTracker::new(),
            }),
        }
    }

    fn open_locked(&self, st: &mut State) -> OscResult<()> {
        if st.is_open {
            return Err(OscError::config("table is already open, did you mean to call Reset()?"));
        }
        let kind = self.table.key_datum_kind()?;
        st.is_open = true;
        st.chunk_ptr = Datum::nil(kind);
        st.final_chunk_sent = false;
        st.chunk_size = STARTING_CHUNK_SIZE;
        Ok(())
    }

    /// The naive stride, capped so a sparse region never produces a chunk
    /// wider than `OPTIMISTIC_GAP_CAP_FACTOR * chunk_size`.
    fn next_locked(&self, st: &mut State) -> OscResult<Chunk> {
        let key = self.table.key_columns[0].clone();

        // No discovered bounds means no rows: there is nothing to chunk.
        let Some(max) = self.table.max_value() else {
            st.final_chunk_sent = true;
            let lower_bound = if st.chunk_ptr.is_nil() { None } else { Some(Boundary::new(st.chunk_ptr.clone(), true)) };
            return Ok(Chunk { key, lower_bound, upper_bound: None, chunk_size: st.chunk_size });
        };
        let cap = st.chunk_size.saturating_mul(OPTIMISTIC_GAP_CAP_FACTOR);

        let lower = if st.chunk_ptr.is_nil() {
            self.table.min_value().unwrap_or_else(|| st.chunk_ptr.min_value())
        } else {
            st.chunk_ptr.clone()
        };
        if lower.greater_than_or_equal(&max) {
            st.final_chunk_sent = true;
            let lower_bound = if st.chunk_ptr.is_nil() { None } else { Some(Boundary::new(lower, true)) };
            return Ok(Chunk { key, lower_bound, upper_bound: None, chunk_size: st.chunk_size });
        }

        let naive_upper = lower.add(st.chunk_size);
        let capped_upper = lower.add(cap);
        let upper = if naive_upper.greater_than_or_equal(&max) {
            max.clone()
        } else {
            naive_upper.clone().min(capped_upper).min(max.clone())
        };

        let was_nil = st.chunk_ptr.is_nil();
        st.chunk_ptr = upper.clone();
        Ok(Chunk {
            key,
            lower_bound: if was_nil { None } else { Some(Boundary::new(lower, true)) },
            upper_bound: Some(Boundary::new(upper, false)),
            chunk_size: st.chunk_size,
        })
    }

    fn boundary_check(&self, current: u64, new_target: f64) -> u64 {
        let mut t = new_target;
        if t > current as f64 * MAX_DYNAMIC_STEP_FACTOR {
            t = current as f64 * MAX_DYNAMIC_STEP_FACTOR;
        }
        t = t.clamp(MIN_DYNAMIC_ROW_SIZE as f64, MAX_DYNAMIC_ROW_SIZE as f64);
        t as u64
    }
}

impl Chunker for OptimisticChunker {
    fn open(&self) -> OscResult<()> {
        let mut st = self.state.lock().unwrap();
        self.open_locked(&mut st)
    }

    fn open_at_watermark(&self, checkpoint_json: &str) -> OscResult<()> {
        let mut st = self.state.lock().unwrap();
        self.open_locked(&mut st)?;
        let chunk = Chunk::from_json(checkpoint_json)?;
        let lower = chunk.lower_bound.clone().ok_or_else(|| OscError::config("checkpoint chunk is missing a lower bound"))?;
        if lower.value.kind() != self.table.key_datum_kind()? {
            return Err(OscError::config("checkpoint primary key type disagrees with the current table"));
        }
        st.chunk_ptr = lower.value;
        st.watermark.restore(chunk);
        Ok(())
    }

    fn next(&self) -> OscResult<Chunk> {
        let mut st = self.state.lock().unwrap();
        if st.final_chunk_sent {
            return Err(OscError::TableIsRead);
        }
        if !st.is_open {
            return Err(OscError::ChunkerNotOpen);
        }
        self.next_locked(&mut st)
    }

    fn feedback(&self, chunk: &Chunk, duration: Duration) -> OscResult<()> {
        let mut st = self.state.lock().unwrap();
        st.watermark.bump(chunk.clone())?;

        if chunk.chunk_size != st.chunk_size || self.disable_dynamic_chunker {
            return Ok(());
        }
        if duration > self.target * DYNAMIC_PANIC_FACTOR {
            let new_target = st.chunk_size as f64 / 4.0;
            st.chunk_size = self.boundary_check(st.chunk_size, new_target);
            st.timings.clear();
            return Ok(());
        }
        st.timings.push(duration);
        Ok(())
    }

    fn low_watermark(&self) -> OscResult<String> {
        self.state.lock().unwrap().watermark.serialized()
    }

    fn key_above_high_watermark(&self, key: &Datum) -> bool {
        let st = self.state.lock().unwrap();
        if st.chunk_ptr.is_nil() {
            return true;
        }
        if st.final_chunk_sent {
            return false;
        }
        key.greater_than_or_equal(&st.chunk_ptr)
    }

    fn is_read(&self) -> bool {
        self.state.lock().unwrap().final_chunk_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Arc<TableInfo> {
        let mut t = TableInfo::new("test", "t1");
        t.columns = vec!["a".into()];
        t.key_columns = vec!["a".into()];
        t.set_key_metadata_for_test("int(11)", true);
        Arc::new(t)
    }

    #[test]
    fn undiscovered_bounds_exhaust_immediately() {
        let c = OptimisticChunker::new(table(), Duration::from_secs(2), true);
        c.open().unwrap();
        let chunk = c.next().unwrap();
        assert!(chunk.upper_bound.is_none());
        assert!(matches!(c.next(), Err(OscError::TableIsRead)));
    }

    #[test]
    fn gap_wider_than_cap_is_capped() {
        let t = table();
        t.set_min_max_for_test(Datum::Signed(0), Datum::Signed(1_000_000));
        let c = OptimisticChunker::new(t, Duration::from_secs(2), true);
        c.open().unwrap();
        let chunk = c.next().unwrap();
        // first chunk from nil: upper = min.add(chunk_size) = STARTING_CHUNK_SIZE
        assert_eq!(chunk.upper_bound.unwrap().value, Datum::Signed(STARTING_CHUNK_SIZE as i64));
    }

    #[test]
    fn key_above_high_watermark_false_once_exhausted() {
        let t = table();
        t.set_min_max_for_test(Datum::Signed(0), Datum::Signed(2_500));
        let c = OptimisticChunker::new(t, Duration::from_secs(2), true);
        c.open().unwrap();
        loop {
            match c.next() {
                Ok(_) => {}
                Err(OscError::TableIsRead) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(!c.key_above_high_watermark(&Datum::Signed(i64::MAX)));
    }
}
