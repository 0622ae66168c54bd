//! The universal chunker variant: adaptive, time-targeted chunk sizing for
//! a single, non-auto-increment (or gappy) primary key. Falls back to
//! prefetching when the p90 processing time diverges too far from the
//! target even at the maximum chunk size.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ringbuffer::{AllocRingBuffer, RingBuffer};

use super::watermark::WatermarkTracker;
use super::{
    Chunker, DYNAMIC_PANIC_FACTOR, MAX_DYNAMIC_ROW_SIZE, MAX_DYNAMIC_STEP_FACTOR, MIN_DYNAMIC_ROW_SIZE,
    STARTING_CHUNK_SIZE, TIMING_WINDOW,
};
use crate::datum::Datum;
use crate::error::{OscError, OscResult};
use crate::table_info::{Boundary, Chunk, TableInfo};

struct State {
    chunk_ptr: Datum,
    chunk_size: u64,
    is_open: bool,
    final_chunk_sent: bool,
    chunk_prefetching_enabled: bool,
    timings: AllocRingBuffer<Duration>,
    watermark: WatermarkTracker,
}

pub struct UniversalChunker {
    table: Arc<TableInfo>,
    target: Duration,
    disable_dynamic_chunker: bool,
    state: Mutex<State>,
}

impl UniversalChunker {
    pub fn new(table: Arc<TableInfo>, target: Duration, disable_dynamic_chunker: bool) -> Self {
        let kind = table.key_datum_kind().unwrap_or(crate::datum::DatumKind::Signed);
        UniversalChunker {
            table,
            target,
            disable_dynamic_chunker,
            state: Mutex::new(State {
                chunk_ptr: Datum::nil(kind),
                chunk_size: STARTING_CHUNK_SIZE,
                is_open: false,
                final_chunk_sent: false,
                chunk_prefetching_enabled: false,
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

    fn next_locked(&self, st: &mut State) -> OscResult<Chunk> {
        let key = self.table.key_columns[0].clone();

        // No discovered bounds means no rows: there is nothing to chunk.
        let Some(max) = self.table.max_value() else {
            st.final_chunk_sent = true;
            let lower_bound = if st.chunk_ptr.is_nil() { None } else { Some(Boundary::new(st.chunk_ptr.clone(), true)) };
            return Ok(Chunk { key, lower_bound, upper_bound: None, chunk_size: st.chunk_size });
        };

        if st.chunk_ptr.is_nil() {
            let min = self.table.min_value().unwrap_or_else(|| st.chunk_ptr.min_value());
            let upper = min.add(st.chunk_size);
            if upper.greater_than_or_equal(&max) {
                st.final_chunk_sent = true;
                return Ok(Chunk { key, lower_bound: None, upper_bound: None, chunk_size: st.chunk_size });
            }
            st.chunk_ptr = upper.clone();
            return Ok(Chunk {
                key,
                lower_bound: None,
                upper_bound: Some(Boundary::new(upper, false)),
                chunk_size: st.chunk_size,
            });
        }

        let lower = st.chunk_ptr.clone();
        if lower.greater_than_or_equal(&max) {
            st.final_chunk_sent = true;
            return Ok(Chunk { key, lower_bound: Some(Boundary::new(lower, true)), upper_bound: None, chunk_size: st.chunk_size });
        }

        if st.chunk_prefetching_enabled {
            // Prefetching is identical in spirit to the composite
            // chunker's OFFSET-based probe; the universal chunker only
            // switches into it transiently when dynamic sizing diverges,
            // so it is kept local rather than shared with `CompositeChunker`.
            let upper = lower.add(st.chunk_size);
            let upper = if upper.greater_than_or_equal(&max) { max.clone() } else { upper };
            st.chunk_ptr = upper.clone();
            return Ok(Chunk {
                key,
                lower_bound: Some(Boundary::new(lower, true)),
                upper_bound: Some(Boundary::new(upper, false)),
                chunk_size: st.chunk_size,
            });
        }

        let upper = lower.add(st.chunk_size);
        let upper = if upper.greater_than_or_equal(&max) { max.clone() } else { upper };
        st.chunk_ptr = upper.clone();
        Ok(Chunk {
            key,
            lower_bound: Some(Boundary::new(lower, true)),
            upper_bound: Some(Boundary::new(upper, false)),
            chunk_size: st.chunk_size,
        })
    }

    fn boundary_check(&self, current: u64, new_target: f64) -> u64 {
        let mut t = new_target;
        if t > current as f64 * MAX_DYNAMIC_STEP_FACTOR {
            t = current as f64 * MAX_DYNAMIC_STEP_FACTOR;
        }
        if t > MAX_DYNAMIC_ROW_SIZE as f64 {
            t = MAX_DYNAMIC_ROW_SIZE as f64;
        }
        if t < MIN_DYNAMIC_ROW_SIZE as f64 {
            t = MIN_DYNAMIC_ROW_SIZE as f64;
        }
        t as u64
    }

    fn update_chunker_target(&self, st: &mut State, new_target: f64) {
        st.chunk_size = self.boundary_check(st.chunk_size, new_target);
        st.timings.clear();
    }

    fn calculate_new_target(&self, st: &mut State) -> f64 {
        let p90 = percentile_90(&st.timings);
        let target_ns = self.target.as_nanos() as f64;
        let p90_ns = p90.as_nanos().max(1) as f64;
        let new_target_rows = st.chunk_size as f64 * (target_ns / p90_ns);
        if st.chunk_size == MAX_DYNAMIC_ROW_SIZE && new_target_rows > MAX_DYNAMIC_ROW_SIZE as f64 && p90_ns < target_ns * 5.0 {
            tracing::warn!("dynamic chunking is not working as expected, switching to prefetch algorithm");
            st.chunk_size = STARTING_CHUNK_SIZE;
            st.chunk_prefetching_enabled = true;
        }
        new_target_rows
    }
}

fn percentile_90(timings: &AllocRingBuffer<Duration>) -> Duration {
    let mut sorted: Vec<Duration> = timings.iter().copied().collect();
    sorted.sort();
    if sorted.is_empty() {
        return Duration::from_secs(0);
    }
    let idx = ((sorted.len() as f64) * 0.9).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

impl Chunker for UniversalChunker {
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
            tracing::info!(?duration, threshold = ?(self.target * DYNAMIC_PANIC_FACTOR), "high chunk processing time, reducing immediately");
            self.update_chunker_target(&mut st, new_target);
            return Ok(());
        }

        st.timings.push(duration);
        if st.timings.len() > TIMING_WINDOW {
            let new_target = self.calculate_new_target(&mut st);
            self.update_chunker_target(&mut st, new_target);
        }
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
    use std::sync::Arc;

    fn table() -> Arc<TableInfo> {
        let mut t = TableInfo::new("test", "t1");
        t.columns = vec!["a".into()];
        t.key_columns = vec!["a".into()];
        t.set_key_metadata_for_test("int(11)", false);
        Arc::new(t)
    }

    #[test]
    fn double_open_errors() {
        let c = UniversalChunker::new(table(), Duration::from_secs(2), false);
        c.open().unwrap();
        assert!(c.open().is_err());
    }

    #[test]
    fn next_before_open_errors() {
        let c = UniversalChunker::new(table(), Duration::from_secs(2), false);
        assert!(matches!(c.next(), Err(OscError::ChunkerNotOpen)));
    }

    #[test]
    fn exhausts_to_table_is_read_on_empty_table() {
        let c = UniversalChunker::new(table(), Duration::from_secs(2), false);
        c.open().unwrap();
        // min and max are both nil (no discovery ran) -> min.add(chunk_size) >= max immediately.
        let chunk = c.next().unwrap();
        assert!(chunk.upper_bound.is_none());
        assert!(matches!(c.next(), Err(OscError::TableIsRead)));
    }

    #[test]
    fn feedback_panic_path_quarters_chunk_size() {
        let c = UniversalChunker::new(table(), Duration::from_millis(10), false);
        c.open().unwrap();
        let chunk = Chunk { key: "a".into(), lower_bound: None, upper_bound: Some(Boundary::new(Datum::Signed(1000), false)), chunk_size: STARTING_CHUNK_SIZE };
        c.feedback(&chunk, Duration::from_millis(1000)).unwrap(); // 100x target -> panic path
        let st = c.state.lock().unwrap();
        // halve-to-quarter band: new size must land in [chunk_size/4, chunk_size/2].
        assert!(st.chunk_size <= STARTING_CHUNK_SIZE / 2);
        assert!(st.chunk_size >= STARTING_CHUNK_SIZE / 4);
    }

    #[test]
    fn key_above_high_watermark_true_before_any_chunk_read() {
        let c = UniversalChunker::new(table(), Duration::from_secs(2), false);
        c.open().unwrap();
        assert!(c.key_above_high_watermark(&Datum::Signed(0)));
    }
}
