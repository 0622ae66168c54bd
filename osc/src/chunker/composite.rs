//! The composite chunker variant: a multi-column primary key. There is no
//! single scalar to stride by, so chunk boundaries are discovered entirely
//! by prefetch: `SELECT key FROM t WHERE key > ? ORDER BY key LIMIT 1
//! OFFSET chunk_size`. If the gap between the probe's answer and the prior
//! pointer turns out to be small, prefetching is turned back off and the
//! chunker behaves like the universal variant from then on.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::watermark::WatermarkTracker;
use super::{
    Chunker, DYNAMIC_PANIC_FACTOR, MAX_DYNAMIC_ROW_SIZE, MAX_DYNAMIC_STEP_FACTOR, MIN_DYNAMIC_ROW_SIZE,
    STARTING_CHUNK_SIZE,
};
use crate::datum::{parse_datum, Datum};
use crate::db::Executor;
use crate::error::{OscError, OscResult};
use crate::table_info::{Boundary, Chunk, TableInfo};

struct State {
    chunk_ptr: Datum,
    chunk_size: u64,
    is_open: bool,
    final_chunk_sent: bool,
    /// Purely informational: composite chunks are always discovered via the
    /// OFFSET probe, so disabling this only suppresses the one-time warning
    /// once the key range has narrowed.
    chunk_prefetching_enabled: bool,
    watermark: WatermarkTracker,
}

pub struct CompositeChunker {
    table: Arc<TableInfo>,
    db: Arc<dyn Executor>,
    state: Mutex<State>,
}

impl CompositeChunker {
    pub fn new(table: Arc<TableInfo>, db: Arc<dyn Executor>) -> Self {
        let kind = table.key_datum_kind().unwrap_or(crate::datum::DatumKind::Signed);
        CompositeChunker {
            table,
            db,
            state: Mutex::new(State {
                chunk_ptr: Datum::nil(kind),
                chunk_size: STARTING_CHUNK_SIZE,
                is_open: false,
                final_chunk_sent: false,
                chunk_prefetching_enabled: true,
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
        st.chunk_prefetching_enabled = true;
        Ok(())
    }

    /// Only the leading primary-key column is used as the probe key;
    /// composite chunks are bounded by that column alone, with the
    /// remaining key columns carried along for the predicate's `ORDER BY`
    /// tie-breaking at copy time.
    fn next_locked(&self, st: &mut State) -> OscResult<Chunk> {
        let key = self.table.key_columns[0].clone();
        let was_nil = st.chunk_ptr.is_nil();
        let min_val = st.chunk_ptr.clone();
        let probe = if was_nil { min_val.min_value().to_sql_literal() } else { min_val.to_sql_literal() };
        let query = format!(
            "SELECT {} FROM {} WHERE {} > {} ORDER BY {} LIMIT 1 OFFSET {}",
            key,
            self.table.quoted_name(),
            key,
            probe,
            key,
            st.chunk_size
        );
        let rows = self.db.query(&query)?;

        if let Some(row) = rows.into_iter().next() {
            let raw = row.get(0).ok_or_else(|| OscError::Consistency("prefetch probe returned no column".into()))?;
            let upper_val = parse_datum(raw, min_val.kind())?;
            st.chunk_ptr = upper_val.clone();

            if upper_val.range(&min_val) < MAX_DYNAMIC_ROW_SIZE as i128 {
                tracing::warn!(
                    min_val = %min_val,
                    max_val = %upper_val,
                    "disabling chunk prefetching: key range has narrowed below the dynamic row ceiling"
                );
                st.chunk_size = STARTING_CHUNK_SIZE;
                st.chunk_prefetching_enabled = false;
            }

            return Ok(Chunk {
                key,
                lower_bound: if was_nil { None } else { Some(Boundary::new(min_val, true)) },
                upper_bound: Some(Boundary::new(upper_val, false)),
                chunk_size: st.chunk_size,
            });
        }

        st.final_chunk_sent = true;
        Ok(Chunk {
            key,
            lower_bound: if was_nil { None } else { Some(Boundary::new(min_val, true)) },
            upper_bound: None,
            chunk_size: st.chunk_size,
        })
    }

    fn boundary_check(&self, current: u64, new_target: f64) -> u64 {
        let mut t = new_target;
        if t > current as f64 * MAX_DYNAMIC_STEP_FACTOR {
            t = current as f64 * MAX_DYNAMIC_STEP_FACTOR;
        }
        t.clamp(MIN_DYNAMIC_ROW_SIZE as f64, MAX_DYNAMIC_ROW_SIZE as f64) as u64
    }
}

impl Chunker for CompositeChunker {
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

        if chunk.chunk_size != st.chunk_size {
            return Ok(());
        }
        if duration > Duration::from_millis(500) * DYNAMIC_PANIC_FACTOR {
            let new_target = st.chunk_size as f64 / 4.0;
            st.chunk_size = self.boundary_check(st.chunk_size, new_target);
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
    use crate::db::MockExecutor;

    fn table() -> Arc<TableInfo> {
        let mut t = TableInfo::new("test", "t1");
        t.columns = vec!["a".into(), "b".into()];
        t.key_columns = vec!["a".into(), "b".into()];
        t.set_key_metadata_for_test("int(11)", false);
        Arc::new(t)
    }

    #[test]
    fn empty_table_exhausts_immediately() {
        let db: Arc<dyn Executor> = Arc::new(MockExecutor::new("probe"));
        let c = CompositeChunker::new(table(), db);
        c.open().unwrap();
        let chunk = c.next().unwrap();
        assert!(chunk.upper_bound.is_none());
        assert!(matches!(c.next(), Err(OscError::TableIsRead)));
    }

    #[test]
    fn double_open_errors() {
        let db: Arc<dyn Executor> = Arc::new(MockExecutor::new("probe"));
        let c = CompositeChunker::new(table(), db);
        c.open().unwrap();
        assert!(c.open().is_err());
    }
}
