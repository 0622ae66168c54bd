//! `Client`: tails the source table's binlog on a background thread,
//! accumulating row changes into a `DeltaSet`, and periodically flushes
//! that set onto the shadow table. A chunker (once attached and opened)
//! lets the flush path skip keys the copier hasn't reached yet, since
//! those rows will be written fresh by the copy itself.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::chunker::Chunker;
use crate::datum::parse_datum;
use crate::db::{with_retry, Executor};
use crate::error::{OscError, OscResult};
use crate::table_info::TableInfo;

use super::delta::{BinlogEvent, BinlogEventSource, BinlogPosition, DeltaSet, DeltaTag, RowImage};

const DEFAULT_BATCH_SIZE: usize = 10_000;
const TRIVIAL_CHUNKER_THRESHOLD: usize = 1_000;
const MAX_FLUSH_UNTIL_TRIVIAL_ITERATIONS: u32 = 1000;

pub struct Client {
    old_table: Arc<TableInfo>,
    new_table: Arc<TableInfo>,
    db: Arc<dyn Executor>,
    source: Mutex<Option<Box<dyn BinlogEventSource>>>,
    chunker: Mutex<Option<Arc<dyn Chunker>>>,
    delta_set: Arc<DeltaSet>,
    key_above_watermark_optimization: Arc<AtomicBool>,
    batch_size: usize,
    max_retries: u32,
    resume_position: Mutex<Option<BinlogPosition>>,
    applied_position: Arc<Mutex<BinlogPosition>>,
    stop: Arc<AtomicBool>,
    events_processed: Arc<(Mutex<u64>, Condvar)>,
    /// Set once the tailing thread's source has run out of events on its
    /// own (rather than being asked to stop). `block_wait` uses this to
    /// avoid waiting forever for a target position no more events can
    /// ever reach.
    exhausted: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<OscResult<()>>>>,
}

impl Client {
    pub fn new(
        old_table: Arc<TableInfo>,
        new_table: Arc<TableInfo>,
        db: Arc<dyn Executor>,
        source: Box<dyn BinlogEventSource>,
    ) -> Self {
        Client {
            old_table,
            new_table,
            db,
            source: Mutex::new(Some(source)),
            chunker: Mutex::new(None),
            delta_set: Arc::new(DeltaSet::new()),
            key_above_watermark_optimization: Arc::new(AtomicBool::new(true)),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: 5,
            resume_position: Mutex::new(None),
            applied_position: Arc::new(Mutex::new(BinlogPosition::default())),
            stop: Arc::new(AtomicBool::new(false)),
            events_processed: Arc::new((Mutex::new(0), Condvar::new())),
            exhausted: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    pub fn attach_chunker(&self, chunker: Arc<dyn Chunker>) {
        *self.chunker.lock().unwrap() = Some(chunker);
    }

    pub fn set_key_above_watermark_optimization(&self, enabled: bool) {
        self.key_above_watermark_optimization.store(enabled, Ordering::SeqCst);
    }

    /// Resumes from a previously-checkpointed binlog position. Must be
    /// called before `run`.
    pub fn set_pos(&self, pos: BinlogPosition) {
        *self.resume_position.lock().unwrap() = Some(pos);
    }

    pub fn get_delta_len(&self) -> usize {
        self.delta_set.len()
    }

    pub fn get_binlog_apply_position(&self) -> BinlogPosition {
        self.applied_position.lock().unwrap().clone()
    }

    /// Starts the background tailing thread. If a resume position was set
    /// and the source rejects it (the binlog file has since been purged),
    /// this returns the error synchronously rather than failing the
    /// background thread silently.
    pub fn run(&self) -> OscResult<()> {
        let mut source = self.source.lock().unwrap().take().ok_or_else(|| {
            OscError::config("replication client already running, or never given a binlog source")
        })?;

        if let Some(pos) = self.resume_position.lock().unwrap().clone() {
            source.seek(&pos)?;
        }
        *self.applied_position.lock().unwrap() = source.position();

        let old_table = self.old_table.clone();
        let delta_set = self.delta_set.clone();
        let chunker = self.chunker.lock().unwrap().clone();
        let chunker = Arc::new(Mutex::new(chunker));
        let key_above_watermark_optimization = self.key_above_watermark_optimization.clone();
        let stop = self.stop.clone();
        let events_processed = self.events_processed.clone();
        let applied_position = self.applied_position.clone();
        let exhausted = self.exhausted.clone();

        let handle = std::thread::Builder::new()
            .name(format!("osc-repl-{}-{}", old_table.schema, old_table.name))
            .spawn(move || -> OscResult<()> {
                while !stop.load(Ordering::SeqCst) {
                    let Some(event) = source.next_event()? else {
                        exhausted.store(true, Ordering::SeqCst);
                        let (lock, cvar) = &*events_processed;
                        let _ = lock.lock().unwrap();
                        cvar.notify_all();
                        break;
                    };
                    if event.schema == old_table.schema && event.table == old_table.name {
                        let row = match &event.tag {
                            DeltaTag::Upsert(row) | DeltaTag::Delete(row) => row,
                        };
                        let skip = {
                            let guard = chunker.lock().unwrap();
                            should_skip(&old_table, &guard, &key_above_watermark_optimization, row)
                        };
                        if !skip {
                            let key = old_table.primary_key_string(row);
                            delta_set.insert(key, event.tag.clone());
                        }
                    }
                    *applied_position.lock().unwrap() = event.position;

                    let (lock, cvar) = &*events_processed;
                    *lock.lock().unwrap() += 1;
                    cvar.notify_all();
                }
                Ok(())
            })
            .map_err(OscError::Io)?;

        *self.worker.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// Blocks until all events up to the source's current server position
    /// have been ingested into the delta set. Queries that position once
    /// up front (via `SHOW MASTER STATUS`, independent of however far the
    /// tailing thread has already read), then waits for the applied
    /// position to catch up. Also returns if the tailing thread's source
    /// has exhausted itself (no more events will ever arrive) or has been
    /// stopped, rather than waiting forever for a position nothing more
    /// can reach.
    pub fn block_wait(&self) -> OscResult<()> {
        let target = self.current_server_position()?;
        let (lock, cvar) = &*self.events_processed;
        let mut guard = lock.lock().unwrap();
        loop {
            if self.applied_position.lock().unwrap().is_at_least(&target) {
                return Ok(());
            }
            if self.exhausted.load(Ordering::SeqCst) || self.stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            let (next_guard, _timeout) = cvar.wait_timeout(guard, Duration::from_millis(50)).unwrap();
            guard = next_guard;
        }
    }

    /// The server's current binlog position, queried independently of the
    /// tailing thread's own progress through the stream. Mirrors the
    /// `SHOW MASTER STATUS` column layout the production driver already
    /// uses to seed a fresh binlog subscription.
    fn current_server_position(&self) -> OscResult<BinlogPosition> {
        let rows = self.db.query("show master status")?;
        match rows.first() {
            Some(row) => {
                let file_name = row.get(0).unwrap_or_default().to_string();
                let position = row.get(1).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
                Ok(BinlogPosition::new(file_name, position))
            }
            None => Ok(BinlogPosition::default()),
        }
    }

    pub fn stop(&self) -> OscResult<()> {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            handle.join().map_err(|_| OscError::config("replay thread panicked"))??;
        }
        Ok(())
    }

    /// Applies one batch (up to `batch_size` keys) of the accumulated delta
    /// set to the shadow table: a batched `REPLACE INTO` for upserts, a
    /// batched `DELETE ... WHERE (key) IN (...)` for deletes.
    pub fn flush(&self) -> OscResult<()> {
        let batch = self.delta_set.drain_batch(self.batch_size);
        if batch.is_empty() {
            return Ok(());
        }

        let mut upserts = Vec::new();
        let mut deletes = Vec::new();
        for (_, tag) in batch {
            match tag {
                DeltaTag::Upsert(row) => upserts.push(row),
                DeltaTag::Delete(row) => deletes.push(row),
            }
        }

        if !upserts.is_empty() {
            let sql = self.render_replace(&upserts)?;
            with_retry(self.max_retries, Duration::from_millis(100), || self.db.execute(&sql))?;
        }
        if !deletes.is_empty() {
            let sql = self.render_delete(&deletes)?;
            with_retry(self.max_retries, Duration::from_millis(100), || self.db.execute(&sql))?;
        }
        Ok(())
    }

    /// Flushes repeatedly until the delta set has shrunk below
    /// `TRIVIAL_CHUNKER_THRESHOLD`. Intended for cutover: the final
    /// reconciliation under the table lock only needs to finish off a small
    /// remainder, not drain an unbounded stream of concurrent writes.
    pub fn flush_until_trivial(&self) -> OscResult<()> {
        let mut iterations = 0;
        while self.delta_set.len() >= TRIVIAL_CHUNKER_THRESHOLD {
            self.flush()?;
            iterations += 1;
            if iterations > MAX_FLUSH_UNTIL_TRIVIAL_ITERATIONS {
                return Err(OscError::CutoverFailed(
                    "replication delta set did not drain; writes are still arriving faster than flush can apply them".into(),
                ));
            }
        }
        Ok(())
    }

    fn shared_columns(&self, row: &RowImage) -> (Vec<String>, Vec<Option<String>>) {
        let mut cols = Vec::new();
        let mut vals = Vec::new();
        for (i, col) in self.old_table.columns.iter().enumerate() {
            if self.new_table.columns.contains(col) {
                cols.push(col.clone());
                vals.push(row.get(i).cloned().flatten());
            }
        }
        (cols, vals)
    }

    fn render_replace(&self, rows: &[RowImage]) -> OscResult<String> {
        let (cols, _) = self.shared_columns(&rows[0]);
        if cols.is_empty() {
            return Err(OscError::InvariantViolation("no columns survive between old and new table".into()));
        }
        let values: Vec<String> = rows
            .iter()
            .map(|row| {
                let (_, vals) = self.shared_columns(row);
                format!("({})", vals.iter().map(sql_quote).collect::<Vec<_>>().join(", "))
            })
            .collect();
        Ok(format!(
            "REPLACE INTO {} ({}) VALUES {}",
            self.new_table.quoted_name(),
            cols.join(", "),
            values.join(", ")
        ))
    }

    fn render_delete(&self, rows: &[RowImage]) -> OscResult<String> {
        let key_cols = &self.old_table.key_columns;
        if key_cols.len() == 1 {
            let values: Vec<String> = rows
                .iter()
                .map(|row| sql_quote(self.old_table.primary_key_values(row)[0]))
                .collect();
            Ok(format!("DELETE FROM {} WHERE {} IN ({})", self.new_table.quoted_name(), key_cols[0], values.join(", ")))
        } else {
            let tuples: Vec<String> = rows
                .iter()
                .map(|row| {
                    let key_vals = self.old_table.primary_key_values(row);
                    format!("({})", key_vals.iter().map(|v| sql_quote(v)).collect::<Vec<_>>().join(", "))
                })
                .collect();
            Ok(format!("DELETE FROM {} WHERE ({}) IN ({})", self.new_table.quoted_name(), key_cols.join(", "), tuples.join(", ")))
        }
    }
}

fn should_skip(
    table: &TableInfo,
    chunker: &Option<Arc<dyn Chunker>>,
    optimization_enabled: &AtomicBool,
    row: &RowImage,
) -> bool {
    if !optimization_enabled.load(Ordering::SeqCst) {
        return false;
    }
    let Some(chunker) = chunker else { return false };
    let Ok(kind) = table.key_datum_kind() else { return false };
    let pk_values = table.primary_key_values(row);
    let Some(Some(raw)) = pk_values.first().map(|v| v.as_deref()) else { return false };
    match parse_datum(raw, kind) {
        Ok(datum) => chunker.key_above_high_watermark(&datum),
        Err(_) => false,
    }
}

fn sql_quote(value: &Option<String>) -> String {
    match value {
        None => "NULL".to_string(),
        Some(v) => format!("'{}'", v.replace('\\', "\\\\").replace('\'', "''")),
    }
}
