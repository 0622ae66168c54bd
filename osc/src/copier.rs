//! C4: the Copier. Drains a `Chunker` with a worker pool of OS threads,
//! issuing `INSERT [IGNORE] INTO new_table (...) SELECT ... FROM old_table
//! WHERE <predicate>` for each chunk and feeding timing back into the
//! chunker's adaptive sizing.
//!
//! Duplicate-key races against a concurrently-running replication replay
//! are expected and tolerated via `INSERT IGNORE`; anything the server
//! flags as a genuine type coercion (truncation, overflow, a value too long
//! for its column) is fatal, because silently coercing it would make the
//! new table's data diverge from the old one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::chunker::Chunker;
use crate::db::{Executor, SqlWarning};
use crate::error::{OscError, OscResult};
use crate::table_info::TableInfo;
use crate::throttle::Throttler;

/// Warning codes the server raises for a lossy conversion that must not be
/// silently swallowed: out-of-range numerics, truncated strings, and a value
/// too long for its column.
const FATAL_WARNING_CODES: &[u16] = &[1264, 1265, 1406];

/// Warning codes for an invalid/zero date, tolerated only when the copier
/// was configured to allow them (mirrors relaxing `NO_ZERO_DATE`/
/// `NO_ZERO_IN_DATE` in the session's `sql_mode`).
const ZERO_DATE_WARNING_CODES: &[u16] = &[1292, 1411];

pub struct Copier {
    old_table: Arc<TableInfo>,
    new_table: Arc<TableInfo>,
    db: Arc<dyn Executor>,
    chunker: Arc<dyn Chunker>,
    concurrency: usize,
    /// When true, uses `INSERT IGNORE` so a unique-key violation (possible
    /// when resuming from checkpoint, or racing the replication replay) is
    /// dropped rather than aborting the whole chunk.
    tolerate_duplicates: bool,
    allow_zero_dates: bool,
    max_retries: u32,
    throttler: Arc<dyn Throttler>,
    /// The column intersection of `old_table`/`new_table`: columns present
    /// only in the source are dropped, columns only in the shadow take
    /// their CREATE defaults.
    shared_columns: Vec<String>,
}

impl Copier {
    pub fn new(
        old_table: Arc<TableInfo>,
        new_table: Arc<TableInfo>,
        db: Arc<dyn Executor>,
        chunker: Arc<dyn Chunker>,
        concurrency: usize,
        tolerate_duplicates: bool,
    ) -> OscResult<Self> {
        if old_table.columns.is_empty() || new_table.columns.is_empty() {
            return Err(OscError::config("copier requires both tables to have discovered columns"));
        }
        let shared_columns: Vec<String> =
            old_table.columns.iter().filter(|c| new_table.columns.contains(c)).cloned().collect();
        if shared_columns.is_empty() {
            return Err(OscError::config("no columns survive between old and new table to copy"));
        }
        Ok(Copier {
            old_table,
            new_table,
            db,
            chunker,
            concurrency: concurrency.max(1),
            tolerate_duplicates,
            allow_zero_dates: true,
            max_retries: 5,
            throttler: Arc::new(crate::throttle::NoopThrottler),
            shared_columns,
        })
    }

    pub fn set_throttler(&mut self, throttler: Arc<dyn Throttler>) {
        self.throttler = throttler;
    }

    pub fn set_allow_zero_dates(&mut self, allow: bool) {
        self.allow_zero_dates = allow;
    }

    /// Relaxes the session's `sql_mode` so a zero/invalid date raises a
    /// warning instead of aborting the statement; callers that don't want
    /// this (e.g. to enforce stricter data safety) can skip calling it.
    fn relax_sql_mode(&self) -> OscResult<()> {
        self.db.execute(
            "SET SESSION sql_mode = \
             (SELECT REPLACE(REPLACE(@@SESSION.sql_mode, 'NO_ZERO_DATE', ''), 'NO_ZERO_IN_DATE', ''))",
        )?;
        Ok(())
    }

    /// Copies every chunk the chunker emits, using `concurrency` worker
    /// threads. Returns the first fatal error encountered by any worker, if
    /// any; workers observe it promptly via an abort flag rather than
    /// finishing the whole table.
    pub fn run(&self) -> OscResult<()> {
        if self.allow_zero_dates {
            self.relax_sql_mode()?;
        }

        let first_error: Arc<Mutex<Option<OscError>>> = Arc::new(Mutex::new(None));
        let abort = Arc::new(AtomicBool::new(false));

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.concurrency);
            for _ in 0..self.concurrency {
                let first_error = Arc::clone(&first_error);
                let abort = Arc::clone(&abort);
                handles.push(scope.spawn(move || {
                    while !abort.load(Ordering::Relaxed) {
                        let chunk = match self.chunker.next() {
                            Ok(c) => c,
                            Err(OscError::TableIsRead) => break,
                            Err(e) => {
                                *first_error.lock().unwrap() = Some(e);
                                abort.store(true, Ordering::Relaxed);
                                break;
                            }
                        };

                        self.throttler.throttle();

                        let started = Instant::now();
                        let result = self.copy_chunk(self.db.as_ref(), &chunk);
                        let elapsed = started.elapsed();

                        match result {
                            Ok(()) => {
                                if let Err(e) = self.chunker.feedback(&chunk, elapsed) {
                                    *first_error.lock().unwrap() = Some(e);
                                    abort.store(true, Ordering::Relaxed);
                                    break;
                                }
                            }
                            Err(e) => {
                                *first_error.lock().unwrap() = Some(e);
                                abort.store(true, Ordering::Relaxed);
                                break;
                            }
                        }
                    }
                }));
            }
            for h in handles {
                let _ = h.join();
            }
        });

        match first_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn copy_chunk(&self, session: &dyn Executor, chunk: &crate::table_info::Chunk) -> OscResult<()> {
        let verb = if self.tolerate_duplicates { "INSERT IGNORE" } else { "INSERT" };
        let cols = self.shared_columns.join(", ");
        let sql = format!(
            "{} INTO {} ({}) SELECT {} FROM {} WHERE {}",
            verb,
            self.new_table.quoted_name(),
            cols,
            cols,
            self.old_table.quoted_name(),
            chunk.predicate(),
        );

        crate::db::with_retry(self.max_retries, Duration::from_millis(250), || {
            session.execute(&sql)?;
            let warnings = session.warnings()?;
            self.check_warnings(&warnings)
        })
    }

    fn check_warnings(&self, warnings: &[SqlWarning]) -> OscResult<()> {
        for w in warnings {
            if ZERO_DATE_WARNING_CODES.contains(&w.code) {
                if self.allow_zero_dates {
                    continue;
                }
                return Err(OscError::DataSafety(format!("unsafe warning migrating chunk: {}", w.message)));
            }
            if FATAL_WARNING_CODES.contains(&w.code) {
                return Err(OscError::DataSafety(format!("unsafe warning migrating chunk: {}", w.message)));
            }
        }
        Ok(())
    }
}
