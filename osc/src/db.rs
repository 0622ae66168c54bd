//! The narrow boundary the core issues SQL through.
//!
//! The raw MySQL driver, connection pool and DSN parsing are out of scope
//! for this crate: `osc` never speaks the wire protocol itself. Instead
//! every component takes an `Arc<dyn Executor>`, the same shape
//! `connection::conn::connection::Connection` plus
//! `common::binlog::row::row::Row` expose. A production adapter over that
//! crate is a small wrapper; tests use `MockExecutor`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{OscError, OscResult, SqlError};

/// One result row: a positional vector of column values rendered as
/// strings. This mirrors how the copier/chunker/repl engine actually
/// consume rows (building predicates and keys), and keeps the trait boundary
/// independent of any particular driver's typed value representation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row(pub Vec<Option<String>>);

impl Row {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).and_then(|v| v.as_deref())
    }
}

/// The result of a DML statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Warnings raised by the server for the statement just executed,
    /// fetched the way the copier needs them (`SHOW WARNINGS`).
    pub warning_count: u32,
}

/// A warning surfaced by `SHOW WARNINGS` after a DML statement.
#[derive(Debug, Clone)]
pub struct SqlWarning {
    pub level: String,
    pub code: u16,
    pub message: String,
}

/// Blocking SQL access, narrow enough to be mocked in tests and backed by
/// a real driver in production. A single `Executor` represents one logical
/// session; transactions are modeled explicitly via `begin`/`commit`/
/// `rollback` rather than an owned guard type, because the core needs to
/// hold a transaction open across several statements (see `copier::Copier`).
pub trait Executor: Send + Sync {
    fn query(&self, sql: &str) -> OscResult<Vec<Row>>;
    fn execute(&self, sql: &str) -> OscResult<ExecResult>;
    fn warnings(&self) -> OscResult<Vec<SqlWarning>>;

    fn begin(&self) -> OscResult<()>;
    fn commit(&self) -> OscResult<()>;
    fn rollback(&self) -> OscResult<()>;

    /// A fresh logical session against the same server, used for the
    /// metadata lock and the table read lock, which must outlive and be
    /// independent of the executor driving chunk copy.
    fn clone_session(&self) -> OscResult<Box<dyn Executor>>;
}

/// Returns true for the mixed set of SQL error conditions the copier, the
/// replay engine flush and the cutover lock should retry rather than fail
/// immediately: lock-wait timeout, deadlock, and connection-reset classes.
/// Centralized here rather than duplicated at each call site.
pub fn is_retryable_mysql_error(err: &SqlError) -> bool {
    const LOCK_WAIT_TIMEOUT: u16 = 1205;
    const DEADLOCK: u16 = 1213;
    const LOCK_TIMEOUT_ALT: u16 = 3572; // LOCK_NOWAIT-style timeouts on newer servers
    match err.code {
        Some(LOCK_WAIT_TIMEOUT | DEADLOCK | LOCK_TIMEOUT_ALT) => true,
        _ => {
            let m = err.message.to_ascii_lowercase();
            m.contains("lock wait timeout")
                || m.contains("deadlock")
                || m.contains("connection reset")
                || m.contains("broken pipe")
                || m.contains("connection refused")
        }
    }
}

/// Retries `f` with capped exponential backoff while it returns a
/// retryable `OscError`, up to `max_retries` attempts total.
pub fn with_retry<T>(
    max_retries: u32,
    base_backoff: std::time::Duration,
    mut f: impl FnMut() -> OscResult<T>,
) -> OscResult<T> {
    let mut attempt = 0;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && attempt + 1 < max_retries => {
                attempt += 1;
                let backoff = base_backoff * 2u32.pow(attempt.min(6));
                tracing::warn!(attempt, ?backoff, "retrying after transient error: {e}");
                std::thread::sleep(backoff);
            }
            Err(e) if e.is_retryable() => {
                return Err(OscError::RetryBudgetExhausted { attempts: attempt + 1, source: Box::new(e) });
            }
            Err(e) => return Err(e),
        }
    }
}

/// An in-memory `Executor` used by the unit test suite in place of a live
/// MySQL server. It supports exactly the operations the core issues:
/// `INSERT ... SELECT`, `REPLACE INTO ... SELECT ... WHERE pk IN (...)`,
/// `DELETE ... WHERE pk IN (...)`, `SELECT`, `RENAME TABLE`, `DROP TABLE`,
/// and simple scripted warnings/errors for exercising failure paths.
pub struct MockExecutor {
    pub name: String,
    /// Errors consumed in FIFO order by the next `query`/`execute` calls;
    /// once empty, calls succeed.
    queued_errors: Mutex<std::collections::VecDeque<SqlError>>,
    /// Row sets consumed in FIFO order by the next `query` calls that don't
    /// hit a queued error first; once empty, `query` returns no rows.
    queued_rows: Mutex<std::collections::VecDeque<Vec<Row>>>,
    pub executed: Mutex<Vec<String>>,
    lock_counter: AtomicU64,
}

impl MockExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        MockExecutor {
            name: name.into(),
            queued_errors: Mutex::new(std::collections::VecDeque::new()),
            queued_rows: Mutex::new(std::collections::VecDeque::new()),
            executed: Mutex::new(Vec::new()),
            lock_counter: AtomicU64::new(0),
        }
    }

    pub fn queue_error(&self, err: SqlError) {
        self.queued_errors.lock().unwrap().push_back(err);
    }

    pub fn queue_rows(&self, rows: Vec<Row>) {
        self.queued_rows.lock().unwrap().push_back(rows);
    }
}

impl Executor for MockExecutor {
    fn query(&self, sql: &str) -> OscResult<Vec<Row>> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(e) = self.queued_errors.lock().unwrap().pop_front() {
            return Err(e.into());
        }
        Ok(self.queued_rows.lock().unwrap().pop_front().unwrap_or_default())
    }

    fn execute(&self, sql: &str) -> OscResult<ExecResult> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(e) = self.queued_errors.lock().unwrap().pop_front() {
            return Err(e.into());
        }
        self.lock_counter.fetch_add(1, Ordering::Relaxed);
        Ok(ExecResult { rows_affected: 0, warning_count: 0 })
    }

    fn warnings(&self) -> OscResult<Vec<SqlWarning>> {
        Ok(Vec::new())
    }

    fn begin(&self) -> OscResult<()> {
        self.executed.lock().unwrap().push("BEGIN".to_string());
        Ok(())
    }

    fn commit(&self) -> OscResult<()> {
        self.executed.lock().unwrap().push("COMMIT".to_string());
        Ok(())
    }

    fn rollback(&self) -> OscResult<()> {
        self.executed.lock().unwrap().push("ROLLBACK".to_string());
        Ok(())
    }

    fn clone_session(&self) -> OscResult<Box<dyn Executor>> {
        Ok(Box::new(MockExecutor::new(self.name.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn retryable_error_codes() {
        assert!(is_retryable_mysql_error(&SqlError::new(1205, "Lock wait timeout exceeded")));
        assert!(is_retryable_mysql_error(&SqlError::new(1213, "Deadlock found")));
        assert!(!is_retryable_mysql_error(&SqlError::new(1264, "Out of range value")));
    }

    #[test]
    fn retryable_message_sniffing() {
        assert!(is_retryable_mysql_error(&SqlError::message("connection reset by peer")));
        assert!(!is_retryable_mysql_error(&SqlError::message("Data truncated for column")));
    }

    #[test]
    fn with_retry_exhausts_budget() {
        let attempts = Mutex::new(0);
        let result: OscResult<()> = with_retry(3, Duration::from_millis(1), || {
            *attempts.lock().unwrap() += 1;
            Err(OscError::Retryable("lock wait timeout".into()))
        });
        assert!(matches!(result, Err(OscError::RetryBudgetExhausted { attempts: 3, .. })));
        assert_eq!(*attempts.lock().unwrap(), 3);
    }

    #[test]
    fn with_retry_succeeds_eventually() {
        let attempts = Mutex::new(0);
        let result = with_retry(5, Duration::from_millis(1), || {
            let mut a = attempts.lock().unwrap();
            *a += 1;
            if *a < 3 {
                Err(OscError::Retryable("deadlock".into()))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
    }
}
