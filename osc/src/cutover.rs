//! C7: the cutover coordinator. The finite sequence of locking, draining
//! and renaming steps that atomically swaps the source and shadow tables.
//! Everything before this point (copy, replay) is approximate and
//! overlapping; cutover is the strict happens-before fence that makes the
//! swap safe.

use std::sync::Arc;
use std::time::Duration;

use crate::db::Executor;
use crate::error::{OscError, OscResult};
use crate::repl::Client as ReplClient;
use crate::table_info::TableInfo;

/// Bounded retries for acquiring the short table-read-lock at the start
/// of cutover: ~5 attempts at 3s apiece, matching the source's own
/// `MDL_LOCK_WAIT_TIMEOUT`-style budget.
const LOCK_ACQUIRE_ATTEMPTS: u32 = 5;
const LOCK_ACQUIRE_BACKOFF: Duration = Duration::from_secs(3);

pub struct CutOver {
    old_table: Arc<TableInfo>,
    new_table: Arc<TableInfo>,
    db: Arc<dyn Executor>,
    repl: Arc<ReplClient>,
    keep_old_table: bool,
    lock_wait_backoff: Duration,
}

impl CutOver {
    pub fn new(old_table: Arc<TableInfo>, new_table: Arc<TableInfo>, db: Arc<dyn Executor>, repl: Arc<ReplClient>, keep_old_table: bool) -> Self {
        CutOver { old_table, new_table, db, repl, keep_old_table, lock_wait_backoff: LOCK_ACQUIRE_BACKOFF }
    }

    /// Overrides the backoff between table-lock acquisition retries.
    /// Exposed mainly so tests can exercise the retry-exhaustion path
    /// without sleeping for real.
    pub fn set_lock_wait_backoff(&mut self, backoff: Duration) {
        self.lock_wait_backoff = backoff;
    }

    /// Runs the full protocol. Precondition: the caller has already
    /// confirmed the copier has read every chunk.
    pub fn run(&self) -> OscResult<()> {
        self.repl.flush_until_trivial()?;

        self.with_table_lock(|| {
            self.repl.block_wait()?;
            self.repl.flush()?;
            self.rename()?;
            Ok(())
        })?;

        if !self.keep_old_table {
            let old_name = self.old_table_alias();
            // Best-effort: the rename already succeeded, so a failure to
            // drop the renamed-away original is not itself a cutover
            // failure, just something the operator should clean up.
            if let Err(e) = self.db.execute(&format!("DROP TABLE {old_name}")) {
                tracing::warn!("failed to drop {old_name} after cutover: {e}");
            }
        }
        Ok(())
    }

    fn old_table_alias(&self) -> String {
        format!("`{}`.`{}_old`", self.old_table.schema, self.old_table.name)
    }

    /// Acquires `LOCK TABLES source READ, shadow WRITE`, runs `body`, then
    /// always releases the lock, retrying acquisition on a bounded budget
    /// of retryable failures (e.g. a concurrent `SELECT ... FOR UPDATE`
    /// holding the row).
    fn with_table_lock(&self, body: impl FnOnce() -> OscResult<()>) -> OscResult<()> {
        let mut attempt = 0;
        loop {
            let lock_sql = format!(
                "LOCK TABLES {} READ, {} WRITE",
                self.old_table.quoted_name(),
                self.new_table.quoted_name()
            );
            match self.db.execute(&lock_sql) {
                Ok(_) => break,
                Err(e) if e.is_retryable() && attempt + 1 < LOCK_ACQUIRE_ATTEMPTS => {
                    attempt += 1;
                    tracing::warn!(attempt, "cutover table lock attempt failed, retrying: {e}");
                    std::thread::sleep(self.lock_wait_backoff);
                }
                Err(e) => return Err(OscError::CutoverFailed(e.to_string())),
            }
        }

        let result = body();

        // Always release, even if `body` failed, so a partial cutover
        // doesn't leave the source permanently locked out from other
        // sessions; the operator still has to reconcile the error itself.
        if let Err(e) = self.db.execute("UNLOCK TABLES") {
            tracing::warn!("failed to release cutover table lock: {e}");
        }

        result
    }

    fn rename(&self) -> OscResult<()> {
        let sql = format!(
            "RENAME TABLE {} TO {}, {} TO {}",
            self.old_table.quoted_name(),
            self.old_table_alias(),
            self.new_table.quoted_name(),
            self.old_table.quoted_name(),
        );
        self.db.execute(&sql).map_err(|e| {
            OscError::CutoverFailed(format!("rename failed, original table is untouched: {e}"))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockExecutor;
    use crate::error::SqlError;
    use crate::repl::delta::MockEventSource;

    fn table(name: &str) -> Arc<TableInfo> {
        let mut t = TableInfo::new("test", name);
        t.columns = vec!["a".into(), "b".into()];
        t.key_columns = vec!["a".into()];
        t.set_key_metadata_for_test("int(11)", false);
        Arc::new(t)
    }

    fn repl_client(old: Arc<TableInfo>, new: Arc<TableInfo>) -> Arc<ReplClient> {
        let source = MockEventSource::new();
        source.close();
        let db: Arc<dyn Executor> = Arc::new(MockExecutor::new("dst"));
        let client = ReplClient::new(old, new, db, Box::new(source));
        client.run().unwrap();
        client.block_wait().unwrap();
        client.stop().unwrap();
        Arc::new(client)
    }

    #[test]
    fn happy_path_renames_and_drops_old() {
        let old = table("t1");
        let new = table("_t1_new");
        let repl = repl_client(old.clone(), new.clone());
        let db = Arc::new(MockExecutor::new("db"));
        let cutover = CutOver::new(old, new, db.clone() as Arc<dyn Executor>, repl, false);
        cutover.run().unwrap();

        let executed = db.executed.lock().unwrap().clone();
        assert!(executed.iter().any(|s| s.starts_with("RENAME TABLE")));
        assert!(executed.iter().any(|s| s.starts_with("DROP TABLE")));
    }

    #[test]
    fn keep_old_table_skips_the_drop() {
        let old = table("t1");
        let new = table("_t1_new");
        let repl = repl_client(old.clone(), new.clone());
        let db = Arc::new(MockExecutor::new("db"));
        let cutover = CutOver::new(old, new, db.clone() as Arc<dyn Executor>, repl, true);
        cutover.run().unwrap();
        assert!(!db.executed.lock().unwrap().iter().any(|s| s.starts_with("DROP TABLE")));
    }

    #[test]
    fn lock_wait_timeout_retries_then_fails_after_budget() {
        let old = table("t1");
        let new = table("_t1_new");
        let repl = repl_client(old.clone(), new.clone());
        let db = Arc::new(MockExecutor::new("db"));
        for _ in 0..LOCK_ACQUIRE_ATTEMPTS {
            db.queue_error(SqlError::new(1205, "Lock wait timeout exceeded"));
        }
        let mut cutover = CutOver::new(old, new, db as Arc<dyn Executor>, repl, true);
        cutover.set_lock_wait_backoff(Duration::from_millis(1));
        let err = cutover.run().unwrap_err();
        assert!(matches!(err, OscError::CutoverFailed(_)));
    }
}
