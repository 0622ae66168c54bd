//! The Runner: owns the lifetime of every component (C1-C7) across one
//! end-to-end migration. None of the core's state is process-global; a
//! `Runner` is constructed fresh per invocation and nothing it touches
//! outlives it except what is explicitly persisted (the checkpoint table).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::checkpoint;
use crate::checksum;
use crate::chunker::{self, Chunker};
use crate::copier::Copier;
use crate::cutover::CutOver;
use crate::db::Executor;
use crate::error::{OscError, OscResult};
use crate::metadata_lock::MetadataLock;
use crate::preflight::{self, PreflightContext};
use crate::repl::{BinlogEventSource, Client as ReplClient};
use crate::table_info::TableInfo;
use crate::throttle::{NoopThrottler, Throttler};

/// The cancellation/deadline handle threaded through a run. Cheap to
/// clone; every blocking call checks `is_cancelled()` at natural
/// suspension points (the Concurrency & Resource Model's "suspension
/// points"), the analogue of Go's `context.Context` in the source this
/// design is adapted from.
#[derive(Clone)]
pub struct RunContext {
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new() -> Self {
        RunContext { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> OscResult<()> {
        if self.is_cancelled() {
            Err(OscError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the Runner needs to drive one migration, analogous to the
/// CLI-surface options in the external interfaces section, minus the
/// parts (DSN parsing, logging setup) that live in `osc_cli`.
pub struct RunnerConfig {
    pub schema: String,
    pub table: String,
    pub alter_statement: String,
    pub concurrency: usize,
    pub checksum_concurrency: usize,
    pub target_chunk_time: Duration,
    pub checksum_enabled: bool,
    pub keep_old_table: bool,
    pub disable_dynamic_chunker: bool,
    pub key_above_watermark_optimization: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            schema: String::new(),
            table: String::new(),
            alter_statement: String::new(),
            concurrency: 4,
            checksum_concurrency: 4,
            target_chunk_time: Duration::from_secs(2),
            checksum_enabled: true,
            keep_old_table: false,
            disable_dynamic_chunker: false,
            key_above_watermark_optimization: true,
        }
    }
}

/// Owns C1-C7 end to end: preflight, schema discovery, the metadata lock,
/// the concurrent copy/replay phase, checksum verification, and cutover.
pub struct Runner {
    config: RunnerConfig,
    db: Arc<dyn Executor>,
    throttler: Arc<dyn Throttler>,
}

impl Runner {
    pub fn new(config: RunnerConfig, db: Arc<dyn Executor>) -> Self {
        Runner { config, db, throttler: Arc::new(NoopThrottler) }
    }

    pub fn set_throttler(&mut self, throttler: Arc<dyn Throttler>) {
        self.throttler = throttler;
    }

    fn new_table_name(&self) -> String {
        format!("_{}_new", self.config.table)
    }

    /// Runs the full migration: preflight, shadow table creation, attach
    /// the chunker, acquire the metadata lock, drive C4/C5 concurrently,
    /// checksum, then cut over.
    pub fn run(&self, ctx: &RunContext, binlog_source: Box<dyn BinlogEventSource>) -> OscResult<()> {
        self.run_preflight()?;

        let old_table = Arc::new(self.discover_old_table()?);
        self.create_shadow_table()?;
        let new_table = Arc::new(self.discover_new_table()?);

        let checkpoint_store = checkpoint::Store::new(&self.config.schema, &self.config.table);
        checkpoint_store.ensure_table(self.db.as_ref())?;
        let resume = checkpoint_store.load(self.db.as_ref())?;

        let chunker: Arc<dyn Chunker> = Arc::from(chunker::attach(
            old_table.clone(),
            self.db.clone(),
            self.config.target_chunk_time,
            self.config.disable_dynamic_chunker,
        )?);
        match &resume {
            Some(cp) => chunker.open_at_watermark(&cp.chunk.to_json()?)?,
            None => chunker.open()?,
        }

        let lock_name = format!("{}.{}", self.config.schema, self.config.table);
        let metadata_lock = MetadataLock::acquire(self.db.as_ref(), lock_name, Duration::from_secs(10))?;
        metadata_lock.start_refresh();

        let repl = Arc::new(ReplClient::new(old_table.clone(), new_table.clone(), self.db.clone(), binlog_source));
        repl.attach_chunker(chunker.clone());
        repl.set_key_above_watermark_optimization(self.config.key_above_watermark_optimization);
        if let Some(cp) = &resume {
            repl.set_pos(cp.binlog_position.clone());
        }
        repl.run()?;
        repl.block_wait()?;

        // `INSERT IGNORE` is used iff checksumming is enabled: a legitimate
        // resume can re-copy a key the replay engine already applied, and
        // the checksum pass is what catches a genuinely bad duplicate. With
        // checksumming off there is no later net to catch a real unique-key
        // violation, so it must abort the chunk instead of silently
        // swallowing it.
        let mut copier = Copier::new(
            old_table.clone(),
            new_table.clone(),
            self.db.clone(),
            chunker.clone(),
            self.config.concurrency,
            self.config.checksum_enabled,
        )?;
        copier.set_throttler(self.throttler.clone());

        let copy_result = copier.run();

        // Persist a checkpoint regardless of outcome: a failed or
        // cancelled run should still be resumable from wherever it got to.
        if let Ok(watermark) = chunker.low_watermark() {
            let cp = checkpoint::build(&watermark, repl.get_binlog_apply_position())?;
            checkpoint_store.save(self.db.as_ref(), &cp)?;
        }

        if let Err(e) = copy_result {
            repl.stop()?;
            metadata_lock.release()?;
            return Err(e);
        }

        ctx.check()?;

        if self.config.checksum_enabled {
            if let Err(e) = self.run_checksum(old_table.clone(), new_table.clone()) {
                repl.stop()?;
                metadata_lock.release()?;
                return Err(e);
            }
        }

        let cutover = CutOver::new(old_table, new_table, self.db.clone(), repl.clone(), self.config.keep_old_table);
        let cutover_result = cutover.run();

        repl.stop()?;
        checkpoint_store.drop_table(self.db.as_ref())?;
        metadata_lock.release()?;

        cutover_result
    }

    fn run_preflight(&self) -> OscResult<()> {
        let preflight_ctx = PreflightContext {
            db: self.db.as_ref(),
            schema: self.config.schema.clone(),
            table: self.config.table.clone(),
            alter_statement: self.config.alter_statement.clone(),
        };
        preflight::run_all(&preflight_ctx)
    }

    fn discover_old_table(&self) -> OscResult<TableInfo> {
        let mut t = TableInfo::new(&self.config.schema, &self.config.table);
        t.run_discovery(self.db.as_ref())?;
        Ok(t)
    }

    fn discover_new_table(&self) -> OscResult<TableInfo> {
        let mut t = TableInfo::new(&self.config.schema, self.new_table_name());
        t.run_discovery(self.db.as_ref())?;
        Ok(t)
    }

    /// `CREATE TABLE shadow LIKE source`, then applies the user's ALTER to
    /// the shadow only. `ALGORITHM=INPLACE` is attempted first by the
    /// caller-supplied alter statement's own clauses when
    /// `attempt_inplace_ddl` is set at the CLI layer; this method only
    /// issues the two DDL statements, it does not retry with a different
    /// algorithm itself.
    fn create_shadow_table(&self) -> OscResult<()> {
        let new_name = format!("`{}`.`{}`", self.config.schema, self.new_table_name());
        let old_name = format!("`{}`.`{}`", self.config.schema, self.config.table);
        self.db.execute(&format!("DROP TABLE IF EXISTS {new_name}"))?;
        self.db.execute(&format!("CREATE TABLE {new_name} LIKE {old_name}"))?;
        self.db.execute(&format!("ALTER TABLE {new_name} {}", self.config.alter_statement))?;
        Ok(())
    }

    fn run_checksum(&self, old_table: Arc<TableInfo>, new_table: Arc<TableInfo>) -> OscResult<()> {
        let chunks = self.checksum_chunks(&old_table);
        checksum::verify(old_table, new_table, self.db.clone(), chunks, self.config.checksum_concurrency)
    }

    /// A coarse chunking pass purely for checksum locality: splits
    /// `[min_value, max_value]` into fixed-size ranges along the leading
    /// key column. Unlike the copier's chunker, this never needs adaptive
    /// sizing or resume, so it is kept as a simple standalone helper
    /// rather than reusing `Chunker`.
    fn checksum_chunks(&self, table: &TableInfo) -> Vec<crate::table_info::Chunk> {
        use crate::table_info::{Boundary, Chunk};
        const CHECKSUM_CHUNK_SIZE: u64 = 50_000;

        let (Some(min), Some(max)) = (table.min_value(), table.max_value()) else {
            return vec![Chunk { key: table.key_columns[0].clone(), lower_bound: None, upper_bound: None, chunk_size: CHECKSUM_CHUNK_SIZE }];
        };

        let mut chunks = Vec::new();
        let mut ptr = min;
        loop {
            let next = ptr.add(CHECKSUM_CHUNK_SIZE);
            if next.greater_than_or_equal(&max) {
                chunks.push(Chunk {
                    key: table.key_columns[0].clone(),
                    lower_bound: if chunks.is_empty() { None } else { Some(Boundary::new(ptr, true)) },
                    upper_bound: None,
                    chunk_size: CHECKSUM_CHUNK_SIZE,
                });
                break;
            }
            chunks.push(Chunk {
                key: table.key_columns[0].clone(),
                lower_bound: if chunks.is_empty() { None } else { Some(Boundary::new(ptr.clone(), true)) },
                upper_bound: Some(Boundary::new(next.clone(), false)),
                chunk_size: CHECKSUM_CHUNK_SIZE,
            });
            ptr = next;
        }
        chunks
    }
}
