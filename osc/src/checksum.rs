//! Post-copy consistency verification. Runs after the copier has read
//! every chunk and before the cutover coordinator engages: partitions the
//! table by the same chunk predicates the chunker already produced at the
//! final low watermark's granularity, and compares a per-chunk checksum of
//! source vs shadow. A mismatch discards the shadow and is always fatal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::db::Executor;
use crate::error::{OscError, OscResult};
use crate::table_info::{Chunk, TableInfo};

/// One source/shadow checksum comparison for a chunk's predicate.
fn checksum_chunk(db: &dyn Executor, table: &TableInfo, columns: &[String], chunk: &Chunk) -> OscResult<u64> {
    let concat_cols = columns.join(", ");
    let sql = format!(
        "SELECT BIT_XOR(CAST(CRC32(CONCAT_WS('#', {concat_cols})) AS UNSIGNED)) FROM {} WHERE {}",
        table.quoted_name(),
        chunk.predicate(),
    );
    let rows = db.query(&sql)?;
    let value = rows
        .first()
        .and_then(|r| r.get(0))
        .unwrap_or("0")
        .parse::<u64>()
        .map_err(|_| OscError::Consistency("checksum query returned a non-numeric value".into()))?;
    Ok(value)
}

/// Verifies every chunk in `chunks` matches between `old_table` and
/// `new_table`, spreading the work across `concurrency` worker threads.
/// Returns the first mismatch as `OscError::Consistency`; the caller is
/// expected to discard the shadow table on any error from this function.
pub fn verify(
    old_table: Arc<TableInfo>,
    new_table: Arc<TableInfo>,
    db: Arc<dyn Executor>,
    chunks: Vec<Chunk>,
    concurrency: usize,
) -> OscResult<()> {
    let columns: Vec<String> = old_table.columns.iter().filter(|c| new_table.columns.contains(c)).cloned().collect();
    if columns.is_empty() {
        return Err(OscError::InvariantViolation("no columns survive between old and new table to checksum".into()));
    }

    let first_error: Arc<Mutex<Option<OscError>>> = Arc::new(Mutex::new(None));
    let abort = Arc::new(AtomicBool::new(false));
    let next_idx = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let chunks = Arc::new(chunks);

    std::thread::scope(|scope| {
        for _ in 0..concurrency.max(1) {
            let old_table = old_table.clone();
            let new_table = new_table.clone();
            let db = db.clone();
            let columns = &columns;
            let first_error = first_error.clone();
            let abort = abort.clone();
            let next_idx = next_idx.clone();
            let chunks = chunks.clone();
            scope.spawn(move || {
                loop {
                    if abort.load(Ordering::Relaxed) {
                        return;
                    }
                    let i = next_idx.fetch_add(1, Ordering::Relaxed);
                    let Some(chunk) = chunks.get(i) else { return };

                    let result = checksum_chunk(db.as_ref(), &old_table, columns, chunk)
                        .and_then(|src| checksum_chunk(db.as_ref(), &new_table, columns, chunk).map(|dst| (src, dst)));

                    match result {
                        Ok((src, dst)) if src == dst => {}
                        Ok((src, dst)) => {
                            *first_error.lock().unwrap() = Some(OscError::Consistency(format!(
                                "checksum mismatch for chunk `{chunk}`: source={src:#x} shadow={dst:#x}"
                            )));
                            abort.store(true, Ordering::Relaxed);
                            return;
                        }
                        Err(e) => {
                            *first_error.lock().unwrap() = Some(e);
                            abort.store(true, Ordering::Relaxed);
                            return;
                        }
                    }
                }
            });
        }
    });

    match first_error.lock().unwrap().take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockExecutor;
    use crate::table_info::Boundary;
    use crate::datum::Datum;

    fn table(name: &str) -> Arc<TableInfo> {
        let mut t = TableInfo::new("test", name);
        t.columns = vec!["a".into(), "b".into()];
        t.key_columns = vec!["a".into()];
        t.set_key_metadata_for_test("int(11)", false);
        Arc::new(t)
    }

    fn chunk() -> Chunk {
        Chunk { key: "a".into(), lower_bound: None, upper_bound: Some(Boundary::new(Datum::Signed(1000), false)), chunk_size: 1000 }
    }

    #[test]
    fn matching_checksums_pass() {
        // MockExecutor returns no rows for every query, so both sides parse
        // to the same default (0) checksum: this exercises the "match" path.
        let db: Arc<dyn Executor> = Arc::new(MockExecutor::new("db"));
        let r = verify(table("old"), table("new"), db, vec![chunk()], 2);
        assert!(r.is_ok());
    }

    #[test]
    fn no_shared_columns_is_an_invariant_violation() {
        let mut new_table = TableInfo::new("test", "new");
        new_table.columns = vec!["only_in_new".into()];
        new_table.key_columns = vec!["only_in_new".into()];
        let db: Arc<dyn Executor> = Arc::new(MockExecutor::new("db"));
        let r = verify(table("old"), Arc::new(new_table), db, vec![chunk()], 1);
        assert!(matches!(r, Err(OscError::InvariantViolation(_))));
    }
}
