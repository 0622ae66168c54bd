//! The delta set: a last-write-wins map, keyed by primary key string, of
//! row changes observed on the source table while the copier is running.
//! Storing the full row image (rather than just the key) means a flush
//! never has to re-query the source table for a row that may have since
//! changed again or been deleted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::OscResult;

/// A binlog file/position pair. Mirrors `binlog::events::log_position::LogPosition`;
/// kept as its own type here so the replay engine's public surface doesn't
/// leak the binlog crate's internal event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BinlogPosition {
    pub file_name: String,
    pub position: u64,
}

impl BinlogPosition {
    pub fn new(file_name: impl Into<String>, position: u64) -> Self {
        BinlogPosition { file_name: file_name.into(), position }
    }

    /// True if `self` is at or past `target` in binlog order. An empty
    /// `target.file_name` means no server position is known (nothing to
    /// wait for), so it vacuously holds. Binlog file names are a constant
    /// prefix plus a zero-padded sequence number, so string comparison
    /// agrees with file creation order; positions within the same file are
    /// compared numerically.
    pub fn is_at_least(&self, target: &BinlogPosition) -> bool {
        if target.file_name.is_empty() {
            return true;
        }
        match self.file_name.cmp(&target.file_name) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.position >= target.position,
        }
    }
}

impl std::fmt::Display for BinlogPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file_name, self.position)
    }
}

/// One row's full column values, in `TableInfo::columns` order.
pub type RowImage = Vec<Option<String>>;

/// A pending change to one row, keyed by its primary key string.
/// `Delete` still carries the last-known image so the flush path can
/// extract the key tuple without a second lookup; the image itself is
/// otherwise unused for a delete.
#[derive(Debug, Clone)]
pub enum DeltaTag {
    Upsert(RowImage),
    Delete(RowImage),
}

/// One row-level change surfaced by the binlog. `table`/`schema` let a
/// single `BinlogEventSource` be shared across tables the caller isn't
/// replaying; the `Client` filters on them.
#[derive(Debug, Clone)]
pub struct BinlogEvent {
    pub schema: String,
    pub table: String,
    pub position: BinlogPosition,
    pub tag: DeltaTag,
}

/// The narrow boundary the replay engine consumes the binlog stream
/// through. The wire protocol, GTID handling and row-format decoding live
/// in the `binlog` crate; this trait is the seam, mirroring how
/// `db::Executor` stands in for the raw MySQL driver.
pub trait BinlogEventSource: Send {
    /// Blocks until the next row event is available, or returns `Ok(None)`
    /// if the source has been closed (e.g. the run was cancelled).
    fn next_event(&mut self) -> OscResult<Option<BinlogEvent>>;

    /// Seeks the stream to resume from `pos`. Returns an error if `pos`
    /// refers to a file/position the server can no longer serve (purged by
    /// `expire_logs_days`, or never existed).
    fn seek(&mut self, pos: &BinlogPosition) -> OscResult<()>;

    /// The position of the last event returned by `next_event`, or the
    /// position passed to the most recent `seek` if nothing has been read
    /// yet.
    fn position(&self) -> BinlogPosition;
}

/// The in-memory delta set itself, shared between the tailing thread and
/// whichever thread calls `flush`.
#[derive(Default)]
pub struct DeltaSet {
    inner: Mutex<HashMap<String, DeltaTag>>,
}

impl DeltaSet {
    pub fn new() -> Self {
        DeltaSet { inner: Mutex::new(HashMap::new()) }
    }

    pub fn insert(&self, key: String, tag: DeltaTag) {
        self.inner.lock().unwrap().insert(key, tag);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains up to `batch_size` entries for a flush batch, removing them
    /// from the set. Entries inserted concurrently (by the tailing thread,
    /// racing a row the flush itself is about to apply) are left alone;
    /// they'll be picked up by the next flush.
    pub fn drain_batch(&self, batch_size: usize) -> Vec<(String, DeltaTag)> {
        let mut guard = self.inner.lock().unwrap();
        let keys: Vec<String> = guard.keys().take(batch_size).cloned().collect();
        keys.into_iter().filter_map(|k| guard.remove(&k).map(|v| (k, v))).collect()
    }
}

/// A scripted, in-memory `BinlogEventSource` for tests. Events are queued
/// with `push`; `next_event` blocks (briefly, via a condvar) until one is
/// available or `close` is called.
#[cfg(test)]
pub struct MockEventSource {
    events: Arc<Mutex<std::collections::VecDeque<BinlogEvent>>>,
    closed: Arc<std::sync::atomic::AtomicBool>,
    current: Mutex<BinlogPosition>,
    /// Positions `seek` should reject, simulating a purged/impossible
    /// resume point.
    unseekable: std::collections::HashSet<String>,
}

#[cfg(test)]
impl MockEventSource {
    pub fn new() -> Self {
        MockEventSource {
            events: Arc::new(Mutex::new(std::collections::VecDeque::new())),
            closed: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            current: Mutex::new(BinlogPosition::default()),
            unseekable: std::collections::HashSet::new(),
        }
    }

    pub fn push(&self, event: BinlogEvent) {
        self.events.lock().unwrap().push_back(event);
    }

    pub fn reject_seek_to(mut self, pos: &BinlogPosition) -> Self {
        self.unseekable.insert(pos.to_string());
        self
    }

    pub fn close(&self) {
        self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// A cloneable handle sharing this source's queue, so a test can keep
    /// pushing/closing after the `MockEventSource` itself has been moved
    /// into a `Client` as a boxed trait object.
    pub fn handle(&self) -> MockEventSourceHandle {
        MockEventSourceHandle { events: self.events.clone(), closed: self.closed.clone() }
    }
}

#[cfg(test)]
pub struct MockEventSourceHandle {
    events: Arc<Mutex<std::collections::VecDeque<BinlogEvent>>>,
    closed: Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(test)]
impl MockEventSourceHandle {
    pub fn push(&self, event: BinlogEvent) {
        self.events.lock().unwrap().push_back(event);
    }

    pub fn close(&self) {
        self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl BinlogEventSource for MockEventSource {
    fn next_event(&mut self) -> OscResult<Option<BinlogEvent>> {
        loop {
            if let Some(ev) = self.events.lock().unwrap().pop_front() {
                *self.current.lock().unwrap() = ev.position.clone();
                return Ok(Some(ev));
            }
            if self.closed.load(std::sync::atomic::Ordering::SeqCst) {
                return Ok(None);
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    fn seek(&mut self, pos: &BinlogPosition) -> OscResult<()> {
        if self.unseekable.contains(&pos.to_string()) {
            return Err(crate::error::OscError::config(format!(
                "binlog position {pos} is no longer available on the server"
            )));
        }
        *self.current.lock().unwrap() = pos.clone();
        Ok(())
    }

    fn position(&self) -> BinlogPosition {
        self.current.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_set_last_write_wins() {
        let set = DeltaSet::new();
        set.insert("a=1".into(), DeltaTag::Upsert(vec![Some("1".into())]));
        set.insert("a=1".into(), DeltaTag::Delete(vec![Some("1".into())]));
        assert_eq!(set.len(), 1);
        let batch = set.drain_batch(10);
        assert!(matches!(batch[0].1, DeltaTag::Delete(_)));
    }

    #[test]
    fn drain_batch_respects_cap() {
        let set = DeltaSet::new();
        for i in 0..5 {
            set.insert(format!("a={i}"), DeltaTag::Upsert(vec![Some(i.to_string())]));
        }
        let batch = set.drain_batch(2);
        assert_eq!(batch.len(), 2);
        assert_eq!(set.len(), 3);
    }
}
