//! C5: the replication replay engine. While the copier walks the table in
//! chunks, a background thread tails the binlog for the same table and
//! accumulates a last-write-wins delta set keyed by primary key, so that
//! writes racing the copy are not lost. `flush` periodically (and
//! `flush_until_trivial` at cutover) applies the accumulated deltas to the
//! new table.
//!
//! The binlog wire protocol itself is out of scope here; `BinlogEventSource`
//! is the narrow boundary this module consumes, mirroring how `db::Executor`
//! stands in for the raw MySQL driver.

mod client;
pub(crate) mod delta;

pub use client::Client;
pub use delta::{BinlogEvent, BinlogEventSource, BinlogPosition, DeltaTag, RowImage};

#[cfg(test)]
pub use delta::MockEventSource;
