//! Production wiring for the replication replay engine's binlog source.
//!
//! Decoding `connection::binlog::binlog_subscribe::BinlogSubscribe`'s event
//! stream into the `RowImage`/`DeltaTag` shape `osc::repl` consumes needs
//! column-type-aware row unpacking that belongs to the `binlog` crate, not
//! this CLI, and is not wired up yet. Rather than silently produce an
//! event-free source (which would look like a successful tail that never
//! saw a write), `next_event` fails loudly so a real run surfaces the gap
//! instead of masking it, the same way
//! `connection::conn::connection::Connection::start`/`shutdown` are
//! themselves left as `todo!()` in the teacher crate.

use osc::error::{OscError, OscResult};
use osc::repl::{BinlogEvent, BinlogEventSource, BinlogPosition};

pub struct BinlogSubscribeEventSource {
    position: BinlogPosition,
}

impl BinlogSubscribeEventSource {
    pub fn new() -> Self {
        BinlogSubscribeEventSource { position: BinlogPosition::default() }
    }
}

impl BinlogEventSource for BinlogSubscribeEventSource {
    fn next_event(&mut self) -> OscResult<Option<BinlogEvent>> {
        Err(OscError::config(
            "binlog production adapter is not wired up yet; BinlogSubscribeEventSource only carries connection setup",
        ))
    }

    fn seek(&mut self, pos: &BinlogPosition) -> OscResult<()> {
        self.position = pos.clone();
        Ok(())
    }

    fn position(&self) -> BinlogPosition {
        self.position.clone()
    }
}
