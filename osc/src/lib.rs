//! `osc`: the core online schema-change engine.
//!
//! Three tightly coupled subsystems provide the safety and liveness
//! guarantees of an online `ALTER TABLE`:
//!
//! - [`chunker`] (C1-C3): discovers the table, represents primary-key
//!   values, and divides the table into bounded key ranges for parallel
//!   copy, with a low-watermark protocol for resume.
//! - [`copier`] (C4) drives the chunker with a worker pool.
//! - [`repl`] (C5) tails the binlog and replays a compacted delta set onto
//!   the shadow table.
//!
//! [`metadata_lock`] (C6) and [`cutover`] (C7) provide the distributed
//! lock and the atomic rename that round out a full run, orchestrated by
//! [`runner`]. Everything the core treats as an external collaborator
//! (the SQL driver, the binlog wire parser, throttling policy, preflight
//! checks, checksum verification) is given a narrow trait boundary here
//! ([`db::Executor`], [`repl::BinlogEventSource`], [`throttle::Throttler`],
//! [`preflight`], [`checksum`]) so the core stays independently testable.

pub mod checkpoint;
pub mod checksum;
pub mod chunker;
pub mod copier;
pub mod cutover;
pub mod datum;
pub mod db;
pub mod error;
pub mod metadata_lock;
pub mod preflight;
pub mod repl;
pub mod runner;
pub mod table_info;
pub mod throttle;

pub use error::{OscError, OscResult};
pub use runner::{Runner, RunnerConfig};
