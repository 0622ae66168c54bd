//! The JSON checkpoint: a low-watermark `Chunk` plus the replication
//! replay engine's last-applied binlog position, persisted to a dedicated
//! `_<table>_chkpnt` table so an interrupted run can resume.

use serde::{Deserialize, Serialize};

use crate::db::Executor;
use crate::error::{OscError, OscResult};
use crate::repl::BinlogPosition;
use crate::table_info::Chunk;

/// The persisted checkpoint shape. `chunk` carries its own `chunk_size`,
/// so there is no separate field for it here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub binlog_position: BinlogPosition,
}

impl Checkpoint {
    pub fn to_json(&self) -> OscResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> OscResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Creates the checkpoint table if missing and reads/writes its single
/// row (`id = 1`). A single row is sufficient: only one run is ever
/// active against a given table at a time, enforced by the metadata lock.
pub struct Store {
    table_name: String,
}

impl Store {
    pub fn new(schema: &str, table: &str) -> Self {
        Store { table_name: format!("`{schema}`.`_{table}_chkpnt`") }
    }

    pub fn ensure_table(&self, db: &dyn Executor) -> OscResult<()> {
        db.execute(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id INT PRIMARY KEY, checkpoint JSON NOT NULL, updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP)",
            self.table_name
        ))?;
        Ok(())
    }

    pub fn load(&self, db: &dyn Executor) -> OscResult<Option<Checkpoint>> {
        let rows = db.query(&format!("SELECT checkpoint FROM {} WHERE id = 1", self.table_name))?;
        match rows.into_iter().next().and_then(|r| r.get(0).map(str::to_string)) {
            Some(json) => Ok(Some(Checkpoint::from_json(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, db: &dyn Executor, checkpoint: &Checkpoint) -> OscResult<()> {
        let json = checkpoint.to_json()?;
        let escaped = json.replace('\\', "\\\\").replace('\'', "''");
        db.execute(&format!(
            "INSERT INTO {} (id, checkpoint) VALUES (1, '{}') ON DUPLICATE KEY UPDATE checkpoint = VALUES(checkpoint)",
            self.table_name, escaped
        ))?;
        Ok(())
    }

    pub fn drop_table(&self, db: &dyn Executor) -> OscResult<()> {
        db.execute(&format!("DROP TABLE IF EXISTS {}", self.table_name))?;
        Ok(())
    }
}

/// Builds a `Checkpoint` from the chunker's current low watermark and the
/// replay engine's last-applied binlog position. Returns
/// `OscError::InvariantViolation` if the chunker has not advanced its
/// watermark yet (nothing to checkpoint).
pub fn build(low_watermark_json: &str, binlog_position: BinlogPosition) -> OscResult<Checkpoint> {
    let chunk = Chunk::from_json(low_watermark_json)
        .map_err(|_| OscError::InvariantViolation("low watermark is not a valid chunk".into()))?;
    Ok(Checkpoint { chunk, binlog_position })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::Datum;
    use crate::db::MockExecutor;
    use crate::table_info::Boundary;

    fn sample() -> Checkpoint {
        Checkpoint {
            chunk: Chunk {
                key: "a".into(),
                lower_bound: Some(Boundary::new(Datum::Signed(1), true)),
                upper_bound: Some(Boundary::new(Datum::Signed(1001), false)),
                chunk_size: 1000,
            },
            binlog_position: BinlogPosition::new("mysql-bin.000005", 4123),
        }
    }

    #[test]
    fn json_roundtrip() {
        let c = sample();
        let json = c.to_json().unwrap();
        let back = Checkpoint::from_json(&json).unwrap();
        assert_eq!(back.to_json().unwrap(), json);
    }

    #[test]
    fn store_round_trips_through_a_mock_executor() {
        let db = MockExecutor::new("db");
        let store = Store::new("test", "t1");
        store.ensure_table(&db).unwrap();
        assert!(store.load(&db).unwrap().is_none());
        store.save(&db, &sample()).unwrap();
        // MockExecutor doesn't persist rows, only records executed SQL; the
        // real assertion here is that save/ensure issue well-formed SQL.
        assert!(db.executed.lock().unwrap().iter().any(|s| s.contains("ON DUPLICATE KEY UPDATE")));
    }

    #[test]
    fn build_wraps_chunk_and_position() {
        let chunk = Chunk { key: "a".into(), lower_bound: None, upper_bound: Some(Boundary::new(Datum::Signed(1), false)), chunk_size: 1000 };
        let cp = build(&chunk.to_json().unwrap(), BinlogPosition::new("f", 1)).unwrap();
        assert_eq!(cp.chunk.to_string(), "a < 1");
    }
}
