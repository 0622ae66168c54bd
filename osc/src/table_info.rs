//! C1: `TableInfo`, an immutable schema snapshot plus slowly-varying
//! statistics, and the `Boundary`/`Chunk` shapes the chunker emits.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::datum::{mysql_type_to_datum_kind, Datum, DatumKind};
use crate::db::Executor;
use crate::error::{OscError, OscResult};

/// `(value, inclusive)` — one edge of a `Chunk`'s range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    pub value: Datum,
    pub inclusive: bool,
}

impl Boundary {
    pub fn new(value: Datum, inclusive: bool) -> Self {
        Boundary { value, inclusive }
    }
}

/// A half-open (or, per `inclusive`, closed) key range `[lower, upper)` of
/// the source table to be copied atomically by one worker. An absent
/// `lower_bound` denotes the first chunk; an absent `upper_bound` denotes
/// the final, unbounded chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub key: String,
    pub lower_bound: Option<Boundary>,
    pub upper_bound: Option<Boundary>,
    pub chunk_size: u64,
}

impl Chunk {
    /// Renders the chunk as the `WHERE` predicate the copier and the
    /// checksum stage issue, e.g. `a < 1`, `a >= 1 AND a < 1001`, `a >= 1001`.
    pub fn predicate(&self) -> String {
        match (&self.lower_bound, &self.upper_bound) {
            (None, None) => "1=1".to_string(),
            (None, Some(u)) => format!("{} {} {}", self.key, if u.inclusive { "<=" } else { "<" }, u.value),
            (Some(l), None) => format!("{} {} {}", self.key, if l.inclusive { ">=" } else { ">" }, l.value),
            (Some(l), Some(u)) => format!(
                "{} {} {} AND {} {} {}",
                self.key,
                if l.inclusive { ">=" } else { ">" },
                l.value,
                self.key,
                if u.inclusive { "<=" } else { "<" },
                u.value
            ),
        }
    }

    pub fn to_json(&self) -> OscResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> OscResult<Chunk> {
        Ok(serde_json::from_str(s)?)
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.predicate())
    }
}

/// Immutable schema snapshot plus slowly-varying statistics for one table.
/// Created once per table per run; `update_statistics` may refresh
/// `min_value`/`max_value`/`estimated_rows` periodically during long runs.
#[derive(Debug)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub columns: Vec<String>,
    pub key_columns: Vec<String>,
    key_mysql_type: RwLock<String>,
    key_is_auto_inc: RwLock<bool>,
    estimated_rows: RwLock<u64>,
    min_value: RwLock<Option<Datum>>,
    max_value: RwLock<Option<Datum>>,
}

impl TableInfo {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        TableInfo {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            key_columns: Vec::new(),
            key_mysql_type: RwLock::new(String::new()),
            key_is_auto_inc: RwLock::new(false),
            estimated_rows: RwLock::new(0),
            min_value: RwLock::new(None),
            max_value: RwLock::new(None),
        }
    }

    pub fn quoted_name(&self) -> String {
        format!("`{}`.`{}`", self.schema, self.name)
    }

    pub fn key_is_auto_inc(&self) -> bool {
        *self.key_is_auto_inc.read().unwrap()
    }

    pub fn estimated_rows(&self) -> u64 {
        *self.estimated_rows.read().unwrap()
    }

    pub fn key_datum_kind(&self) -> OscResult<DatumKind> {
        let ty = self.key_mysql_type.read().unwrap();
        mysql_type_to_datum_kind(&ty).ok_or_else(|| {
            OscError::config(format!("unsupported primary key type: {ty}"))
        })
    }

    pub fn min_value(&self) -> Option<Datum> {
        self.min_value.read().unwrap().clone()
    }

    pub fn max_value(&self) -> Option<Datum> {
        self.max_value.read().unwrap().clone()
    }

    /// Seeds the key type/auto-increment flag directly, bypassing
    /// `run_discovery`. Used by unit tests elsewhere in the crate that build
    /// a `TableInfo` by hand rather than against a live schema.
    pub(crate) fn set_key_metadata_for_test(&self, mysql_type: impl Into<String>, is_auto_inc: bool) {
        *self.key_mysql_type.write().unwrap() = mysql_type.into();
        *self.key_is_auto_inc.write().unwrap() = is_auto_inc;
    }

    /// Seeds discovered min/max bounds directly, bypassing `run_discovery`.
    /// Used by unit tests elsewhere in the crate.
    pub(crate) fn set_min_max_for_test(&self, min: Datum, max: Datum) {
        *self.min_value.write().unwrap() = Some(min);
        *self.max_value.write().unwrap() = Some(max);
    }

    /// Discovers columns, primary key, row estimate and min/max bounds via
    /// `information_schema` queries. Requires the primary key to exist and
    /// be binary-comparable; otherwise the table is rejected up front
    /// rather than failing later inside the chunker.
    pub fn run_discovery(&mut self, db: &dyn Executor) -> OscResult<()> {
        self.discover_row_estimate(db)?;
        self.discover_columns(db)?;
        self.discover_primary_key(db)?;
        self.check_primary_key_is_binary_comparable()?;
        self.discover_min_max(db)
    }

    fn discover_row_estimate(&self, db: &dyn Executor) -> OscResult<()> {
        db.execute(&format!("ANALYZE TABLE {}", self.quoted_name()))?;
        let rows = db.query(&format!(
            "SELECT IFNULL(table_rows,0) FROM information_schema.tables WHERE table_schema='{}' AND table_name='{}'",
            self.schema, self.name
        ))?;
        if let Some(row) = rows.first() {
            let n: u64 = row.get(0).unwrap_or("0").parse().unwrap_or(0);
            *self.estimated_rows.write().unwrap() = n;
        }
        Ok(())
    }

    fn discover_columns(&mut self, db: &dyn Executor) -> OscResult<()> {
        let rows = db.query(&format!(
            "SELECT column_name FROM information_schema.columns WHERE table_schema='{}' AND table_name='{}' ORDER BY ORDINAL_POSITION",
            self.schema, self.name
        ))?;
        self.columns = rows.iter().filter_map(|r| r.get(0).map(str::to_string)).collect();
        Ok(())
    }

    fn discover_primary_key(&mut self, db: &dyn Executor) -> OscResult<()> {
        let rows = db.query(&format!(
            "SELECT column_name FROM information_schema.key_column_usage WHERE table_schema='{}' AND table_name='{}' AND constraint_name='PRIMARY' ORDER BY ORDINAL_POSITION",
            self.schema, self.name
        ))?;
        self.key_columns = rows.iter().filter_map(|r| r.get(0).map(str::to_string)).collect();
        if self.key_columns.is_empty() {
            return Err(OscError::config("no primary key found (not supported)"));
        }
        let rows = db.query(&format!(
            "SELECT column_type, extra FROM information_schema.columns WHERE table_schema='{}' AND table_name='{}' AND column_name='{}'",
            self.schema, self.name, self.key_columns[0]
        ))?;
        let row = rows.first().ok_or_else(|| OscError::config("primary key column not found in information_schema.columns"))?;
        *self.key_mysql_type.write().unwrap() = row.get(0).unwrap_or("").to_string();
        *self.key_is_auto_inc.write().unwrap() = row.get(1).unwrap_or("") == "auto_increment";
        Ok(())
    }

    fn check_primary_key_is_binary_comparable(&self) -> OscResult<()> {
        self.key_datum_kind().map(|_| ())
    }

    fn discover_min_max(&self, db: &dyn Executor) -> OscResult<()> {
        let kind = self.key_datum_kind()?;
        let key = &self.key_columns[0];
        let rows = db.query(&format!(
            "SELECT MIN({key}), MAX({key}) FROM {}",
            self.quoted_name()
        ))?;
        let Some(row) = rows.first() else { return Ok(()) };
        let (Some(min_s), Some(max_s)) = (row.get(0), row.get(1)) else {
            return Ok(()); // empty table: no rows means no valid min/max.
        };
        let (min, max) = match kind {
            DatumKind::Signed => (
                Datum::Signed(min_s.parse().map_err(|_| OscError::db("non-numeric min for signed key"))?),
                Datum::Signed(max_s.parse().map_err(|_| OscError::db("non-numeric max for signed key"))?),
            ),
            DatumKind::Unsigned => (
                Datum::Unsigned(min_s.parse().map_err(|_| OscError::db("non-numeric min for unsigned key"))?),
                Datum::Unsigned(max_s.parse().map_err(|_| OscError::db("non-numeric max for unsigned key"))?),
            ),
            DatumKind::Binary => (
                Datum::Binary(min_s.as_bytes().to_vec()),
                Datum::Binary(max_s.as_bytes().to_vec()),
            ),
        };
        *self.min_value.write().unwrap() = Some(min);
        *self.max_value.write().unwrap() = Some(max);
        Ok(())
    }

    /// Re-runs the min/max and row-estimate discovery. Exposed so the
    /// Runner can schedule it on a background interval for long-running
    /// migrations.
    pub fn update_statistics(&self, db: &dyn Executor) -> OscResult<()> {
        self.discover_min_max(db)?;
        self.discover_row_estimate(db)
    }

    /// Extracts the primary key tuple from a full row image, using the
    /// ordinal position of `key_columns` within `columns`. Binlog row
    /// events deliver rows in column order, so this is a simple intersection
    /// by name rather than anything binlog-specific, keeping `TableInfo`
    /// independent of the replay engine.
    pub fn primary_key_values<'a>(&self, row: &'a [Option<String>]) -> Vec<&'a Option<String>> {
        self.key_columns
            .iter()
            .filter_map(|pk| self.columns.iter().position(|c| c == pk).map(|i| &row[i]))
            .collect()
    }

    /// Renders the primary key tuple as a single stable string key for the
    /// delta set, e.g. `a=1` for a single-column key or `a=1,b=2` for a
    /// composite one.
    pub fn primary_key_string(&self, row: &[Option<String>]) -> String {
        self.key_columns
            .iter()
            .zip(self.primary_key_values(row))
            .map(|(col, val)| format!("{col}={}", val.as_deref().unwrap_or("NULL")))
            .collect::<Vec<_>>()
            .join(",")
    }
}
