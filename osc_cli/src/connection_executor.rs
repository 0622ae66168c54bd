//! `ConnectionExecutor`: the production `osc::db::Executor` adapter over
//! `connection::conn::connection::Connection`. One `ConnectionExecutor`
//! wraps one MySQL session; `osc` only ever calls through the `Executor`
//! trait, never this type directly.

use std::sync::Mutex;

use connection::conn::connection::{Connection, IConnection};
use connection::conn::connection_options::ConnectionOptions;

use osc::db::{ExecResult, Executor, Row, SqlWarning};
use osc::error::{OscError, OscResult};

/// `Connection::query` takes `&mut self` and isn't `Sync`; the mutex below
/// is what lets a single session be shared as an `Arc<dyn Executor>`
/// across the copier's worker threads the way the rest of the core expects.
pub struct ConnectionExecutor {
    options: ConnectionOptions,
    conn: Mutex<Connection>,
}

impl ConnectionExecutor {
    pub fn connect(options: ConnectionOptions) -> OscResult<Self> {
        let mut conn = Connection::new(options.clone());
        conn.try_connect().map_err(|e| OscError::db(e.to_string()))?;
        Ok(ConnectionExecutor { options, conn: Mutex::new(conn) })
    }

    fn run_query(&self, sql: &str) -> OscResult<Vec<Row>> {
        let mut conn = self.conn.lock().unwrap();
        let rows = conn.query(sql.to_string()).map_err(|e| OscError::db(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|r| Row(r.as_slice().iter().map(|v| Some(v.clone())).collect()))
            .collect())
    }
}

impl Executor for ConnectionExecutor {
    fn query(&self, sql: &str) -> OscResult<Vec<Row>> {
        self.run_query(sql)
    }

    fn execute(&self, sql: &str) -> OscResult<ExecResult> {
        self.run_query(sql)?;
        Ok(ExecResult { rows_affected: 0, warning_count: 0 })
    }

    fn warnings(&self) -> OscResult<Vec<SqlWarning>> {
        let rows = self.run_query("SHOW WARNINGS")?;
        Ok(rows
            .into_iter()
            .map(|r| SqlWarning {
                level: r.get(0).unwrap_or_default().to_string(),
                code: r.get(1).and_then(|c| c.parse().ok()).unwrap_or(0),
                message: r.get(2).unwrap_or_default().to_string(),
            })
            .collect())
    }

    fn begin(&self) -> OscResult<()> {
        self.run_query("BEGIN").map(|_| ())
    }

    fn commit(&self) -> OscResult<()> {
        self.run_query("COMMIT").map(|_| ())
    }

    fn rollback(&self) -> OscResult<()> {
        self.run_query("ROLLBACK").map(|_| ())
    }

    fn clone_session(&self) -> OscResult<Box<dyn Executor>> {
        Ok(Box::new(ConnectionExecutor::connect(self.options.clone())?))
    }
}
