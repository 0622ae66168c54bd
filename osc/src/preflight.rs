//! Preflight checks: the data-only validations the Runner performs before
//! C1 discovery begins. Each check is a small function taking a
//! `PreflightContext` and returning `Result<(), OscError>`; none of them
//! alter the control flow of the chunker/copier/replay/cutover core, they
//! only decide whether a run is allowed to start at all.

use crate::db::Executor;
use crate::error::{OscError, OscResult};

pub struct PreflightContext<'a> {
    pub db: &'a dyn Executor,
    pub schema: String,
    pub table: String,
    /// The raw `ALTER TABLE ...` body the caller supplied, scanned (not
    /// parsed) for clauses preflight needs to reject.
    pub alter_statement: String,
}

const MIN_SUPPORTED_VERSION: (u32, u32) = (8, 0);

/// Runs every preflight check in order, short-circuiting on the first
/// failure the way the Runner wants to report a single, specific reason
/// rather than a pile of unrelated errors.
pub fn run_all(ctx: &PreflightContext) -> OscResult<()> {
    version_check(ctx)?;
    foreign_key_check(ctx)?;
    trigger_check(ctx)?;
    privilege_check(ctx)?;
    Ok(())
}

/// Rejects a table that participates in a foreign key on either side, or
/// whose `ALTER TABLE` text tries to add one. This is a lightweight token
/// scan, not a full SQL parser: the core treats SQL statement parsing as
/// out of scope, and the teacher's own codebase has no dependency on one.
pub fn foreign_key_check(ctx: &PreflightContext) -> OscResult<()> {
    let rows = ctx.db.query(&format!(
        "SELECT constraint_name FROM information_schema.referential_constraints \
         WHERE (constraint_schema = '{schema}' AND table_name = '{table}') \
            OR (unique_constraint_schema = '{schema}' AND referenced_table_name = '{table}')",
        schema = ctx.schema,
        table = ctx.table,
    ))?;
    if !rows.is_empty() {
        return Err(OscError::config(format!(
            "table `{}`.`{}` has a foreign key; not supported",
            ctx.schema, ctx.table
        )));
    }

    let upper = ctx.alter_statement.to_ascii_uppercase();
    if upper.contains("FOREIGN KEY") || upper.contains("REFERENCES") {
        return Err(OscError::config("ALTER TABLE statement adds a foreign key; not supported"));
    }
    Ok(())
}

/// Rejects a table with any trigger defined on it.
pub fn trigger_check(ctx: &PreflightContext) -> OscResult<()> {
    let rows = ctx.db.query(&format!(
        "SELECT trigger_name FROM information_schema.triggers WHERE event_object_schema = '{}' AND event_object_table = '{}'",
        ctx.schema, ctx.table
    ))?;
    if !rows.is_empty() {
        return Err(OscError::config(format!("table `{}`.`{}` has triggers; not supported", ctx.schema, ctx.table)));
    }
    Ok(())
}

/// Parses `SHOW GRANTS` for either `ALL PRIVILEGES ON *.*` or the narrower
/// (`SUPER` or `REPLICATION CLIENT`) + `REPLICATION SLAVE` + all-on-db
/// combination required to run chunked copy and tail the binlog.
pub fn privilege_check(ctx: &PreflightContext) -> OscResult<()> {
    let rows = ctx.db.query("SHOW GRANTS")?;
    let grants: Vec<String> = rows.into_iter().filter_map(|r| r.0.into_iter().next().flatten()).collect();
    let grants_upper: Vec<String> = grants.iter().map(|g| g.to_ascii_uppercase()).collect();

    let has_all_on_star = grants_upper.iter().any(|g| g.contains("ALL PRIVILEGES ON *.*") || g.contains("GRANT ALL ON *.*"));
    if has_all_on_star {
        return Ok(());
    }

    let has_super_or_repl_client = grants_upper.iter().any(|g| g.contains("SUPER") || g.contains("REPLICATION CLIENT"));
    let has_repl_slave = grants_upper.iter().any(|g| g.contains("REPLICATION SLAVE"));
    let db_pattern = format!("ON `{}`.*", ctx.schema.to_ascii_uppercase());
    let has_all_on_db = grants_upper
        .iter()
        .any(|g| g.contains("ALL PRIVILEGES") && (g.contains(&db_pattern) || g.contains("ON *.*")));

    if has_super_or_repl_client && has_repl_slave && has_all_on_db {
        return Ok(());
    }

    Err(OscError::config(
        "insufficient privileges: need ALL ON *.*, or (SUPER or REPLICATION CLIENT) + REPLICATION SLAVE + ALL ON the target database",
    ))
}

/// Requires MySQL 8.0 or newer.
pub fn version_check(ctx: &PreflightContext) -> OscResult<()> {
    let rows = ctx.db.query("SELECT @@version")?;
    let version = rows.first().and_then(|r| r.get(0)).ok_or_else(|| OscError::config("could not determine server version"))?;
    let (major, minor) = parse_version(version).ok_or_else(|| OscError::config(format!("unparseable server version: {version}")))?;
    if (major, minor) < MIN_SUPPORTED_VERSION {
        return Err(OscError::config(format!("MySQL 8.0+ required, server reports {version}")));
    }
    Ok(())
}

fn parse_version(v: &str) -> Option<(u32, u32)> {
    let mut parts = v.split(['.', '-']);
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
