//! `osc`: the command-line entry point for the online MySQL schema-change
//! engine. Parses flags, optionally layers a `--config` TOML file under
//! them, wires up the production `Executor`/`BinlogEventSource`
//! implementations, and drives a single `Runner::run`.

mod binlog_source;
mod config;
mod connection_executor;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use common::log::tracing_factory::TracingFactory;
use connection::conn::connection_options::ConnectionOptions;

use osc::db::Executor;
use osc::error::OscResult;
use osc::runner::{RunContext, Runner, RunnerConfig};
use osc::throttle::{NoopThrottler, ReplicaLagThrottler, Throttler};

use binlog_source::BinlogSubscribeEventSource;
use config::OscCliConfig;
use connection_executor::ConnectionExecutor;

#[derive(Parser, Debug)]
#[command(name = "osc", about = "Online, non-blocking MySQL schema-change tool")]
struct Args {
    /// host:port of the MySQL server to migrate.
    #[arg(long, default_value = "127.0.0.1:3306")]
    host: String,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    database: Option<String>,

    #[arg(long)]
    table: Option<String>,

    /// The `ALTER TABLE` clauses to apply, e.g. `"ADD COLUMN c INT"`.
    #[arg(long)]
    alter: Option<String>,

    #[arg(long)]
    concurrency: Option<usize>,

    /// Defaults to `concurrency` if unset.
    #[arg(long)]
    checksum_concurrency: Option<usize>,

    #[arg(long)]
    target_chunk_time_ms: Option<u64>,

    #[arg(long)]
    attempt_inplace_ddl: bool,

    #[arg(long, default_value_t = true)]
    checksum: bool,

    /// DSN of a replica to throttle against instead of the source.
    #[arg(long)]
    replica_dsn: Option<String>,

    #[arg(long)]
    replica_max_lag_ms: Option<u64>,

    #[arg(long)]
    keep_old_table: bool,

    /// TOML file providing defaults for any flag not passed on the
    /// command line.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    debug: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(serde::Serialize)]
struct RunSummary {
    schema: String,
    table: String,
    alter: String,
    success: bool,
    elapsed_ms: u128,
    error: Option<String>,
}

fn print_summary(summary: &RunSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(summary) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("osc: failed to render summary: {e}"),
        },
        OutputFormat::Yaml => match serde_yaml::to_string(summary) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("osc: failed to render summary: {e}"),
        },
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    TracingFactory::init_log(args.debug);

    let format = args.format;
    let schema = args.database.clone().unwrap_or_default();
    let table = args.table.clone().unwrap_or_default();
    let alter = args.alter.clone().unwrap_or_default();

    let started = std::time::Instant::now();
    let result = run(args);
    let elapsed_ms = started.elapsed().as_millis();

    let summary = RunSummary {
        schema,
        table,
        alter,
        success: result.is_ok(),
        elapsed_ms,
        error: result.as_ref().err().map(|e| e.to_string()),
    };
    print_summary(&summary, format);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("osc: {e}");
            ExitCode::FAILURE
        }
    }
}

fn merged_config(args: &Args) -> OscResult<OscCliConfig> {
    let mut cfg = match &args.config {
        Some(path) => config::read_config(path)?,
        None => OscCliConfig::default(),
    };

    if args.host != "127.0.0.1:3306" {
        cfg.host = args.host.clone();
    }
    if let Some(v) = &args.username {
        cfg.username = v.clone();
    }
    if let Some(v) = &args.password {
        cfg.password = v.clone();
    }
    if let Some(v) = &args.database {
        cfg.database = v.clone();
    }
    if let Some(v) = &args.table {
        cfg.table = v.clone();
    }
    if let Some(v) = &args.alter {
        cfg.alter = v.clone();
    }
    if let Some(v) = args.concurrency {
        cfg.concurrency = v;
    }
    cfg.checksum_concurrency = args.checksum_concurrency.unwrap_or(cfg.concurrency);
    if let Some(v) = args.target_chunk_time_ms {
        cfg.target_chunk_time_ms = v;
    }
    cfg.attempt_inplace_ddl = args.attempt_inplace_ddl || cfg.attempt_inplace_ddl;
    cfg.checksum = args.checksum;
    if args.replica_dsn.is_some() {
        cfg.replica_dsn = args.replica_dsn.clone();
    }
    if let Some(v) = args.replica_max_lag_ms {
        cfg.replica_max_lag_ms = v;
    }
    cfg.keep_old_table = args.keep_old_table || cfg.keep_old_table;

    Ok(cfg)
}

fn run(args: Args) -> OscResult<()> {
    let cfg = merged_config(&args)?;
    tracing::info!(schema = %cfg.database, table = %cfg.table, alter = %cfg.alter, "starting online schema change");

    let (host, port) = split_host(&cfg.host)?;
    let options = ConnectionOptions::new_str(&host, port, &cfg.username, &cfg.password);
    let db: Arc<dyn Executor> = Arc::new(ConnectionExecutor::connect(options)?);

    // `create_shadow_table` only issues the alter statement as given; an
    // in-place attempt is requested by appending the clause here rather
    // than teaching the runner a DDL-algorithm fallback ladder.
    let alter_statement = if cfg.attempt_inplace_ddl {
        format!("{}, ALGORITHM=INPLACE, LOCK=NONE", cfg.alter)
    } else {
        cfg.alter.clone()
    };

    let runner_config = RunnerConfig {
        schema: cfg.database.clone(),
        table: cfg.table.clone(),
        alter_statement,
        concurrency: cfg.concurrency,
        checksum_concurrency: cfg.checksum_concurrency,
        target_chunk_time: cfg.target_chunk_time(),
        checksum_enabled: cfg.checksum,
        keep_old_table: cfg.keep_old_table,
        disable_dynamic_chunker: false,
        key_above_watermark_optimization: true,
    };

    let mut runner = Runner::new(runner_config, db.clone());

    let throttler: Arc<dyn Throttler> = match &cfg.replica_dsn {
        Some(dsn) => {
            let (rhost, rport) = split_host(dsn)?;
            let replica_options = ConnectionOptions::new_str(&rhost, rport, &cfg.username, &cfg.password);
            let replica_db: Arc<dyn Executor> = Arc::new(ConnectionExecutor::connect(replica_options)?);
            let throttler = Arc::new(ReplicaLagThrottler::new(cfg.replica_max_lag(), Duration::from_secs(1)));
            spawn_replica_lag_sampler(replica_db, throttler.clone());
            throttler as Arc<dyn Throttler>
        }
        None => Arc::new(NoopThrottler),
    };
    runner.set_throttler(throttler);

    let binlog_source = BinlogSubscribeEventSource::new();
    let ctx = RunContext::new();
    let result = runner.run(&ctx, Box::new(binlog_source));
    match &result {
        Ok(()) => tracing::info!("schema change complete"),
        Err(e) => tracing::error!(error = %e, "schema change failed"),
    }
    result
}

/// `SHOW REPLICA STATUS` carries no column names through `Executor::query`
/// (its `Row` is a plain `Vec<Option<String>>`, mirroring the positional
/// `RowString` the production driver itself returns), so the lag column is
/// read by its documented, stable position rather than by name.
const REPLICA_STATUS_SECONDS_BEHIND_SOURCE_COLUMN: usize = 31;

fn spawn_replica_lag_sampler(replica_db: Arc<dyn Executor>, throttler: Arc<ReplicaLagThrottler>) {
    std::thread::spawn(move || loop {
        if let Ok(rows) = replica_db.query("SHOW REPLICA STATUS") {
            if let Some(row) = rows.first() {
                if let Some(secs) = row
                    .get(REPLICA_STATUS_SECONDS_BEHIND_SOURCE_COLUMN)
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    throttler.report_lag(Duration::from_secs(secs));
                }
            }
        }
        std::thread::sleep(Duration::from_secs(1));
    });
}

fn split_host(host: &str) -> OscResult<(String, i16)> {
    let (h, p) = host
        .rsplit_once(':')
        .ok_or_else(|| osc::error::OscError::config(format!("invalid host:port '{host}'")))?;
    let port: i16 = p
        .parse()
        .map_err(|_| osc::error::OscError::config(format!("invalid port in '{host}'")))?;
    Ok((h.to_string(), port))
}
