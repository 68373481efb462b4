use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use mixload::adapter::mysql::{MysqlAdapter, MysqlConfig};
use mixload::{RunConfig, SummaryPrinter, WorkloadDriver};

#[derive(Parser, Debug)]
#[command(name = "mysql-load")]
#[command(about = "Mixed read/write load test against MySQL over a Unix socket")]
struct Args {
    /// Directory holding per-instance Unix sockets
    #[arg(long, default_value = "/cloudsql")]
    socket_dir: PathBuf,

    /// Instance connection name; the socket lives at <socket_dir>/<conn>
    #[arg(long)]
    conn: String,

    /// Schema to use
    #[arg(long)]
    db: String,

    /// Database user name
    #[arg(long)]
    user: String,

    /// Password for the user
    #[arg(long, default_value = "")]
    pass: String,

    /// Scratch table to create; must not already exist
    #[arg(long, default_value = "scratch")]
    scratch_table: String,

    /// Seconds to run; 0 runs until interrupted
    #[arg(long, default_value_t = 5)]
    run_for: u64,

    /// Maximum concurrent operations
    #[arg(long, default_value_t = 100)]
    concurrency: usize,

    /// Keys are sampled from [0, key_space)
    #[arg(long, default_value_t = 100)]
    key_space: u64,

    /// Fraction of operations that are writes
    #[arg(long, default_value_t = 0.5)]
    write_ratio: f64,

    /// RNG seed for a reproducible operation sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the summary as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = RunConfig {
        run_for: Duration::from_secs(args.run_for),
        concurrency: args.concurrency,
        key_space: args.key_space,
        write_ratio: args.write_ratio,
        seed: args.seed,
    };

    let adapter = Arc::new(
        MysqlAdapter::connect(MysqlConfig {
            socket: args.socket_dir.join(&args.conn),
            user: args.user,
            pass: args.pass,
            database: args.db,
            table: args.scratch_table,
            pool_size: args.concurrency as u32,
        })
        .await?,
    );

    let driver = WorkloadDriver::new(config);
    let cancel = driver.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, draining in-flight operations");
            cancel.cancel();
        }
    });

    let summary = mixload::run_against(&driver, adapter).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        SummaryPrinter::print(&summary);
    }

    Ok(())
}
