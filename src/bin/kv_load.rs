use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use mixload::adapter::http::{HttpAdapter, HttpConfig};
use mixload::{RunConfig, SummaryPrinter, WorkloadDriver};

#[derive(Parser, Debug)]
#[command(name = "kv-load")]
#[command(about = "Mixed read/write load test against an HTTP key-value store")]
struct Args {
    /// Base URL of the store
    #[arg(long, default_value = "http://127.0.0.1:3030")]
    base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

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

    let adapter = Arc::new(HttpAdapter::new(HttpConfig {
        base_url: args.base,
        timeout_secs: args.timeout,
        pool_size: args.concurrency,
    })?);

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
