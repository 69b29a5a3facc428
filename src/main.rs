//! Coinbase candle fetcher - main entry point
//!
//! With no arguments, downloads hourly BTC-USD candles back to 2015-07-20
//! and saves them to `hourly_candles_<timestamp>.csv`.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coinbase_candles::coinbase::{CoinbaseClient, COINBASE_API_BASE};
use coinbase_candles::config::{DEFAULT_GRANULARITY, DEFAULT_PAIR};
use coinbase_candles::shutdown::{listen_for_ctrl_c, ShutdownFlag};
use coinbase_candles::{CandleFetcher, FetcherConfig, TracingObserver};

#[derive(Parser, Debug)]
#[command(name = "coinbase-candles")]
#[command(about = "Download historical Coinbase candles to CSV", long_about = None)]
#[command(version)]
struct Cli {
    /// Trading pair. E.g., "BTC-USD", "ETH-EUR"
    #[arg(short, long, default_value = DEFAULT_PAIR)]
    pair: String,

    /// Candle width in seconds (60, 300, 900, 3600, 21600, 86400)
    #[arg(short, long, default_value_t = DEFAULT_GRANULARITY)]
    granularity: u32,

    /// Directory the CSV file is written into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// API host
    #[arg(long, default_value = COINBASE_API_BASE)]
    base_url: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "fetch_{}.log",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Set log level - filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    // File layer - same format but without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config =
        FetcherConfig::new(cli.pair, cli.granularity).with_output_dir(&cli.output_dir);
    let client = CoinbaseClient::with_base_url(cli.base_url)?;

    // Runtime only hosts the Ctrl+C listener; fetching stays on this thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let shutdown = ShutdownFlag::new();
    listen_for_ctrl_c(&runtime, shutdown.clone());

    let report = CandleFetcher::new(client, config)
        .with_shutdown(shutdown)
        .run(&TracingObserver)?;

    info!(
        "Run finished: {} windows, {} records written",
        report.windows_fetched, report.records_written
    );

    runtime.shutdown_background();
    Ok(())
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting the data fetch process.");
    if let Err(e) = run(cli) {
        error!("Unexpected error: {}", e);
        std::process::exit(1);
    }
}
