use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use apigee_stats_collector::{
    config::DEFAULT_CONFIG_PATH, logging, metrics, run, ApigeeClient, Config, Integration, Result,
};
use clap::Parser;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Collects Apigee proxy statistics for the infrastructure agent")]
struct Args {
    /// Settings file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Pretty-print the published JSON
    #[arg(short, long)]
    pretty: bool,

    /// Collect metrics only
    #[arg(long)]
    metrics: bool,

    /// Collect inventory only
    #[arg(long)]
    inventory: bool,
}

impl Args {
    /// Metrics are collected when asked for, or when no data kind was named.
    fn collect_metrics(&self) -> bool {
        self.metrics || !self.inventory
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_logger(args.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match execute(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: &Args) -> Result<()> {
    debug!("Starting up - version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&args.config)?;
    let transport = config.transport();
    debug!("Proxy URL: {:?}", transport.proxy_url);
    debug!("Apigee Dimension: {}", config.dimension);
    debug!("Apigee Time Range: {}m", config.time_range);
    debug!("Apigee Total Query = {}", config.select_clause());

    let result = if args.collect_metrics() {
        let client = ApigeeClient::new(&transport)?;
        run(&config, client, io::stdout().lock(), args.pretty)
            .await
            .map(|sets| info!("Published {} metric sets", sets))
    } else {
        Integration::default().publish(io::stdout().lock(), args.pretty)
    };

    debug!("Collector metrics:\n{}", metrics::render());
    result
}
