use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use frozen_synth_settlement_scripts::env;
use frozen_synth_settlement_scripts::eth_client::EthLedger;
use frozen_synth_settlement_scripts::progress::LoggingProgress;
use frozen_synth_settlement_scripts::scripts;
use frozen_synth_settlement_scripts::scripts::prelude::{Overrides, ScriptRuntime};
use frozen_synth_settlement_scripts::tracing as tracing_config;

// RUST_LOG=info cargo run --bin owed_balances --release -- --output owedBalances.csv --concurrency 4

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct OwedBalancesArgs {
    /// Report path, overrides OUTPUT_FILE
    #[clap(long, required = false)]
    output: Option<PathBuf>,
    /// Balance lookups in flight, overrides BALANCE_LOOKUP_CONCURRENCY
    #[clap(long, required = false)]
    concurrency: Option<NonZeroUsize>,
    #[clap(long, required = false, default_value = "false")]
    dry_run: bool,
    /// Human decimal, overrides FROZEN_PRICE
    #[clap(long, required = false)]
    frozen_price: Option<String>,
    /// Human decimal fraction, overrides EXCHANGE_FEE
    #[clap(long, required = false)]
    exchange_fee: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine - everything can come from the real environment
    dotenvy::dotenv().ok();

    // logging setup
    tracing_config::setup_logger(
        tracing_config::LoggingConfig::default()
            .with_thread_names(true)
            .use_format(env::LOG_FORMAT.default(tracing_config::LogFormat::Plain)?.value),
    );

    let args = OwedBalancesArgs::parse();
    tracing::debug!("Args: {:?}", args);

    let overrides = Overrides {
        output: args.output,
        concurrency: args.concurrency,
        dry_run: args.dry_run,
        frozen_price: args.frozen_price,
        exchange_fee: args.exchange_fee,
    };
    let script_runtime =
        ScriptRuntime::<EthLedger>::init_from_env(&overrides).context("Failed to initialize script runtime")?;

    let progress = LoggingProgress::new("Resolved balances");
    let summary = scripts::owed_balances::run(&script_runtime, &progress).await?;

    match summary.report_path {
        Some(path) => tracing::info!("Owed balances report complete {}", path.display()),
        None => tracing::info!("Dry run complete, no report written"),
    }
    Ok(())
}
