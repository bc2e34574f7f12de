use std::path::PathBuf;
use std::sync::Arc;

use alloy_primitives::U256;
use anyhow::Context;
use frozen_synth_settlement_shared::fixed_point::from_units;
use frozen_synth_settlement_shared::settlement::SettlementTable;
use tracing::Instrument;

use crate::discovery;
use crate::eth_client::LedgerClient;
use crate::progress::ProgressReporter;
use crate::report;
use crate::scripts::prelude::ScriptRuntime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub head_block: u64,
    pub candidate_count: usize,
    pub active_staker_count: usize,
    pub total_staked: U256,
    pub total_owed: U256,
    /// None on dry runs
    pub report_path: Option<PathBuf>,
}

async fn run_with_span<L>(runtime: &ScriptRuntime<L>, progress: &dyn ProgressReporter) -> anyhow::Result<RunSummary>
where
    L: LedgerClient + Send + Sync + 'static,
{
    let settings = &runtime.settings;
    tracing::info!(
        "Reconstructing owed balances: synth proxy {}, staking contract {}, deployed at block {}",
        settings.source.synth_proxy,
        settings.source.staking_contract,
        settings.source.deploy_block
    );

    let discovery = discovery::discover_stakers(
        Arc::clone(&runtime.ledger),
        &settings.source,
        settings.concurrency,
        progress,
    )
    .await
    .context("Failed to discover stakers")?;

    let table = SettlementTable::compute(&discovery.stakers, &settings.params)
        .context("Failed to compute settlement table")?;
    if table.is_empty() {
        tracing::warn!("No account holds a staked balance, the report will only carry the summary rows");
    }

    let report_path = if runtime.is_dry_run() {
        tracing::info!("Dry run mode enabled, skipping report {}", settings.output.display());
        None
    } else {
        report::write_report_file(&settings.output, &table, &settings.params)
            .with_context(|| format!("Failed to write report to {}", settings.output.display()))?;
        Some(settings.output.clone())
    };

    let summary = RunSummary {
        head_block: discovery.head_block,
        candidate_count: discovery.candidate_count,
        active_staker_count: table.records.len(),
        total_staked: table.total_staked,
        total_owed: table.total_owed,
        report_path,
    };
    tracing::info!(
        head_block = summary.head_block,
        candidates = summary.candidate_count,
        active_stakers = summary.active_staker_count,
        total_staked = %summary.total_staked,
        total_owed = %summary.total_owed,
        "Total staked {}, total owed {} sUSD",
        from_units(summary.total_staked),
        from_units(summary.total_owed)
    );
    Ok(summary)
}

pub async fn run<L>(runtime: &ScriptRuntime<L>, progress: &dyn ProgressReporter) -> anyhow::Result<RunSummary>
where
    L: LedgerClient + Send + Sync + 'static,
{
    let tracing_span = tracing::info_span!("owed_balances", dry_run = runtime.is_dry_run());
    run_with_span(runtime, progress).instrument(tracing_span).await
}
