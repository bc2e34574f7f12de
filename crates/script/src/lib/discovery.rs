use std::num::NonZeroUsize;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use frozen_synth_settlement_shared::settlement::AccountBalance;
use itertools::Itertools;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::eth_client::{LedgerClient, LedgerError, TransferEvent};
use crate::progress::ProgressReporter;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Ledger query failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Staking contract deploy block {deploy_block} is ahead of chain head {head_block}")]
    DeployBlockAfterHead { deploy_block: u64, head_block: u64 },

    #[error("Balance lookup worker failed: {0:?}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Balance lookup pool closed: {0:?}")]
    PoolClosed(#[from] tokio::sync::AcquireError),
}

/// Where stakers are discovered: Transfer events of `synth_proxy` into `staking_contract`,
/// starting at the staking contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingSource {
    pub synth_proxy: Address,
    pub staking_contract: Address,
    pub deploy_block: u64,
}

impl StakingSource {
    /// One block before deployment, so the deployment block itself is always covered.
    pub fn scan_start_block(&self) -> u64 {
        self.deploy_block.saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Block the scan ended at and the balances were read at
    pub head_block: u64,
    /// Unique senders seen in the scan, before balance filtering
    pub candidate_count: usize,
    pub stakers: Vec<AccountBalance>,
}

/// Senders of `events`, each once, in first-seen order.
pub fn unique_senders(events: &[TransferEvent]) -> Vec<Address> {
    events.iter().map(|event| event.from).unique().collect()
}

/// Looks up the balance of every candidate at `block` and keeps the non-zero ones.
///
/// At most `concurrency` lookups are in flight. The output follows `candidates` order
/// regardless of the order lookups complete in. The first failed lookup fails the whole batch.
pub async fn resolve_balances<L>(
    ledger: Arc<L>,
    contract: Address,
    block: u64,
    candidates: &[Address],
    concurrency: NonZeroUsize,
    progress: &dyn ProgressReporter,
) -> Result<Vec<AccountBalance>, Error>
where
    L: LedgerClient + Send + Sync + 'static,
{
    let total = candidates.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.get()));
    let mut workers = JoinSet::new();

    for (index, account) in candidates.iter().copied().enumerate() {
        let ledger = Arc::clone(&ledger);
        let semaphore = Arc::clone(&semaphore);
        workers.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let balance = ledger.get_balance(contract, account, block).await?;
            Ok::<_, Error>((index, balance))
        });
    }

    let mut balances: Vec<Option<U256>> = vec![None; total];
    let mut completed = 0;
    // Returning early drops the JoinSet, which aborts every outstanding lookup
    while let Some(joined) = workers.join_next().await {
        let (index, balance) = joined??;
        balances[index] = Some(balance);
        completed += 1;
        progress.on_progress(completed, total);
    }

    let stakers = candidates
        .iter()
        .zip(balances)
        .filter_map(|(address, balance)| match balance {
            Some(balance) if !balance.is_zero() => Some(AccountBalance {
                address: *address,
                balance,
            }),
            _ => None,
        })
        .collect();
    Ok(stakers)
}

pub async fn discover_stakers<L>(
    ledger: Arc<L>,
    source: &StakingSource,
    concurrency: NonZeroUsize,
    progress: &dyn ProgressReporter,
) -> Result<Discovery, Error>
where
    L: LedgerClient + Send + Sync + 'static,
{
    let head_block = ledger.get_head_block().await?;
    if source.deploy_block > head_block {
        return Err(Error::DeployBlockAfterHead {
            deploy_block: source.deploy_block,
            head_block,
        });
    }

    let events = ledger
        .get_past_transfers(
            source.synth_proxy,
            source.staking_contract,
            source.scan_start_block(),
            head_block,
        )
        .await?;
    let candidates = unique_senders(&events);
    tracing::info!(
        events = events.len(),
        candidates = candidates.len(),
        "Found {} candidate stakers in {} Transfer events",
        candidates.len(),
        events.len()
    );

    let stakers = resolve_balances(
        ledger,
        source.staking_contract,
        head_block,
        &candidates,
        concurrency,
        progress,
    )
    .await?;
    tracing::info!(
        "{} of {} candidates hold a non-zero staked balance",
        stakers.len(),
        candidates.len()
    );

    Ok(Discovery {
        head_block,
        candidate_count: candidates.len(),
        stakers,
    })
}
