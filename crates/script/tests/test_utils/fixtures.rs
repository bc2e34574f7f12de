use std::num::NonZeroUsize;
use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use frozen_synth_settlement_scripts::discovery::StakingSource;
use frozen_synth_settlement_scripts::eth_client::TransferEvent;
use frozen_synth_settlement_scripts::scripts::prelude::Settings;
use frozen_synth_settlement_shared::settlement::SettlementParameters;

use super::{account, tokens, FakeLedger, DEPLOY_BLOCK, HEAD_BLOCK, STAKING_CONTRACT, SYNTH_PROXY};

pub const FROZEN_PRICE: &str = "289.01";
pub const EXCHANGE_FEE: &str = "0.003";

pub fn staking_source() -> StakingSource {
    StakingSource {
        synth_proxy: SYNTH_PROXY,
        staking_contract: STAKING_CONTRACT,
        deploy_block: DEPLOY_BLOCK,
    }
}

pub fn params() -> SettlementParameters {
    SettlementParameters::from_decimals(FROZEN_PRICE, EXCHANGE_FEE).expect("Valid parameters")
}

pub fn settings(output: PathBuf, concurrency: usize, dry_run: bool) -> Settings {
    Settings {
        source: staking_source(),
        params: params(),
        output,
        concurrency: NonZeroUsize::new(concurrency).expect("Concurrency must be positive"),
        dry_run,
    }
}

pub fn alice() -> Address {
    account(0xa1)
}
pub fn bob() -> Address {
    account(0xb0)
}
pub fn carol() -> Address {
    account(0xc0)
}
pub fn dave() -> Address {
    account(0xd0)
}

/// * alice staked twice, holds 10 tokens
/// * bob staked then fully unstaked
/// * carol staked in the deployment block itself, holds 2.5 tokens
/// * dave sent tokens to some other address - never a candidate
pub fn staking_history() -> FakeLedger {
    let two_and_a_half = tokens(5) / U256::from(2);
    FakeLedger::new(HEAD_BLOCK)
        .with_stake(alice(), DEPLOY_BLOCK + 10, tokens(10))
        .with_stake(bob(), DEPLOY_BLOCK + 20, U256::ZERO)
        .with_stake(carol(), DEPLOY_BLOCK, two_and_a_half)
        .with_stake(alice(), DEPLOY_BLOCK + 30, tokens(10))
        .with_transfer(TransferEvent {
            from: dave(),
            to: account(0xee),
            value: tokens(1),
            block_number: Some(DEPLOY_BLOCK + 40),
        })
}
