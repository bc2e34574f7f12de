#![allow(dead_code)]
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::transports::TransportErrorKind;
use alloy_primitives::{Address, U256};
use frozen_synth_settlement_scripts::eth_client::{LedgerClient, LedgerError, TransferEvent};
use frozen_synth_settlement_scripts::progress::ProgressReporter;
use frozen_synth_settlement_scripts::tracing as tracing_config;
use frozen_synth_settlement_shared::fixed_point::UNIT;
use hex_literal::hex;

pub mod fixtures;

pub const SYNTH_PROXY: Address = Address::new(hex!("57ab1ec28d129707052df4df418d58a2d46d5f51"));
pub const STAKING_CONTRACT: Address = Address::new(hex!("c746bc860781dc90bbfcd381d6a058dc16357f8d"));
pub const DEPLOY_BLOCK: u64 = 11_000_000;
pub const HEAD_BLOCK: u64 = 11_200_000;

pub fn init_logging() {
    tracing_config::setup_logger(tracing_config::LoggingConfig::default_for_test());
}

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * UNIT
}

pub fn temp_report_path(test_name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("owed-balances-{}-{test_name}", std::process::id()))
        .join("owedBalances.csv")
}

/// In-memory ledger. Lookups for accounts in `yields` give way to the scheduler that many
/// times first, so completion order differs from submission order under concurrency.
#[derive(Default)]
pub struct FakeLedger {
    pub head_block: u64,
    pub transfers: Vec<TransferEvent>,
    pub balances: HashMap<Address, U256>,
    pub failing_accounts: HashSet<Address>,
    pub fail_scan: bool,
    pub yields: HashMap<Address, usize>,
    pub scanned_ranges: Mutex<Vec<(u64, u64)>>,
    pub balance_queries: AtomicUsize,
}

impl FakeLedger {
    pub fn new(head_block: u64) -> Self {
        Self {
            head_block,
            ..Default::default()
        }
    }

    pub fn with_stake(mut self, from: Address, block: u64, balance: U256) -> Self {
        self.transfers.push(TransferEvent {
            from,
            to: STAKING_CONTRACT,
            value: U256::from(1),
            block_number: Some(block),
        });
        self.balances.insert(from, balance);
        self
    }

    pub fn with_transfer(mut self, event: TransferEvent) -> Self {
        self.transfers.push(event);
        self
    }

    pub fn with_failing_account(mut self, address: Address) -> Self {
        self.failing_accounts.insert(address);
        self
    }

    pub fn with_yields(mut self, address: Address, count: usize) -> Self {
        self.yields.insert(address, count);
        self
    }

    pub fn failing_scan(mut self) -> Self {
        self.fail_scan = true;
        self
    }

    pub fn scanned_ranges(&self) -> Vec<(u64, u64)> {
        self.scanned_ranges.lock().expect("Lock poisoned").clone()
    }

    pub fn balance_query_count(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }
}

fn rpc_failure(message: &str) -> LedgerError {
    LedgerError::Rpc(TransportErrorKind::custom_str(message))
}

impl LedgerClient for FakeLedger {
    async fn get_head_block(&self) -> Result<u64, LedgerError> {
        Ok(self.head_block)
    }

    async fn get_past_transfers(
        &self,
        token: Address,
        recipient: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, LedgerError> {
        self.scanned_ranges
            .lock()
            .expect("Lock poisoned")
            .push((from_block, to_block));
        if self.fail_scan || token != SYNTH_PROXY {
            return Err(rpc_failure("eth_getLogs failed"));
        }
        let events = self
            .transfers
            .iter()
            .filter(|event| event.to == recipient)
            .filter(|event| {
                event
                    .block_number
                    .map_or(true, |block| (from_block..=to_block).contains(&block))
            })
            .cloned()
            .collect();
        Ok(events)
    }

    async fn get_balance(&self, contract: Address, account: Address, block: u64) -> Result<U256, LedgerError> {
        assert_eq!(contract, STAKING_CONTRACT, "Balances must be read from the staking contract");
        assert_eq!(block, self.head_block, "Balances must be read at the scanned head");
        self.balance_queries.fetch_add(1, Ordering::SeqCst);

        for _ in 0..self.yields.get(&account).copied().unwrap_or(0) {
            tokio::task::yield_now().await;
        }
        if self.failing_accounts.contains(&account) {
            return Err(rpc_failure("eth_call failed"));
        }
        Ok(self.balances.get(&account).copied().unwrap_or(U256::ZERO))
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub calls: Mutex<Vec<(usize, usize)>>,
}

impl RecordingProgress {
    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().expect("Lock poisoned").clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        self.calls.lock().expect("Lock poisoned").push((completed, total));
    }
}
