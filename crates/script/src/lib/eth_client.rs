use alloy::eips::BlockId;
use alloy::network::Ethereum;
use alloy::providers::fillers::RecommendedFillers;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use alloy::transports::{RpcError, TransportErrorKind};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolEvent;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

use IERC20::IERC20Instance;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        #[derive(Debug)]
        event Transfer(address indexed from, address indexed to, uint256 value);

        function balanceOf(address account) external view returns (uint256);
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("RPC error {0:#?}")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("Contract call failed {0:#?}")]
    Contract(#[from] alloy::contract::Error),

    #[error("Failed to decode Transfer log in tx {tx_hash:?}: {source:?}")]
    LogDecode {
        tx_hash: Option<TxHash>,
        #[source]
        source: alloy_sol_types::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: Option<u64>,
}

/// Read-only view of the chain needed to rebuild staker balances.
///
/// Every failure is final: callers abort the run instead of working with partial data.
pub trait LedgerClient {
    fn get_head_block(&self) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// `Transfer` events emitted by `token` with `to == recipient`, in chain order,
    /// over the inclusive range `from_block..=to_block`.
    fn get_past_transfers(
        &self,
        token: Address,
        recipient: Address,
        from_block: u64,
        to_block: u64,
    ) -> impl Future<Output = Result<Vec<TransferEvent>, LedgerError>> + Send;

    /// `balanceOf(account)` on `contract`, evaluated at `block`.
    fn get_balance(
        &self,
        contract: Address,
        account: Address,
        block: u64,
    ) -> impl Future<Output = Result<U256, LedgerError>> + Send;
}

pub struct EthLedgerClient<P>
where
    P: Provider<Ethereum>,
{
    provider: Arc<P>,
}

impl<P> EthLedgerClient<P>
where
    P: Provider<Ethereum>,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    fn erc20(&self, address: Address) -> IERC20Instance<Arc<P>> {
        IERC20Instance::new(address, Arc::clone(&self.provider))
    }

    async fn get_past_transfers_impl(
        &self,
        token: Address,
        recipient: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, LedgerError> {
        tracing::info!(
            token = %token,
            recipient = %recipient,
            "Reading Transfer events for blocks {from_block}..={to_block}"
        );
        let filter = Filter::new()
            .address(token)
            .event_signature(IERC20::Transfer::SIGNATURE_HASH)
            .topic2(recipient.into_word())
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .inspect(|logs| tracing::debug!("Obtained {} Transfer logs", logs.len()))
            .inspect_err(|err| tracing::error!("Failed to read Transfer logs: {err:?}"))?;

        logs.iter()
            .map(|log| {
                let decoded = log
                    .log_decode::<IERC20::Transfer>()
                    .map_err(|source| LedgerError::LogDecode {
                        tx_hash: log.transaction_hash,
                        source,
                    })?;
                let event = &decoded.inner.data;
                Ok(TransferEvent {
                    from: event.from,
                    to: event.to,
                    value: event.value,
                    block_number: log.block_number,
                })
            })
            .collect()
    }

    async fn get_balance_impl(&self, contract: Address, account: Address, block: u64) -> Result<U256, LedgerError> {
        let balance = self
            .erc20(contract)
            .balanceOf(account)
            .block(BlockId::number(block))
            .call()
            .await
            .inspect(|val| tracing::debug!(account = %account, "Obtained balance {val}"))
            .inspect_err(|err| tracing::error!(account = %account, "Failed to read balance: {err:?}"))?;
        Ok(balance)
    }
}

impl<P> LedgerClient for EthLedgerClient<P>
where
    P: Provider<Ethereum>,
{
    async fn get_head_block(&self) -> Result<u64, LedgerError> {
        let head = self
            .provider
            .get_block_number()
            .instrument(tracing::info_span!("get_head_block"))
            .await
            .inspect(|val| tracing::info!("Chain head is at block {val}"))
            .inspect_err(|err| tracing::error!("Failed to read chain head: {err:?}"))?;
        Ok(head)
    }

    async fn get_past_transfers(
        &self,
        token: Address,
        recipient: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, LedgerError> {
        let tracing_span = tracing::info_span!("get_past_transfers");
        self.get_past_transfers_impl(token, recipient, from_block, to_block)
            .instrument(tracing_span)
            .await
    }

    async fn get_balance(&self, contract: Address, account: Address, block: u64) -> Result<U256, LedgerError> {
        let tracing_span = tracing::debug_span!("get_balance", block);
        self.get_balance_impl(contract, account, block)
            .instrument(tracing_span)
            .await
    }
}

pub type DefaultProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        <Ethereum as RecommendedFillers>::RecommendedFillers,
    >,
    alloy::providers::RootProvider,
>;

pub type EthLedger = EthLedgerClient<DefaultProvider>;

pub struct ProviderFactory {}
impl ProviderFactory {
    /// Read-only provider - nothing is ever signed or sent.
    pub fn create_provider(endpoint: Url) -> DefaultProvider {
        ProviderBuilder::new().connect_http(endpoint)
    }
}
