use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use alloy::transports::http::reqwest::Url;
use frozen_synth_settlement_shared::settlement::{self, SettlementParameters};
use thiserror::Error;

use crate::discovery::StakingSource;
use crate::env;
use crate::eth_client::{EthLedger, EthLedgerClient, LedgerClient, ProviderFactory};
use crate::report::DEFAULT_REPORT_FILE;

const DEFAULT_DRY_RUN: bool = false;
const DEFAULT_CONCURRENCY: NonZeroUsize = NonZeroUsize::MIN;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Env(#[from] env::Error),

    #[error("Failed to parse RPC endpoint URL: {0}")]
    FailedToParseUrl(String),

    #[error("Invalid settlement parameters: {0}")]
    InvalidParameters(#[from] settlement::Error),
}

pub mod env_vars {
    use std::num::NonZeroUsize;
    use std::path::PathBuf;

    use alloy_primitives::Address;

    use super::{DEFAULT_CONCURRENCY, DEFAULT_DRY_RUN, DEFAULT_REPORT_FILE};
    use crate::env::{self, EnvVarValue};

    #[derive(Debug, Clone)]
    pub struct EnvVars {
        pub synth_proxy_address: EnvVarValue<Address>,
        pub staking_contract_address: EnvVarValue<Address>,
        pub staking_deploy_block: EnvVarValue<u64>,
        pub frozen_price: EnvVarValue<String>,
        pub exchange_fee: EnvVarValue<String>,
        pub output_file: EnvVarValue<PathBuf>,
        pub balance_lookup_concurrency: EnvVarValue<NonZeroUsize>,
        pub dry_run: EnvVarValue<bool>,
        // sensitive
        pub execution_layer_rpc: EnvVarValue<String>,
    }

    impl EnvVars {
        pub fn init_from_env() -> Result<Self, env::Error> {
            Ok(Self {
                synth_proxy_address: env::SYNTH_PROXY_ADDRESS.required()?,
                staking_contract_address: env::STAKING_CONTRACT_ADDRESS.required()?,
                staking_deploy_block: env::STAKING_DEPLOY_BLOCK.required()?,
                frozen_price: env::FROZEN_PRICE.required()?,
                exchange_fee: env::EXCHANGE_FEE.required()?,
                output_file: env::OUTPUT_FILE.default(PathBuf::from(DEFAULT_REPORT_FILE))?,
                balance_lookup_concurrency: env::BALANCE_LOOKUP_CONCURRENCY.default(DEFAULT_CONCURRENCY)?,
                dry_run: env::DRY_RUN.default(DEFAULT_DRY_RUN)?,
                execution_layer_rpc: env::EXECUTION_LAYER_RPC.required()?,
            })
        }
    }
}

/// Command line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub concurrency: Option<NonZeroUsize>,
    pub dry_run: bool,
    pub frozen_price: Option<String>,
    pub exchange_fee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: StakingSource,
    pub params: SettlementParameters,
    pub output: PathBuf,
    pub concurrency: NonZeroUsize,
    pub dry_run: bool,
}

impl Settings {
    pub fn from_env_vars(env_vars: &env_vars::EnvVars, overrides: &Overrides) -> Result<Self, Error> {
        let frozen_price = overrides
            .frozen_price
            .as_deref()
            .unwrap_or(&env_vars.frozen_price.value);
        let exchange_fee = overrides
            .exchange_fee
            .as_deref()
            .unwrap_or(&env_vars.exchange_fee.value);

        Ok(Self {
            source: StakingSource {
                synth_proxy: env_vars.synth_proxy_address.value,
                staking_contract: env_vars.staking_contract_address.value,
                deploy_block: env_vars.staking_deploy_block.value,
            },
            params: SettlementParameters::from_decimals(frozen_price, exchange_fee)?,
            output: overrides
                .output
                .clone()
                .unwrap_or_else(|| env_vars.output_file.value.clone()),
            concurrency: overrides
                .concurrency
                .unwrap_or(env_vars.balance_lookup_concurrency.value),
            dry_run: overrides.dry_run || env_vars.dry_run.value,
        })
    }
}

pub struct ScriptRuntime<L: LedgerClient = EthLedger> {
    pub settings: Settings,
    pub ledger: Arc<L>,
    pub env_vars: Option<env_vars::EnvVars>,
}

impl<L: LedgerClient> ScriptRuntime<L> {
    pub fn new(settings: Settings, ledger: Arc<L>, env_vars: Option<env_vars::EnvVars>) -> Self {
        Self {
            settings,
            ledger,
            env_vars,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.settings.dry_run
    }
}

impl ScriptRuntime<EthLedger> {
    pub fn init(env_vars: env_vars::EnvVars, overrides: &Overrides) -> Result<Self, Error> {
        let settings = Settings::from_env_vars(&env_vars, overrides)?;
        let endpoint: Url = env_vars
            .execution_layer_rpc
            .value
            .parse::<Url>()
            .map_err(|e| Error::FailedToParseUrl(e.to_string()))?;

        let provider = Arc::new(ProviderFactory::create_provider(endpoint));
        let ledger = Arc::new(EthLedgerClient::new(provider));
        Ok(Self::new(settings, ledger, Some(env_vars)))
    }

    pub fn init_from_env(overrides: &Overrides) -> Result<Self, Error> {
        let env_vars = env_vars::EnvVars::init_from_env()?;
        tracing::debug!("Env vars: {:?}", env_vars);
        Self::init(env_vars, overrides)
    }
}
