use std::env;
use std::fmt::{Debug, Display};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Required env var {0} is not set")]
    Missing(&'static str),

    #[error("Failed to parse env var {key}: {reason}")]
    Unparseable { key: &'static str, reason: String },
}

#[derive(Clone, Copy)]
pub struct EnvVarSpec {
    pub key: &'static str,
    pub sensitive: bool,
}

#[derive(Clone, Copy)]
pub struct EnvVarValue<TVal> {
    pub spec: &'static EnvVarSpec,
    pub value: TVal,
}

impl EnvVarSpec {
    fn parse<TVal>(&'static self, raw: &str) -> Result<TVal, Error>
    where
        TVal: FromStr,
        TVal::Err: Display,
    {
        raw.trim().parse().map_err(|e: TVal::Err| Error::Unparseable {
            key: self.key,
            // don't echo secrets back into logs
            reason: if self.sensitive { "***".to_owned() } else { e.to_string() },
        })
    }

    pub fn default<TVal>(&'static self, default: TVal) -> Result<EnvVarValue<TVal>, Error>
    where
        TVal: FromStr,
        TVal::Err: Display,
    {
        let as_optional = self.optional()?;
        Ok(EnvVarValue {
            spec: as_optional.spec,
            value: as_optional.value.unwrap_or(default),
        })
    }

    pub fn optional<TVal>(&'static self) -> Result<EnvVarValue<Option<TVal>>, Error>
    where
        TVal: FromStr,
        TVal::Err: Display,
    {
        let value = match env::var(self.key) {
            Ok(val) => Some(self.parse(&val)?),
            Err(e) => {
                tracing::debug!("Failed reading env var {}: {e:?}", self.key);
                None
            }
        };
        Ok(EnvVarValue { spec: self, value })
    }

    pub fn required<TVal>(&'static self) -> Result<EnvVarValue<TVal>, Error>
    where
        TVal: FromStr,
        TVal::Err: Display,
    {
        let raw_value = env::var(self.key).map_err(|_e| Error::Missing(self.key))?;
        Ok(EnvVarValue {
            spec: self,
            value: self.parse(&raw_value)?,
        })
    }
}

impl<TVal: Debug> Debug for EnvVarValue<TVal> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.spec.sensitive {
            f.write_str("***")
        } else {
            f.write_fmt(format_args!("{:?}", self.value))
        }
    }
}

pub const LOG_FORMAT: EnvVarSpec = EnvVarSpec {
    key: "LOG_FORMAT",
    sensitive: false,
};
pub const DRY_RUN: EnvVarSpec = EnvVarSpec {
    key: "DRY_RUN",
    sensitive: false,
};
pub const EXECUTION_LAYER_RPC: EnvVarSpec = EnvVarSpec {
    key: "EXECUTION_LAYER_RPC",
    sensitive: true,
};
pub const SYNTH_PROXY_ADDRESS: EnvVarSpec = EnvVarSpec {
    key: "SYNTH_PROXY_ADDRESS",
    sensitive: false,
};
pub const STAKING_CONTRACT_ADDRESS: EnvVarSpec = EnvVarSpec {
    key: "STAKING_CONTRACT_ADDRESS",
    sensitive: false,
};
pub const STAKING_DEPLOY_BLOCK: EnvVarSpec = EnvVarSpec {
    key: "STAKING_DEPLOY_BLOCK",
    sensitive: false,
};
pub const FROZEN_PRICE: EnvVarSpec = EnvVarSpec {
    key: "FROZEN_PRICE",
    sensitive: false,
};
pub const EXCHANGE_FEE: EnvVarSpec = EnvVarSpec {
    key: "EXCHANGE_FEE",
    sensitive: false,
};
pub const OUTPUT_FILE: EnvVarSpec = EnvVarSpec {
    key: "OUTPUT_FILE",
    sensitive: false,
};
pub const BALANCE_LOOKUP_CONCURRENCY: EnvVarSpec = EnvVarSpec {
    key: "BALANCE_LOOKUP_CONCURRENCY",
    sensitive: false,
};
