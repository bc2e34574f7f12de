use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fixed_point::{self, from_units, multiply_decimal, UNIT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Exchange fee {0} exceeds one unit - fee multiplier would be negative")]
    FeeExceedsUnit(String),

    #[error("Zero balance for {0} reached settlement - zero balances must be filtered out during discovery")]
    ZeroBalance(Address),

    #[error("Overflow while computing {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    FixedPoint(#[from] fixed_point::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: Address,
    pub balance: U256,
}

/// Price and fee frozen for the whole run. Both are 18-decimal fixed-point values.
// exchange_fee <= UNIT, enforced by `new`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementParameters {
    frozen_price: U256,
    exchange_fee: U256,
}

impl SettlementParameters {
    pub fn new(frozen_price: U256, exchange_fee: U256) -> Result<Self, Error> {
        if exchange_fee > UNIT {
            return Err(Error::FeeExceedsUnit(from_units(exchange_fee)));
        }
        Ok(Self {
            frozen_price,
            exchange_fee,
        })
    }

    pub fn from_decimals(frozen_price: &str, exchange_fee: &str) -> Result<Self, Error> {
        Self::new(fixed_point::to_units(frozen_price)?, fixed_point::to_units(exchange_fee)?)
    }

    pub fn frozen_price(&self) -> U256 {
        self.frozen_price
    }

    pub fn exchange_fee(&self) -> U256 {
        self.exchange_fee
    }

    pub fn fee_multiplier(&self) -> U256 {
        // exchange_fee <= UNIT is checked on construction
        UNIT - self.exchange_fee
    }
}

/// Amount owed for `balance`.
///
/// IMPORTANT: the grouping is `(balance * price) * (1 - fee)`. Floor division is not
/// associative, so multiplying by the fee multiplier first produces different amounts.
pub fn owed_for(balance: U256, params: &SettlementParameters) -> Result<U256, Error> {
    let converted = multiply_decimal(balance, params.frozen_price)?;
    Ok(multiply_decimal(converted, params.fee_multiplier())?)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub address: Address,
    pub balance: U256,
    pub owed: U256,
    /// Display only - never feed back into arithmetic
    pub readable_balance: String,
    pub readable_owed: String,
}

impl SettlementRecord {
    pub fn compute(account: &AccountBalance, params: &SettlementParameters) -> Result<Self, Error> {
        if account.balance.is_zero() {
            return Err(Error::ZeroBalance(account.address));
        }
        let owed = owed_for(account.balance, params)?;
        Ok(Self {
            address: account.address,
            balance: account.balance,
            owed,
            readable_balance: from_units(account.balance),
            readable_owed: from_units(owed),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTable {
    pub records: Vec<SettlementRecord>,
    pub total_staked: U256,
    pub total_owed: U256,
}

impl SettlementTable {
    pub fn compute(balances: &[AccountBalance], params: &SettlementParameters) -> Result<Self, Error> {
        let mut records = Vec::with_capacity(balances.len());
        let mut total_staked = U256::ZERO;
        let mut total_owed = U256::ZERO;

        for account in balances {
            let record = SettlementRecord::compute(account, params)?;
            total_staked = total_staked
                .checked_add(record.balance)
                .ok_or(Error::Overflow("total staked"))?;
            total_owed = total_owed
                .checked_add(record.owed)
                .ok_or(Error::Overflow("total owed"))?;
            records.push(record);
        }

        tracing::debug!(
            records = records.len(),
            total_staked = %total_staked,
            total_owed = %total_owed,
            "Computed settlement table"
        );

        Ok(Self {
            records,
            total_staked,
            total_owed,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
