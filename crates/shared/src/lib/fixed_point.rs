//! 18-decimal fixed-point arithmetic over `U256`.
//!
//! A value `v` represents `v / 10^18`. Multiplication floors.
use alloy_primitives::U256;
use thiserror::Error;

pub const DECIMALS: usize = 18;
pub const UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid decimal value {0:?}")]
    InvalidDecimal(String),

    #[error("Signed decimal value {0:?} - only non-negative amounts are supported")]
    SignedValue(String),

    #[error("Decimal value {value:?} has more than {max} fractional digits")]
    PrecisionLoss { value: String, max: usize },

    #[error("Fixed-point overflow: {0}")]
    Overflow(String),
}

/// Anything that can be normalized into a scaled (`* 10^18`) integer.
///
/// `U256` is taken as already scaled, strings are human decimals.
pub trait ToScaled {
    fn to_scaled(&self) -> Result<U256, Error>;
}

impl ToScaled for U256 {
    fn to_scaled(&self) -> Result<U256, Error> {
        Ok(*self)
    }
}

impl ToScaled for &str {
    fn to_scaled(&self) -> Result<U256, Error> {
        to_units(self)
    }
}

impl ToScaled for String {
    fn to_scaled(&self) -> Result<U256, Error> {
        to_units(self)
    }
}

/// `floor(x * y / 10^18)`
pub fn multiply_decimal(x: impl ToScaled, y: impl ToScaled) -> Result<U256, Error> {
    let x = x.to_scaled()?;
    let y = y.to_scaled()?;
    let product = x
        .checked_mul(y)
        .ok_or_else(|| Error::Overflow(format!("{x} * {y}")))?;
    Ok(product / UNIT)
}

/// Parses a human decimal ("289.01") into its scaled integer form.
pub fn to_units(value: &str) -> Result<U256, Error> {
    let trimmed = value.trim();
    if trimmed.starts_with('-') || trimmed.starts_with('+') {
        return Err(Error::SignedValue(value.to_owned()));
    }

    let (integer_part, fraction_part) = match trimmed.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (trimmed, ""),
    };

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer_part.is_empty() && fraction_part.is_empty()) || !is_digits(integer_part) || !is_digits(fraction_part)
    {
        return Err(Error::InvalidDecimal(value.to_owned()));
    }
    if fraction_part.len() > DECIMALS {
        return Err(Error::PrecisionLoss {
            value: value.to_owned(),
            max: DECIMALS,
        });
    }

    let parse = |digits: &str| -> Result<U256, Error> {
        if digits.is_empty() {
            return Ok(U256::ZERO);
        }
        U256::from_str_radix(digits, 10).map_err(|_e| Error::Overflow(value.to_owned()))
    };

    let integer = parse(integer_part)?;
    let fraction = parse(&format!("{fraction_part:0<width$}", width = DECIMALS))?;

    integer
        .checked_mul(UNIT)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(|| Error::Overflow(value.to_owned()))
}

/// Renders a scaled integer as a human decimal, always keeping at least one fractional digit:
/// `10 * UNIT` becomes `"10.0"`, `UNIT / 1000 * 3` becomes `"0.003"`.
pub fn from_units(value: U256) -> String {
    let integer = value / UNIT;
    let fraction = value % UNIT;

    let fraction_digits = format!("{:0>width$}", fraction.to_string(), width = DECIMALS);
    let trimmed = fraction_digits.trim_end_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };

    format!("{integer}.{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn units(whole: u64) -> U256 {
        U256::from(whole) * UNIT
    }

    #[test]
    fn unit_is_identity() {
        assert_eq!(multiply_decimal(UNIT, UNIT), Ok(UNIT));
        assert_eq!(multiply_decimal(units(42), UNIT), Ok(units(42)));
    }

    #[test]
    fn multiplication_truncates() {
        let half = UNIT / U256::from(2);
        // 3 * 0.5 = 1.5 base units, floored
        assert_eq!(multiply_decimal(U256::from(3), half), Ok(U256::from(1)));
        assert_eq!(multiply_decimal(U256::from(1), half), Ok(U256::ZERO));
    }

    #[test]
    fn multiplication_accepts_human_decimals() {
        assert_eq!(multiply_decimal("10", "289.01"), Ok(to_units("2890.1").unwrap()));
        assert_eq!(multiply_decimal(units(2), "0.5".to_owned()), Ok(UNIT));
    }

    #[test]
    fn multiplication_overflow_is_an_error() {
        let result = multiply_decimal(U256::MAX, U256::from(2));
        assert!(matches!(result, Err(Error::Overflow(_))));
    }

    #[test]
    fn to_units_parses() {
        assert_eq!(to_units("1"), Ok(UNIT));
        assert_eq!(to_units("0.003"), Ok(U256::from(3_000_000_000_000_000u64)));
        assert_eq!(to_units("289.01"), Ok(U256::from(289_010_000_000_000_000_000u128)));
        assert_eq!(to_units(".5"), Ok(UNIT / U256::from(2)));
        assert_eq!(to_units("7."), Ok(units(7)));
        assert_eq!(to_units(" 12 "), Ok(units(12)));
        assert_eq!(to_units("0.000000000000000001"), Ok(U256::from(1)));
    }

    #[test]
    fn to_units_rejects_malformed() {
        assert!(matches!(to_units(""), Err(Error::InvalidDecimal(_))));
        assert!(matches!(to_units("."), Err(Error::InvalidDecimal(_))));
        assert!(matches!(to_units("1.2.3"), Err(Error::InvalidDecimal(_))));
        assert!(matches!(to_units("12a"), Err(Error::InvalidDecimal(_))));
        assert!(matches!(to_units("1e18"), Err(Error::InvalidDecimal(_))));
        assert!(matches!(to_units("-1"), Err(Error::SignedValue(_))));
        assert!(matches!(to_units("+1"), Err(Error::SignedValue(_))));
        assert!(matches!(
            to_units("0.0000000000000000001"),
            Err(Error::PrecisionLoss { max: 18, .. })
        ));
    }

    #[test]
    fn to_units_rejects_overflow() {
        let too_big = format!("{}", U256::MAX);
        assert!(matches!(to_units(&too_big), Err(Error::Overflow(_))));
    }

    #[test]
    fn from_units_renders() {
        assert_eq!(from_units(U256::ZERO), "0.0");
        assert_eq!(from_units(UNIT), "1.0");
        assert_eq!(from_units(units(10)), "10.0");
        assert_eq!(from_units(U256::from(3_000_000_000_000_000u64)), "0.003");
        assert_eq!(from_units(U256::from(1)), "0.000000000000000001");
        assert_eq!(from_units(U256::from(2_881_429_700_000_000_000_000u128)), "2881.4297");
    }

    proptest! {
        #[test]
        fn units_conversion_roundtrips(raw in any::<u128>()) {
            let value = U256::from(raw);
            prop_assert_eq!(to_units(&from_units(value)), Ok(value));
        }
    }

    proptest! {
        #[test]
        fn multiply_by_unit_is_identity(raw in any::<u128>()) {
            let value = U256::from(raw);
            prop_assert_eq!(multiply_decimal(value, UNIT), Ok(value));
        }
    }
}
