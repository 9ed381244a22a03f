use anchor_lang::prelude::*;
use crate::constants::{BPS_DENOMINATOR, ONE_HUNDRED_PERCENT, PRICE_PRECISION, WAD};
use crate::error::ErrorCode;

/// Multiply two WAD values: (a * b) / WAD
pub fn wad_mul(a: u128, b: u128) -> Result<u128> {
    a.checked_mul(b)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_div(WAD)
        .ok_or(ErrorCode::DivisionByZero.into())
}

/// Divide two WAD values: (a * WAD) / b
pub fn wad_div(a: u128, b: u128) -> Result<u128> {
    if b == 0 {
        return Err(ErrorCode::DivisionByZero.into());
    }
    a.checked_mul(WAD)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_div(b)
        .ok_or(ErrorCode::DivisionByZero.into())
}

/// (a * b) / denominator, rounded down
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(ErrorCode::DivisionByZero.into());
    }
    Ok(a.checked_mul(b).ok_or(ErrorCode::MathOverflow)? / denominator)
}

/// (a * b) / denominator, rounded up
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(ErrorCode::DivisionByZero.into());
    }
    let product = a.checked_mul(b).ok_or(ErrorCode::MathOverflow)?;
    Ok(product.div_ceil(denominator))
}

/// Multiply a value by basis points: (value * bps) / 10_000
pub fn bps_mul(value: u64, bps: u64) -> Result<u64> {
    (value as u128)
        .checked_mul(bps as u128)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_div(BPS_DENOMINATOR as u128)
        .ok_or(ErrorCode::DivisionByZero)?
        .try_into()
        .map_err(|_| ErrorCode::MathOverflow.into())
}

/// Apply a percent-WAD ratio to an amount: amount * ratio / 100%
pub fn percent_mul(amount: u128, ratio: u128) -> Result<u128> {
    mul_div(amount, ratio, ONE_HUNDRED_PERCENT)
}

/// Value of a collateral amount in debt units: amount * price / PRICE_PRECISION
pub fn collateral_value(amount: u64, price: u64) -> Result<u128> {
    mul_div(amount as u128, price as u128, PRICE_PRECISION as u128)
}

/// Collateral amount worth `value` debt units, rounded down
pub fn value_to_collateral(value: u128, price: u64) -> Result<u128> {
    require!(price > 0, ErrorCode::OraclePriceInvalid);
    mul_div(value, PRICE_PRECISION as u128, price as u128)
}

/// Collateral amount worth at least `value` debt units
pub fn value_to_collateral_ceil(value: u128, price: u64) -> Result<u128> {
    require!(price > 0, ErrorCode::OraclePriceInvalid);
    mul_div_ceil(value, PRICE_PRECISION as u128, price as u128)
}

/// Narrow a u128 to a token amount
pub fn to_amount(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| ErrorCode::MathOverflow.into())
}
