use anchor_lang::prelude::*;
use crate::constants::{BPS_DENOMINATOR, MAX_ORACLE_CONFIDENCE_BPS, MAX_ORACLE_STALENESS};
use crate::error::ErrorCode;

/// Parsed price from oracle feed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OraclePrice {
    pub price: u64, // in PRICE_PRECISION (1e6)
    pub confidence: u64, // same precision
    pub timestamp: i64,
}

// PriceUpdateV2 offsets after discriminator(8) + write_authority(32) + verification_level(1)
// and feed_id(32).
const PRICE_OFFSET: usize = 73;
const CONF_OFFSET: usize = 81;
const EXPONENT_OFFSET: usize = 89;
const PUBLISH_TIME_OFFSET: usize = 93;
const MIN_PRICE_ACCOUNT_LEN: usize = 112;

/// Read the latest collateral price from a Pyth price feed account.
pub fn get_price(oracle_account: &AccountInfo, now: i64) -> Result<OraclePrice> {
    let data = oracle_account.try_borrow_data()?;
    parse_price(&data, now)
}

/// Parse and validate a Pyth PriceUpdateV2 payload.
pub fn parse_price(data: &[u8], now: i64) -> Result<OraclePrice> {
    require!(data.len() >= MIN_PRICE_ACCOUNT_LEN, ErrorCode::OraclePriceInvalid);

    let price_raw = i64::from_le_bytes(
        data[PRICE_OFFSET..PRICE_OFFSET + 8]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let conf_raw = u64::from_le_bytes(
        data[CONF_OFFSET..CONF_OFFSET + 8]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let exponent = i32::from_le_bytes(
        data[EXPONENT_OFFSET..EXPONENT_OFFSET + 4]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );
    let publish_time = i64::from_le_bytes(
        data[PUBLISH_TIME_OFFSET..PUBLISH_TIME_OFFSET + 8]
            .try_into()
            .map_err(|_| ErrorCode::OraclePriceInvalid)?,
    );

    require!(price_raw > 0, ErrorCode::OraclePriceInvalid);
    // conf / price <= MAX_ORACLE_CONFIDENCE_BPS, both at the feed's exponent
    require!(
        (conf_raw as u128) * (BPS_DENOMINATOR as u128)
            <= (price_raw as u128) * (MAX_ORACLE_CONFIDENCE_BPS as u128),
        ErrorCode::OracleConfidenceTooWide
    );

    let age = now
        .checked_sub(publish_time)
        .ok_or(ErrorCode::MathOverflow)?;
    require!(age <= MAX_ORACLE_STALENESS as i64, ErrorCode::OraclePriceStale);

    let price = normalize_price(price_raw as u64, exponent)?;
    require!(price > 0, ErrorCode::OraclePriceInvalid);

    Ok(OraclePrice {
        price,
        confidence: normalize_price(conf_raw, exponent)?,
        timestamp: publish_time,
    })
}

/// Normalize a Pyth price with exponent to PRICE_PRECISION (1e6)
fn normalize_price(raw_price: u64, exponent: i32) -> Result<u64> {
    let target_exp: i32 = 6;
    let shift = target_exp + exponent;

    if shift >= 0 {
        let factor = 10u64
            .checked_pow(shift as u32)
            .ok_or(ErrorCode::MathOverflow)?;
        raw_price
            .checked_mul(factor)
            .ok_or(ErrorCode::MathOverflow.into())
    } else {
        let divisor = 10u64
            .checked_pow((-shift) as u32)
            .ok_or(ErrorCode::OraclePriceInvalid)?;
        Ok(raw_price / divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn feed(price: i64, exponent: i32, publish_time: i64) -> Vec<u8> {
        feed_with_conf(price, 0, exponent, publish_time)
    }

    fn feed_with_conf(price: i64, conf: u64, exponent: i32, publish_time: i64) -> Vec<u8> {
        let mut data = vec![0u8; MIN_PRICE_ACCOUNT_LEN];
        data[PRICE_OFFSET..PRICE_OFFSET + 8].copy_from_slice(&price.to_le_bytes());
        data[CONF_OFFSET..CONF_OFFSET + 8].copy_from_slice(&conf.to_le_bytes());
        data[EXPONENT_OFFSET..EXPONENT_OFFSET + 4].copy_from_slice(&exponent.to_le_bytes());
        data[PUBLISH_TIME_OFFSET..PUBLISH_TIME_OFFSET + 8]
            .copy_from_slice(&publish_time.to_le_bytes());
        data
    }

    #[test]
    fn normalizes_pyth_exponent() {
        let parsed = parse_price(&feed(160_000_000_000, -8, 1_000), 1_010).unwrap();
        assert_eq!(parsed.price, 1_600_000_000);
        assert_eq!(parsed.timestamp, 1_000);
    }

    #[test]
    fn rejects_stale_and_negative_prices() {
        let stale = parse_price(&feed(100_000_000, -8, 0), 61).unwrap_err();
        assert_eq!(stale, Error::from(ErrorCode::OraclePriceStale));

        let negative = parse_price(&feed(-1, -8, 0), 0).unwrap_err();
        assert_eq!(negative, Error::from(ErrorCode::OraclePriceInvalid));

        let short = parse_price(&[0u8; 16], 0).unwrap_err();
        assert_eq!(short, Error::from(ErrorCode::OraclePriceInvalid));
    }

    #[test]
    fn confidence_is_bounded_and_normalized() {
        // 1600 +/- 32 is exactly 2%
        let parsed =
            parse_price(&feed_with_conf(160_000_000_000, 3_200_000_000, -8, 1_000), 1_000).unwrap();
        assert_eq!(parsed.confidence, 32_000_000);

        let err = parse_price(&feed_with_conf(160_000_000_000, 3_200_000_001, -8, 1_000), 1_000)
            .unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::OracleConfidenceTooWide));
    }
}
