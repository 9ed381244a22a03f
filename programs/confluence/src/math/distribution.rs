use anchor_lang::prelude::*;
use crate::error::ErrorCode;
use crate::math::rewards::{credit_boost, credit_revenue};
use crate::state::{DistributorKind, DistributorStatus, RateDistributor, StakeLedger};

/// speed * (now - last_distribution_time), zero until the first speed is set.
pub fn pending_reward(distributor: &RateDistributor, current_timestamp: i64) -> u64 {
    if distributor.status != DistributorStatus::Active {
        return 0;
    }
    let elapsed = current_timestamp.saturating_sub(distributor.last_distribution_time).max(0) as u128;
    let pending = (distributor.speed as u128).saturating_mul(elapsed);
    pending.min(u64::MAX as u128) as u64
}

/// Release up to the pending amount, capped at what the buffer holds.
/// Zero pending is a no-op returning zero.
pub fn distribute(
    distributor: &mut RateDistributor,
    caller: &Pubkey,
    buffer_balance: u64,
    current_timestamp: i64,
) -> Result<u64> {
    require_keys_eq!(*caller, distributor.authority, ErrorCode::NotDistributorAuthority);

    let pending = pending_reward(distributor, current_timestamp);
    if pending == 0 {
        return Ok(0);
    }
    let paid = pending.min(buffer_balance);
    if paid < pending {
        msg!("distribute: pending {} capped at buffer balance {}", pending, buffer_balance);
    }

    distributor.last_distribution_time = current_timestamp;
    distributor.total_distributed = distributor
        .total_distributed
        .checked_add(paid)
        .ok_or(ErrorCode::MathOverflow)?;
    Ok(paid)
}

/// Phase one of a speed change and the body of the permissionless crank:
/// the ledger pulls what the distributor releases into its accumulator.
///
/// With nothing staked the ledger does not pull, so the release keeps
/// accruing until there is someone to credit.
pub fn flush_into_ledger(
    distributor: &mut RateDistributor,
    ledger: &mut StakeLedger,
    ledger_key: &Pubkey,
    buffer_balance: u64,
    current_timestamp: i64,
) -> Result<u64> {
    if ledger.total_staked == 0 {
        return Ok(0);
    }
    let paid = distribute(distributor, ledger_key, buffer_balance, current_timestamp)?;
    match distributor.kind {
        DistributorKind::Boost => credit_boost(ledger, paid)?,
        DistributorKind::Revenue => credit_revenue(ledger, paid)?,
    }
    ledger.last_update = current_timestamp;
    Ok(paid)
}

/// Phase two of a speed change. Activates the distributor on first use.
pub fn commit_speed(distributor: &mut RateDistributor, speed: u64, current_timestamp: i64) {
    distributor.speed = speed;
    distributor.last_distribution_time = current_timestamp;
    distributor.status = DistributorStatus::Active;
}
