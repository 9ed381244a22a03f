use anchor_lang::prelude::*;
use crate::constants::{ONE_HUNDRED_PERCENT, WAD};
use crate::error::ErrorCode;
use crate::math::fixed_point::*;
use crate::state::{BorrowPosition, CollateralVault, UserPosition, VaultConfig};

/// Largest principal `supplied` collateral entitles a user to:
/// supplied * price * max_borrow_ratio / R_c
pub fn max_borrow(supplied: u64, price: u64, config: &VaultConfig) -> Result<u128> {
    let value = collateral_value(supplied, price)?;
    mul_div(value, config.max_borrow_ratio, config.target_collateral_ratio)
}

/// Vault-wide borrow ratio in percent WAD: total_borrowed / max_borrow(total_supplied).
pub fn global_borrow_ratio(vault: &CollateralVault, price: u64) -> Result<u128> {
    if vault.total_borrowed == 0 {
        return Ok(0);
    }
    let capacity = max_borrow(vault.total_supplied, price, &vault.config)?;
    if capacity == 0 {
        return Ok(u128::MAX);
    }
    mul_div(vault.total_borrowed as u128, ONE_HUNDRED_PERCENT, capacity)
}

/// Simple linear interest on the interest-bearing principal.
/// Returns the amount accrued by this call.
pub fn accrue_interest(
    position: &mut BorrowPosition,
    config: &VaultConfig,
    current_timestamp: i64,
) -> Result<u64> {
    if position.interest_timestamp == 0 || current_timestamp <= position.interest_timestamp {
        position.interest_timestamp = current_timestamp;
        return Ok(0);
    }

    let elapsed = (current_timestamp - position.interest_timestamp) as u128;
    let accrued = (position.interest_bearing_principal as u128)
        .checked_mul(config.interest_rate_per_second)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_mul(elapsed)
        .ok_or(ErrorCode::MathOverflow)?
        / WAD;
    let accrued = to_amount(accrued)?;

    position.accrued_interest = position
        .accrued_interest
        .checked_add(accrued)
        .ok_or(ErrorCode::MathOverflow)?;
    position.interest_timestamp = current_timestamp;
    Ok(accrued)
}

/// Draw `amount` of minted debt. Returns whether the draw is interest-bearing.
///
/// The caller touches the user's rebase account first: a first borrow makes
/// the whole supply ineligible for rebase yield.
pub fn apply_borrow(
    vault: &mut CollateralVault,
    position: &mut UserPosition,
    amount: u64,
    price: u64,
    current_timestamp: i64,
) -> Result<bool> {
    require!(amount > 0, ErrorCode::InvalidAmount);
    accrue_interest(&mut position.borrow, &vault.config, current_timestamp)?;

    let new_principal = position
        .borrow
        .principal
        .checked_add(amount)
        .ok_or(ErrorCode::MathOverflow)?;
    let entitlement = max_borrow(position.supplied_amount, price, &vault.config)?;
    require!(
        new_principal as u128 <= entitlement,
        ErrorCode::BorrowExceedsEntitlement
    );
    let headroom = vault.total_minted.saturating_sub(vault.total_borrowed);
    require!(amount <= headroom, ErrorCode::InsufficientMintHeadroom);

    let was_borrower = position.borrow.principal > 0;
    position.borrow.principal = new_principal;
    vault.total_borrowed += amount;

    let interest_bearing =
        global_borrow_ratio(vault, price)? >= vault.config.interest_threshold_ratio;
    if interest_bearing {
        position.borrow.interest_bearing_principal = position
            .borrow
            .interest_bearing_principal
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        vault.total_interest_bearing = vault
            .total_interest_bearing
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
    }

    if !was_borrower {
        vault.rebase.ineligible_supply = vault
            .rebase
            .ineligible_supply
            .checked_add(position.supplied_amount)
            .ok_or(ErrorCode::MathOverflow)?;
    }
    vault.check_invariants()?;
    Ok(interest_bearing)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepayOutcome {
    // Routed to the revenue sink
    pub interest_paid: u64,
    // Returned to the vault's minted headroom
    pub principal_paid: u64,
    pub position_closed: bool,
}

impl RepayOutcome {
    pub fn total(&self) -> u64 {
        self.interest_paid + self.principal_paid
    }
}

/// Repay up to `amount`: accrued interest first, then principal, the
/// interest-bearing part of it preferentially. Anything above the total
/// debt is not taken.
pub fn apply_repay(
    vault: &mut CollateralVault,
    position: &mut UserPosition,
    amount: u64,
    current_timestamp: i64,
) -> Result<RepayOutcome> {
    require!(amount > 0, ErrorCode::InvalidAmount);
    accrue_interest(&mut position.borrow, &vault.config, current_timestamp)?;
    require!(!position.borrow.is_empty(), ErrorCode::NoOutstandingDebt);

    let borrow = &mut position.borrow;
    let interest_paid = amount.min(borrow.accrued_interest);
    borrow.accrued_interest -= interest_paid;

    let principal_paid = (amount - interest_paid).min(borrow.principal);
    if principal_paid > 0 {
        let bearing_paid = principal_paid.min(borrow.interest_bearing_principal);
        borrow.interest_bearing_principal -= bearing_paid;
        borrow.principal -= principal_paid;

        vault.total_interest_bearing = vault.total_interest_bearing.saturating_sub(bearing_paid);
        vault.total_borrowed = vault
            .total_borrowed
            .checked_sub(principal_paid)
            .ok_or(ErrorCode::MathUnderflow)?;

        if borrow.principal == 0 {
            vault.rebase.ineligible_supply = vault
                .rebase
                .ineligible_supply
                .saturating_sub(position.supplied_amount);
        }
    }

    let position_closed = position.borrow.is_empty();
    if position_closed {
        position.borrow = BorrowPosition::default();
    }
    vault.check_invariants()?;

    Ok(RepayOutcome {
        interest_paid,
        principal_paid,
        position_closed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_PRECISION;
    use crate::state::default_vault_config;
    use anchor_lang::error::Error;

    const UNIT: u64 = 1_000_000;
    const YEAR: i64 = 365 * 24 * 3600;

    fn setup(supplied: u64, minted: u64) -> (CollateralVault, UserPosition) {
        let vault = CollateralVault {
            config: default_vault_config(UNIT),
            total_supplied: supplied,
            total_deposited: supplied,
            total_minted: minted,
            ..Default::default()
        };
        let position = UserPosition {
            supplied_amount: supplied,
            ..Default::default()
        };
        (vault, position)
    }

    #[test]
    fn borrow_is_capped_by_entitlement() {
        let price = 1_000 * PRICE_PRECISION;
        let (mut vault, mut position) = setup(10 * UNIT, 5_000 * UNIT);
        assert_eq!(max_borrow(10 * UNIT, price, &vault.config).unwrap(), 4_000 * UNIT as u128);

        let err = apply_borrow(&mut vault, &mut position, 4_500 * UNIT, price, 1).unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::BorrowExceedsEntitlement));
        assert_eq!(position.borrow.principal, 0);

        apply_borrow(&mut vault, &mut position, 4_000 * UNIT, price, 1).unwrap();
        assert_eq!(position.borrow.principal, 4_000 * UNIT);
        assert_eq!(vault.total_borrowed, 4_000 * UNIT);
        assert_eq!(vault.rebase.ineligible_supply, 10 * UNIT);
    }

    #[test]
    fn borrow_is_capped_by_mint_headroom() {
        let price = 1_000 * PRICE_PRECISION;
        let (mut vault, mut position) = setup(10 * UNIT, 1_000 * UNIT);
        let err = apply_borrow(&mut vault, &mut position, 1_001 * UNIT, price, 1).unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::InsufficientMintHeadroom));
    }

    #[test]
    fn only_draws_above_threshold_bear_interest() {
        let price = 1_000 * PRICE_PRECISION;
        let (mut vault, mut position) = setup(10 * UNIT, 5_000 * UNIT);

        // 2000 / 4000 = 50% < 60%
        assert!(!apply_borrow(&mut vault, &mut position, 2_000 * UNIT, price, 1).unwrap());
        // 3000 / 4000 = 75%
        assert!(apply_borrow(&mut vault, &mut position, 1_000 * UNIT, price, 1).unwrap());
        assert_eq!(position.borrow.interest_bearing_principal, 1_000 * UNIT);

        accrue_interest(&mut position.borrow, &vault.config, 1 + YEAR).unwrap();
        let expected = (1_000 * UNIT as u128 * vault.config.interest_rate_per_second
            * YEAR as u128
            / WAD) as u64;
        assert_eq!(position.borrow.accrued_interest, expected);
        // ~2% a year
        assert!(expected > 19 * UNIT && expected < 21 * UNIT);
    }

    #[test]
    fn repay_settles_interest_then_bearing_principal() {
        let price = 1_000 * PRICE_PRECISION;
        let (mut vault, mut position) = setup(10 * UNIT, 5_000 * UNIT);
        apply_borrow(&mut vault, &mut position, 2_000 * UNIT, price, 1).unwrap();
        apply_borrow(&mut vault, &mut position, 1_000 * UNIT, price, 1).unwrap();
        position.borrow.accrued_interest = 10 * UNIT;

        let outcome = apply_repay(&mut vault, &mut position, 510 * UNIT, 1).unwrap();
        assert_eq!(outcome.interest_paid, 10 * UNIT);
        assert_eq!(outcome.principal_paid, 500 * UNIT);
        assert_eq!(position.borrow.interest_bearing_principal, 500 * UNIT);
        assert_eq!(vault.total_borrowed, 2_500 * UNIT);
    }

    #[test]
    fn overpaying_resets_position() {
        let price = 1_000 * PRICE_PRECISION;
        let (mut vault, mut position) = setup(10 * UNIT, 5_000 * UNIT);
        apply_borrow(&mut vault, &mut position, 1_000 * UNIT, price, 7).unwrap();

        let outcome = apply_repay(&mut vault, &mut position, 5_000 * UNIT, 7).unwrap();
        assert_eq!(outcome.total(), 1_000 * UNIT);
        assert!(outcome.position_closed);
        assert_eq!(position.borrow, BorrowPosition::default());
        assert_eq!(vault.total_borrowed, 0);
        assert_eq!(vault.rebase.ineligible_supply, 0);
    }

    #[test]
    fn interest_only_repay_leaves_total_borrowed() {
        let (mut vault, mut position) = setup(10 * UNIT, 5_000 * UNIT);
        vault.total_borrowed = 300;
        position.borrow.accrued_interest = 50;
        position.borrow.interest_timestamp = 1;

        let outcome = apply_repay(&mut vault, &mut position, 80, 1).unwrap();
        assert_eq!(outcome, RepayOutcome { interest_paid: 50, principal_paid: 0, position_closed: true });
        assert_eq!(vault.total_borrowed, 300);
    }

    #[test]
    fn repay_without_debt_fails() {
        let (mut vault, mut position) = setup(10 * UNIT, 0);
        let err = apply_repay(&mut vault, &mut position, 1, 1).unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::NoOutstandingDebt));
    }
}
