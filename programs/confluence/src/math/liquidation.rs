use anchor_lang::prelude::*;
use crate::constants::ONE_HUNDRED_PERCENT;
use crate::error::ErrorCode;
use crate::math::fixed_point::*;
use crate::math::interest::global_borrow_ratio;
use crate::state::{CollateralVault, LiquidationTier, UserPosition, VaultConfig};

/// A position is liquidatable once its principal exceeds what its supply
/// backs at the target ratio: principal > supplied * price * 100 / R_c
pub fn is_liquidatable(position: &UserPosition, price: u64, config: &VaultConfig) -> Result<bool> {
    if position.borrow.principal == 0 {
        return Ok(false);
    }
    let value = collateral_value(position.supplied_amount, price)?;
    let backed = mul_div(value, ONE_HUNDRED_PERCENT, config.target_collateral_ratio)?;
    Ok(position.borrow.principal as u128 > backed)
}

/// Normal tier below the stressed borrow ratio, stressed tier at or above it.
pub fn select_tier(vault: &CollateralVault, price: u64) -> Result<(LiquidationTier, bool)> {
    let ratio = global_borrow_ratio(vault, price)?;
    if ratio < vault.config.stressed_borrow_ratio {
        Ok((vault.config.normal_tier, false))
    } else {
        Ok((vault.config.stressed_tier, true))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidationPlan {
    pub repay_amount: u64,
    pub seize_amount: u64,
    pub stressed: bool,
}

/// Size a single-shot liquidation.
///
/// repay is capped at principal * close_factor; seize is worth
/// repay * discount, capped at the borrower's supply.
pub fn plan_liquidation(
    vault: &CollateralVault,
    position: &UserPosition,
    requested: u64,
    price: u64,
) -> Result<LiquidationPlan> {
    require!(requested > 0, ErrorCode::InvalidAmount);
    require!(
        is_liquidatable(position, price, &vault.config)?,
        ErrorCode::NotLiquidatable
    );

    let (tier, stressed) = select_tier(vault, price)?;
    let max_repay = to_amount(percent_mul(position.borrow.principal as u128, tier.close_factor)?)?;
    let repay_amount = requested.min(max_repay);
    require!(repay_amount > 0, ErrorCode::InvalidAmount);

    let seize_value = percent_mul(repay_amount as u128, tier.discount)?;
    let seize_amount = to_amount(value_to_collateral(seize_value, price)?)?
        .min(position.supplied_amount);

    Ok(LiquidationPlan {
        repay_amount,
        seize_amount,
        stressed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PRICE_PRECISION, WAD};
    use crate::math::collateral::{record_supply, record_withdraw, transfer_supply};
    use crate::math::interest::{apply_borrow, apply_repay};
    use crate::state::default_vault_config;
    use anchor_lang::error::Error;
    use proptest::prelude::*;

    const UNIT: u64 = 1_000_000;

    fn vault_with_ratio(borrowed: u64) -> CollateralVault {
        // Capacity: 100 units at price 1 => 100 * 80 / 200 = 40
        CollateralVault {
            config: default_vault_config(1),
            total_supplied: 100_000_000,
            total_minted: 50_000_000,
            total_borrowed: borrowed,
            ..Default::default()
        }
    }

    fn underwater(principal: u64, supplied: u64) -> UserPosition {
        let mut position = UserPosition {
            supplied_amount: supplied,
            ..Default::default()
        };
        position.borrow.principal = principal;
        position
    }

    #[test]
    fn eligibility_uses_target_ratio() {
        let config = default_vault_config(1);
        let price = PRICE_PRECISION;
        // 10 supplied backs 5 at 200%
        assert!(!is_liquidatable(&underwater(5, 10), price, &config).unwrap());
        assert!(is_liquidatable(&underwater(6, 10), price, &config).unwrap());
        assert!(!is_liquidatable(&underwater(0, 0), price, &config).unwrap());
    }

    #[test]
    fn normal_tier_caps_repay_at_close_factor() {
        let price = 2 * PRICE_PRECISION;
        // 16 / 40 = 40% of capacity at price 1, 16 / 80 = 20% at price 2
        let vault = vault_with_ratio(16_000_000);
        let position = underwater(1_000, 900);

        let plan = plan_liquidation(&vault, &position, 1_000, price).unwrap();
        assert!(!plan.stressed);
        assert_eq!(plan.repay_amount, 200);
        // 200 * 105% / 2
        assert_eq!(plan.seize_amount, 105);
    }

    #[test]
    fn global_ratio_below_stressed_threshold_picks_normal_tier() {
        let price = PRICE_PRECISION;
        let vault = vault_with_ratio(16_000_000);
        assert_eq!(global_borrow_ratio(&vault, price).unwrap(), 40 * WAD);
        let (tier, stressed) = select_tier(&vault, price).unwrap();
        assert!(!stressed);
        assert_eq!(tier, vault.config.normal_tier);

        let position = underwater(1_000, 1_000);
        let plan = plan_liquidation(&vault, &position, 5_000, price).unwrap();
        assert_eq!(plan.repay_amount, 200);
        assert_eq!(plan.seize_amount, 210);
    }

    #[test]
    fn stressed_tier_allows_bigger_bite() {
        let price = PRICE_PRECISION;
        let vault = vault_with_ratio(20_000_000);
        let position = underwater(1_000, 1_000);

        let plan = plan_liquidation(&vault, &position, 5_000, price).unwrap();
        assert!(plan.stressed);
        assert_eq!(plan.repay_amount, 500);
        assert_eq!(plan.seize_amount, 550);
    }

    #[test]
    fn seize_never_exceeds_supply() {
        let price = PRICE_PRECISION;
        let vault = vault_with_ratio(20_000_000);
        let position = underwater(1_000, 100);
        let plan = plan_liquidation(&vault, &position, 500, price).unwrap();
        assert_eq!(plan.seize_amount, 100);
    }

    #[test]
    fn healthy_position_rejected() {
        let vault = vault_with_ratio(0);
        let err = plan_liquidation(&vault, &underwater(1, 1_000), 1, PRICE_PRECISION).unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::NotLiquidatable));
    }

    #[derive(Clone, Copy, Debug)]
    enum Op {
        Supply,
        Withdraw,
        Borrow,
        Repay,
        Liquidate,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Supply),
            Just(Op::Withdraw),
            Just(Op::Borrow),
            Just(Op::Repay),
            Just(Op::Liquidate),
        ]
    }

    // Runs one op against copies and commits only on success, like a transaction.
    fn run(
        vault: &mut CollateralVault,
        positions: &mut [UserPosition],
        op: Op,
        who: usize,
        amount: u64,
        price: u64,
        now: i64,
    ) {
        let mut next_vault = vault.clone();
        let mut next = positions.to_vec();
        let other = (who + 1) % next.len();
        let result = match op {
            Op::Supply => record_supply(&mut next_vault, &mut next[who], amount),
            Op::Withdraw => record_withdraw(&mut next_vault, &mut next[who], amount, price),
            Op::Borrow => apply_borrow(&mut next_vault, &mut next[who], amount, price, now).map(|_| ()),
            Op::Repay => apply_repay(&mut next_vault, &mut next[who], amount, now).map(|_| ()),
            Op::Liquidate => {
                let mut borrower = next[who].clone();
                let mut liquidator = next[other].clone();
                let result = plan_liquidation(&next_vault, &borrower, amount, price).and_then(|plan| {
                    apply_repay(&mut next_vault, &mut borrower, plan.repay_amount, now)?;
                    transfer_supply(&mut next_vault, &mut borrower, &mut liquidator, plan.seize_amount)
                });
                next[who] = borrower;
                next[other] = liquidator;
                result
            }
        };
        if result.is_ok() {
            *vault = next_vault;
            positions.clone_from_slice(&next);
        }
    }

    proptest! {
        #[test]
        fn mixed_operations_keep_ledger_consistent(
            steps in proptest::collection::vec(
                (op(), 0usize..3, 1u64..5_000 * UNIT, any::<bool>()),
                1..40,
            ),
        ) {
            let mut vault = CollateralVault {
                config: default_vault_config(1),
                total_minted: 1 << 60,
                ..Default::default()
            };
            let mut positions = vec![UserPosition::default(); 3];

            for (i, (op, who, amount, crashed)) in steps.into_iter().enumerate() {
                let price = (if crashed { 300 } else { 1_000 }) * PRICE_PRECISION;
                run(&mut vault, &mut positions, op, who, amount, price, 1 + i as i64 * 3_600);

                let supplied: u64 = positions.iter().map(|p| p.supplied_amount).sum();
                let ineligible: u64 = positions
                    .iter()
                    .filter(|p| p.borrow.principal > 0)
                    .map(|p| p.supplied_amount)
                    .sum();
                let borrowed: u64 = positions.iter().map(|p| p.borrow.principal).sum();
                let bearing: u64 = positions
                    .iter()
                    .map(|p| p.borrow.interest_bearing_principal)
                    .sum();

                prop_assert_eq!(supplied, vault.total_supplied);
                prop_assert_eq!(ineligible, vault.rebase.ineligible_supply);
                prop_assert_eq!(borrowed, vault.total_borrowed);
                prop_assert_eq!(bearing, vault.total_interest_bearing);
                prop_assert!(vault.check_invariants().is_ok());
            }
        }
    }
}
