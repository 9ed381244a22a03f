use anchor_lang::prelude::*;
use crate::constants::*;
use crate::error::ErrorCode;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct LiquidationTier {
    // Percent WAD, e.g. 105e18 = collateral worth 105% of the repaid debt
    pub discount: u128,
    // Percent WAD of principal a single liquidation may repay
    pub close_factor: u128,
}

impl LiquidationTier {
    pub const LEN: usize = 16 * 2;

    pub fn validate(&self) -> Result<()> {
        require!(
            self.discount >= ONE_HUNDRED_PERCENT && self.discount <= MAX_LIQUIDATION_DISCOUNT,
            ErrorCode::InvalidLiquidationTier
        );
        require!(
            self.close_factor > 0 && self.close_factor <= ONE_HUNDRED_PERCENT,
            ErrorCode::InvalidLiquidationTier
        );
        Ok(())
    }
}

/// Per-vault policy. Engines receive it by reference; `version` increases on
/// every admin update so indexers can tell which policy produced an event.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct VaultConfig {
    pub version: u32,
    pub target_collateral_ratio: u128,
    pub min_deposit: u64,
    pub max_borrow_ratio: u128,
    pub interest_threshold_ratio: u128,
    pub interest_rate_per_second: u128,
    pub stressed_borrow_ratio: u128,
    pub normal_tier: LiquidationTier,
    pub stressed_tier: LiquidationTier,
    pub dust_offset: u64,
}

impl VaultConfig {
    pub const LEN: usize = 4
        + 16  // target_collateral_ratio
        + 8   // min_deposit
        + 16 * 4 // borrow ratios and rate
        + LiquidationTier::LEN * 2
        + 8;  // dust_offset

    pub fn validate(&self) -> Result<()> {
        require!(
            self.target_collateral_ratio >= MIN_TARGET_COLLATERAL_RATIO
                && self.target_collateral_ratio <= MAX_TARGET_COLLATERAL_RATIO,
            ErrorCode::InvalidCollateralRatio
        );
        require!(self.min_deposit > 0, ErrorCode::InvalidParameter);
        require!(
            self.max_borrow_ratio > 0 && self.max_borrow_ratio <= ONE_HUNDRED_PERCENT,
            ErrorCode::InvalidParameter
        );
        require!(
            self.interest_threshold_ratio <= ONE_HUNDRED_PERCENT,
            ErrorCode::InvalidParameter
        );
        require!(
            self.interest_rate_per_second <= MAX_INTEREST_RATE_PER_SECOND,
            ErrorCode::InvalidParameter
        );
        require!(
            self.stressed_borrow_ratio <= ONE_HUNDRED_PERCENT,
            ErrorCode::InvalidParameter
        );
        self.normal_tier.validate()?;
        self.stressed_tier.validate()?;
        require!(
            self.stressed_tier.discount >= self.normal_tier.discount
                && self.stressed_tier.close_factor >= self.normal_tier.close_factor,
            ErrorCode::InvalidLiquidationTier
        );
        Ok(())
    }
}

/// Incentive-class reward pool: suppliers of this vault share the supplier
/// cut of the normal reward by `supplied_amount`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IncentiveIndex {
    pub reward_per_share_stored: u128,
    // Last external rewardPerToken observed
    pub reward_per_share_checkpoint: u128,
    // Last external earned(aggregate) observed, reset on harvest
    pub earned_checkpoint: u64,
    pub last_update: i64,
}

impl IncentiveIndex {
    pub const LEN: usize = 16 * 2 + 8 + 8;
}

/// Rebase-class reward pool. Only suppliers without an open borrow share in it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct RebaseIndex {
    pub reward_per_share_stored: u128,
    // Sum of supplied_amount over positions with principal > 0
    pub ineligible_supply: u64,
    // Yield credited to the index and not yet claimed
    pub unclaimed: u64,
    // Forfeited yield owed to treasury
    pub treasury_accrued: u64,
}

impl RebaseIndex {
    pub const LEN: usize = 16 + 8 * 3;
}

#[account]
#[derive(Default, Debug)]
pub struct CollateralVault {
    pub aggregator: Pubkey,
    pub bump: u8,
    pub index: u16,

    // Vault reference (immutable once registered)
    pub collateral_mint: Pubkey,
    pub oracle: Pubkey,
    pub external_vault_program: Pubkey,
    pub external_vault_state: Pubkey,
    pub incentive_pool_program: Pubkey,
    pub incentive_pool_state: Pubkey,
    pub deposit_helper: Pubkey,
    pub is_rebasing: bool,

    // Custody (authority = this PDA)
    pub idle_account: Pubkey,
    pub debt_account: Pubkey,

    pub config: VaultConfig,

    // Vault aggregate
    pub total_supplied: u64,
    pub total_deposited: u64,
    pub total_minted: u64,
    pub total_borrowed: u64,
    pub total_interest_bearing: u64,

    pub incentive: IncentiveIndex,
    pub rebase: RebaseIndex,

    pub paused: bool,

    // Reserved for future use
    pub _reserved: [u8; 32],
}

impl CollateralVault {
    pub const LEN: usize = 8  // discriminator
        + 32  // aggregator
        + 1   // bump
        + 2   // index
        + 32 * 7 // vault reference keys
        + 1   // is_rebasing
        + 32 * 2 // custody
        + VaultConfig::LEN
        + 8 * 5 // aggregate
        + IncentiveIndex::LEN
        + RebaseIndex::LEN
        + 1   // paused
        + 32; // reserved

    /// Collateral held by this program and not placed with the external vault.
    pub fn idle_balance(&self) -> u64 {
        let idle = self.total_supplied.saturating_sub(self.total_deposited);
        if self.is_rebasing {
            idle.saturating_sub(self.config.dust_offset)
        } else {
            idle
        }
    }

    /// Tokens in the idle account beyond the users' idle collateral.
    pub fn idle_surplus(&self, idle_token_balance: u64) -> u64 {
        let owed = self.total_supplied.saturating_sub(self.total_deposited);
        idle_token_balance.saturating_sub(owed)
    }

    /// Idle surplus available to each rebase bucket as (suppliers, treasury).
    ///
    /// When the surplus covers both buckets each gets its full balance,
    /// otherwise the surplus is shared in proportion to what each is owed.
    pub fn rebase_surplus_split(&self, idle_token_balance: u64) -> (u64, u64) {
        let surplus = self.idle_surplus(idle_token_balance);
        let suppliers = self.rebase.unclaimed;
        let treasury = self.rebase.treasury_accrued;
        let owed = suppliers as u128 + treasury as u128;
        if owed <= surplus as u128 {
            return (suppliers, treasury);
        }
        // surplus < owed, so the share fits in u64
        let to_suppliers = (surplus as u128 * suppliers as u128 / owed) as u64;
        (to_suppliers, surplus - to_suppliers)
    }

    /// Shares eligible for the rebase-class pool.
    pub fn rebase_eligible_supply(&self) -> u64 {
        self.total_supplied.saturating_sub(self.rebase.ineligible_supply)
    }

    pub fn check_invariants(&self) -> Result<()> {
        require!(
            self.total_deposited <= self.total_supplied,
            ErrorCode::MathUnderflow
        );
        require!(
            self.total_borrowed <= self.total_minted,
            ErrorCode::MathUnderflow
        );
        require!(
            self.total_interest_bearing <= self.total_borrowed,
            ErrorCode::MathUnderflow
        );
        Ok(())
    }
}

pub fn default_vault_config(min_deposit: u64) -> VaultConfig {
    VaultConfig {
        version: 1,
        target_collateral_ratio: DEFAULT_TARGET_COLLATERAL_RATIO,
        min_deposit,
        max_borrow_ratio: DEFAULT_MAX_BORROW_RATIO,
        interest_threshold_ratio: DEFAULT_INTEREST_THRESHOLD_RATIO,
        interest_rate_per_second: DEFAULT_INTEREST_RATE_PER_SECOND,
        stressed_borrow_ratio: DEFAULT_STRESSED_BORROW_RATIO,
        normal_tier: LiquidationTier {
            discount: DEFAULT_NORMAL_DISCOUNT,
            close_factor: DEFAULT_NORMAL_CLOSE_FACTOR,
        },
        stressed_tier: LiquidationTier {
            discount: DEFAULT_STRESSED_DISCOUNT,
            close_factor: DEFAULT_STRESSED_CLOSE_FACTOR,
        },
        dust_offset: DEFAULT_REBASE_DUST_OFFSET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        default_vault_config(1_000_000).validate().unwrap();
    }

    #[test]
    fn stressed_tier_must_not_be_milder() {
        let mut config = default_vault_config(1);
        config.stressed_tier.close_factor = config.normal_tier.close_factor - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn idle_balance_applies_dust_only_when_rebasing() {
        let mut vault = CollateralVault {
            total_supplied: 100,
            total_deposited: 40,
            config: default_vault_config(1),
            ..Default::default()
        };
        assert_eq!(vault.idle_balance(), 60);
        vault.is_rebasing = true;
        assert_eq!(vault.idle_balance(), 60 - DEFAULT_REBASE_DUST_OFFSET);
        assert_eq!(vault.idle_surplus(75), 15);
        assert_eq!(vault.idle_surplus(50), 0);
    }

    #[test]
    fn rebase_buckets_do_not_draw_on_each_other() {
        let mut vault = CollateralVault {
            total_supplied: 1_000,
            total_deposited: 1_000,
            config: default_vault_config(1),
            ..Default::default()
        };
        vault.rebase.unclaimed = 75;
        vault.rebase.treasury_accrued = 25;

        assert_eq!(vault.rebase_surplus_split(500), (75, 25));
        // 40 of 100 owed is on hand
        assert_eq!(vault.rebase_surplus_split(40), (30, 10));

        // Suppliers drained their share, the treasury's stays reserved
        vault.rebase.unclaimed = 0;
        assert_eq!(vault.rebase_surplus_split(40), (0, 25));
    }

    #[test]
    fn interest_bearing_debt_cannot_exceed_borrowed() {
        let mut vault = CollateralVault {
            total_supplied: 10,
            total_minted: 100,
            total_borrowed: 40,
            total_interest_bearing: 40,
            ..Default::default()
        };
        vault.check_invariants().unwrap();
        vault.total_interest_bearing = 41;
        let err = vault.check_invariants().unwrap_err();
        assert_eq!(err, anchor_lang::error::Error::from(ErrorCode::MathUnderflow));
    }
}
