use anchor_lang::prelude::*;
use crate::constants::BPS_DENOMINATOR;
use crate::error::ErrorCode;

/// Split of the normal incentive reward. Supplier share is the remainder.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct RewardConfig {
    pub treasury_share_bps: u64,
    pub staker_share_bps: u64,
}

impl RewardConfig {
    pub const LEN: usize = 8 * 2;

    pub fn validate(&self) -> Result<()> {
        let total = self
            .treasury_share_bps
            .checked_add(self.staker_share_bps)
            .ok_or(ErrorCode::MathOverflow)?;
        require!(total <= BPS_DENOMINATOR, ErrorCode::InvalidRewardSplit);
        Ok(())
    }
}

#[account]
#[derive(Default, Debug)]
pub struct Aggregator {
    pub admin: Pubkey,
    pub bump: u8,

    // Mints
    pub debt_mint: Pubkey,
    pub incentive_mint: Pubkey,
    pub secondary_reserve_mint: Pubkey,

    // Custody (authority = this PDA)
    pub reward_vault: Pubkey,

    // Treasury token accounts
    pub treasury_incentive: Pubkey,
    pub treasury_authority: Pubkey,

    pub reward_config: RewardConfig,
    pub config_version: u32,

    // Incentive reward owed to treasury, paid on harvest
    pub treasury_incentive_accrued: u64,

    // Registry length; vault indices are 0..vault_count
    pub vault_count: u16,

    pub paused: bool,

    // Reserved for future use
    pub _reserved: [u8; 32],
}

impl Aggregator {
    pub const LEN: usize = 8 // discriminator
        + 32  // admin
        + 1   // bump
        + 32 * 3 // mints
        + 32  // reward_vault
        + 32 * 2 // treasury
        + RewardConfig::LEN
        + 4   // config_version
        + 8   // treasury_incentive_accrued
        + 2   // vault_count
        + 1   // paused
        + 32; // reserved
}
