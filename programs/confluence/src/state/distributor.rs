use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum DistributorStatus {
    #[default]
    Uninitialized,
    Active,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum DistributorKind {
    /// Incentive token boost reward, paid into the reward vault
    #[default]
    Boost,
    /// Debt token interest revenue, paid into the revenue vault
    Revenue,
}

/// Linear-release buffer for one (token, receiver) pair.
#[account]
#[derive(Default, Debug)]
pub struct RateDistributor {
    pub bump: u8,
    pub kind: DistributorKind,
    pub mint: Pubkey,
    // Token account the released amount is paid into
    pub receiver: Pubkey,
    // Only this key may pull a distribution (the StakeLedger PDA)
    pub authority: Pubkey,
    // Token account holding undistributed tokens (authority = aggregator PDA)
    pub buffer: Pubkey,

    pub status: DistributorStatus,
    // Tokens released per second
    pub speed: u64,
    pub last_distribution_time: i64,
    pub total_distributed: u64,

    // Reserved
    pub _reserved: [u8; 32],
}

impl RateDistributor {
    pub const LEN: usize = 8  // discriminator
        + 1   // bump
        + 1   // kind
        + 32 * 4 // keys
        + 1   // status
        + 8   // speed
        + 8   // last_distribution_time
        + 8   // total_distributed
        + 32; // reserved
}
