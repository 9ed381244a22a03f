use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct BorrowPosition {
    pub principal: u64,
    // Portion of principal accruing interest
    pub interest_bearing_principal: u64,
    pub accrued_interest: u64,
    pub interest_timestamp: i64,
}

impl BorrowPosition {
    pub const LEN: usize = 8 * 4;

    pub fn is_empty(&self) -> bool {
        self.principal == 0 && self.accrued_interest == 0
    }
}

/// Claim state of one user in one reward-per-share pool.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct UserRewardAccount {
    pub accrued_reward: u64,
    pub reward_per_share_paid: u128,
}

impl UserRewardAccount {
    pub const LEN: usize = 8 + 16;
}

#[account]
#[derive(Default, Debug)]
pub struct UserPosition {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub bump: u8,

    // Idle + deposited collateral attributed to this user
    pub supplied_amount: u64,

    pub borrow: BorrowPosition,

    // Incentive-class and rebase-class pools of the vault
    pub incentive: UserRewardAccount,
    pub rebase: UserRewardAccount,

    // Timestamps
    pub last_updated: i64,

    // Reserved
    pub _reserved: [u8; 32],
}

impl UserPosition {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 32  // vault
        + 1   // bump
        + 8   // supplied_amount
        + BorrowPosition::LEN
        + UserRewardAccount::LEN * 2
        + 8   // last_updated
        + 32; // reserved

    /// Share of this position in the vault's rebase-class pool.
    pub fn rebase_share(&self) -> u64 {
        if self.borrow.principal == 0 {
            self.supplied_amount
        } else {
            0
        }
    }
}
