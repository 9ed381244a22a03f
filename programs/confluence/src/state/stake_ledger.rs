use anchor_lang::prelude::*;
use crate::state::UserRewardAccount;

/// Second-layer ledger for the staked incentive token.
///
/// Runs three accumulators over `total_staked`:
/// - `staking_reward_per_share`: staker cut of the normal incentive reward
/// - `boost_per_share`: boost reward released by the boost distributor
/// - `revenue_per_share`: interest revenue released by the revenue distributor
#[account]
#[derive(Default, Debug)]
pub struct StakeLedger {
    pub aggregator: Pubkey,
    pub bump: u8,

    // Custody (authority = aggregator PDA)
    pub stake_vault: Pubkey,
    pub revenue_vault: Pubkey,
    pub secondary_reserve: Pubkey,

    // Distributors feeding this ledger
    pub boost_distributor: Pubkey,
    pub revenue_distributor: Pubkey,

    pub total_staked: u64,

    pub staking_reward_per_share: u128,
    pub boost_per_share: u128,
    pub revenue_per_share: u128,

    // Boost reward accrued by the accumulator but not yet moved to the boost distributor
    pub pending_boost: u64,

    // Staker cut that arrived while nothing was staked
    pub unallocated_staking_reward: u64,

    pub last_update: i64,

    // Reserved
    pub _reserved: [u8; 32],
}

impl StakeLedger {
    pub const LEN: usize = 8  // discriminator
        + 32  // aggregator
        + 1   // bump
        + 32 * 3 // custody
        + 32 * 2 // distributors
        + 8   // total_staked
        + 16 * 3 // accumulators
        + 8   // pending_boost
        + 8   // unallocated_staking_reward
        + 8   // last_update
        + 32; // reserved
}

#[account]
#[derive(Default, Debug)]
pub struct StakePosition {
    pub owner: Pubkey,
    pub bump: u8,

    pub staked_amount: u64,

    // Staking-class pool claim state
    pub staking_reward: UserRewardAccount,

    // Reward debts: staked_amount * index / WAD at last settlement
    pub boost_reward_debt: u128,
    pub protocol_revenue_debt: u128,
    pub pending_reward: u64,
    pub pending_protocol_revenue: u64,

    pub last_updated: i64,

    // Reserved
    pub _reserved: [u8; 32],
}

impl StakePosition {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 1   // bump
        + 8   // staked_amount
        + UserRewardAccount::LEN
        + 16 * 2 // reward debts
        + 8 * 2 // pending
        + 8   // last_updated
        + 32; // reserved
}
