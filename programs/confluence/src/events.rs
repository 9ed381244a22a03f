use anchor_lang::prelude::*;

// Admin events
#[event]
pub struct AggregatorInitialized {
    pub admin: Pubkey,
    pub debt_mint: Pubkey,
    pub incentive_mint: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct VaultRegistered {
    pub vault: Pubkey,
    pub index: u16,
    pub collateral_mint: Pubkey,
    pub is_rebasing: bool,
    pub timestamp: i64,
}

#[event]
pub struct VaultConfigUpdated {
    pub vault: Pubkey,
    pub version: u32,
    pub target_collateral_ratio: u128,
    pub timestamp: i64,
}

#[event]
pub struct RewardConfigUpdated {
    pub version: u32,
    pub treasury_share_bps: u64,
    pub staker_share_bps: u64,
    pub timestamp: i64,
}

#[event]
pub struct PauseToggled {
    pub paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct VaultPauseToggled {
    pub vault: Pubkey,
    pub paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct TreasuryCollected {
    pub vault: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

// Collateral events
#[event]
pub struct CollateralSupplied {
    pub user: Pubkey,
    pub vault: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct CollateralWithdrawn {
    pub user: Pubkey,
    pub vault: Pubkey,
    pub amount: u64,
    pub burned: u64,
    pub timestamp: i64,
}

#[event]
pub struct VaultRebalanced {
    pub vault: Pubkey,
    pub deposited: u64,
    pub minted: u64,
    pub total_deposited: u64,
    pub total_minted: u64,
    pub price: u64,
    pub config_version: u32,
    pub timestamp: i64,
}

// Lending events
#[event]
pub struct BorrowExecuted {
    pub user: Pubkey,
    pub vault: Pubkey,
    pub amount: u64,
    pub interest_bearing: bool,
    pub timestamp: i64,
}

#[event]
pub struct RepayExecuted {
    pub payer: Pubkey,
    pub account: Pubkey,
    pub vault: Pubkey,
    pub interest_paid: u64,
    pub principal_paid: u64,
    pub position_closed: bool,
    pub timestamp: i64,
}

#[event]
pub struct PositionLiquidated {
    pub liquidator: Pubkey,
    pub account: Pubkey,
    pub vault: Pubkey,
    pub repay_amount: u64,
    pub seize_amount: u64,
    pub stressed: bool,
    pub price: u64,
    pub timestamp: i64,
}

// Reward events
#[event]
pub struct RewardAccumulatorsUpdated {
    pub vault: Pubkey,
    pub normal_reward: u64,
    pub boost_reward: u64,
    pub rebase_yield: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardsHarvested {
    pub vault: Pubkey,
    pub boost_to_distributor: u64,
    pub treasury_paid: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardClaimed {
    pub user: Pubkey,
    pub pool: u8,
    pub amount: u64,
    pub secondary_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct DistributorSpeedSet {
    pub distributor: Pubkey,
    pub flushed: u64,
    pub speed: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardDistributed {
    pub distributor: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

// Staking events
#[event]
pub struct Staked {
    pub user: Pubkey,
    pub amount: u64,
    pub total_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct Unstaked {
    pub user: Pubkey,
    pub amount: u64,
    pub total_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct Compounded {
    pub user: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}
