use anchor_lang::prelude::*;

// PDA Seeds
#[constant]
pub const AGGREGATOR_SEED: &[u8] = b"aggregator";
#[constant]
pub const COLLATERAL_VAULT_SEED: &[u8] = b"collateral_vault";
#[constant]
pub const USER_POSITION_SEED: &[u8] = b"user_position";
#[constant]
pub const STAKE_LEDGER_SEED: &[u8] = b"stake_ledger";
#[constant]
pub const STAKE_POSITION_SEED: &[u8] = b"stake_position";
#[constant]
pub const DISTRIBUTOR_SEED: &[u8] = b"distributor";

// Token account seeds
#[constant]
pub const IDLE_SEED: &[u8] = b"idle";
#[constant]
pub const DEBT_SEED: &[u8] = b"debt";
#[constant]
pub const REWARD_VAULT_SEED: &[u8] = b"reward_vault";
#[constant]
pub const STAKE_VAULT_SEED: &[u8] = b"stake_vault";
#[constant]
pub const REVENUE_VAULT_SEED: &[u8] = b"revenue_vault";
#[constant]
pub const SECONDARY_RESERVE_SEED: &[u8] = b"secondary_reserve";
#[constant]
pub const DISTRIBUTOR_BUFFER_SEED: &[u8] = b"distributor_buffer";

// WAD precision (1e18) for fixed-point math
pub const WAD: u128 = 1_000_000_000_000_000_000;

// Ratios are percentages scaled by WAD: 100% == 100e18
pub const ONE_HUNDRED_PERCENT: u128 = 100 * WAD;

// Price precision (1e6) matching USDC decimals
pub const PRICE_PRECISION: u64 = 1_000_000;

// Basis points denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

// Collateral ratio bounds (percent WAD)
pub const MIN_TARGET_COLLATERAL_RATIO: u128 = 110 * WAD;
pub const MAX_TARGET_COLLATERAL_RATIO: u128 = 1_000 * WAD;
pub const DEFAULT_TARGET_COLLATERAL_RATIO: u128 = 200 * WAD;

// Borrowing
pub const DEFAULT_MAX_BORROW_RATIO: u128 = 80 * WAD;
pub const DEFAULT_INTEREST_THRESHOLD_RATIO: u128 = 60 * WAD;
// ~2% per year in WAD per second
pub const DEFAULT_INTEREST_RATE_PER_SECOND: u128 = 634_195_839;
// 100% per year
pub const MAX_INTEREST_RATE_PER_SECOND: u128 = 31_709_791_983;

// Liquidation tiers (percent WAD)
pub const DEFAULT_STRESSED_BORROW_RATIO: u128 = 50 * WAD;
pub const DEFAULT_NORMAL_DISCOUNT: u128 = 105 * WAD;
pub const DEFAULT_NORMAL_CLOSE_FACTOR: u128 = 20 * WAD;
pub const DEFAULT_STRESSED_DISCOUNT: u128 = 110 * WAD;
pub const DEFAULT_STRESSED_CLOSE_FACTOR: u128 = 50 * WAD;
pub const MAX_LIQUIDATION_DISCOUNT: u128 = 150 * WAD;

// Reward split defaults (basis points of normal reward)
pub const DEFAULT_TREASURY_SHARE_BPS: u64 = 1_000; // 10%
pub const DEFAULT_STAKER_SHARE_BPS: u64 = 3_000; // 30%

// Rebasing assets lose a few base units per conversion
pub const DEFAULT_REBASE_DUST_OFFSET: u64 = 2;

// Oracle
pub const MAX_ORACLE_STALENESS: u64 = 60; // 60 seconds
// Confidence interval as a share of price, in bps
pub const MAX_ORACLE_CONFIDENCE_BPS: u64 = 200;
