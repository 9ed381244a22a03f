#![allow(ambiguous_glob_reexports)]

pub mod constants;
pub mod error;
pub mod events;
pub mod state;
pub mod math;
pub mod instructions;
pub mod adapters;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("5QgkRsu6YF2A5k9dTEVdnyUdBuDU3Fy6oUDQdRLRoKtc");

#[program]
pub mod confluence {
    use super::*;

    // ── Admin ───────────────────────────────────────────────

    pub fn initialize_aggregator(
        ctx: Context<InitializeAggregator>,
        reward_config: RewardConfig,
    ) -> Result<()> {
        instructions::admin::initialize_aggregator::handler(ctx, reward_config)
    }

    pub fn register_vault(
        ctx: Context<RegisterVault>,
        params: instructions::admin::register_vault::RegisterVaultParams,
    ) -> Result<()> {
        instructions::admin::register_vault::handler(ctx, params)
    }

    pub fn update_vault_config(ctx: Context<UpdateVaultConfig>, config: VaultConfig) -> Result<()> {
        instructions::admin::update_vault_config::handler(ctx, config)
    }

    pub fn update_reward_config(
        ctx: Context<UpdateRewardConfig>,
        reward_config: RewardConfig,
    ) -> Result<()> {
        instructions::admin::update_reward_config::handler(ctx, reward_config)
    }

    pub fn set_paused(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
        instructions::admin::set_paused::handler(ctx, paused)
    }

    pub fn set_vault_paused(ctx: Context<SetVaultPaused>, paused: bool) -> Result<()> {
        instructions::admin::set_vault_paused::handler(ctx, paused)
    }

    pub fn initialize_distributor(
        ctx: Context<InitializeDistributor>,
        kind: DistributorKind,
    ) -> Result<()> {
        instructions::admin::initialize_distributor::handler(ctx, kind)
    }

    pub fn set_distributor_speed(ctx: Context<SetDistributorSpeed>, speed: u64) -> Result<()> {
        instructions::admin::set_distributor_speed::handler(ctx, speed)
    }

    pub fn collect_treasury(ctx: Context<CollectTreasury>) -> Result<()> {
        instructions::admin::collect_treasury::handler(ctx)
    }

    // ── Collateral ──────────────────────────────────────────

    pub fn supply<'info>(
        ctx: Context<'_, '_, 'info, 'info, Supply<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::collateral::supply::handler(ctx, amount)
    }

    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::collateral::withdraw::handler(ctx, amount)
    }

    pub fn rebalance<'info>(ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>) -> Result<()> {
        instructions::collateral::rebalance::handler(ctx)
    }

    // ── Lending ─────────────────────────────────────────────

    pub fn borrow(ctx: Context<Borrow>, amount: u64) -> Result<()> {
        instructions::lending::borrow::handler(ctx, amount)
    }

    pub fn repay(ctx: Context<Repay>, amount: u64) -> Result<()> {
        instructions::lending::repay::handler(ctx, amount)
    }

    pub fn liquidate(ctx: Context<Liquidate>, repay_amount: u64) -> Result<()> {
        instructions::lending::liquidate::handler(ctx, repay_amount)
    }

    // ── Rewards ─────────────────────────────────────────────

    pub fn update_reward_accumulators(ctx: Context<UpdateRewardAccumulators>) -> Result<()> {
        instructions::rewards::update_reward_accumulators::handler(ctx)
    }

    pub fn harvest<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<()> {
        instructions::rewards::harvest::handler(ctx)
    }

    pub fn claim(
        ctx: Context<Claim>,
        pool: instructions::rewards::claim::RewardPool,
    ) -> Result<()> {
        instructions::rewards::claim::handler(ctx, pool)
    }

    pub fn claim_all(ctx: Context<Claim>) -> Result<()> {
        instructions::rewards::claim::claim_all_handler(ctx)
    }

    // ── Staking ─────────────────────────────────────────────

    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::staking::stake::handler(ctx, amount)
    }

    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        instructions::staking::unstake::handler(ctx, amount)
    }

    pub fn compound(ctx: Context<Compound>) -> Result<()> {
        instructions::staking::compound::handler(ctx)
    }

    pub fn distribute(ctx: Context<Distribute>) -> Result<()> {
        instructions::staking::distribute::handler(ctx)
    }
}
