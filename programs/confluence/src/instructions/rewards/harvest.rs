use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::adapters::{load_snapshot, IncentivePool};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::RewardsHarvested;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::rewards::{mark_harvested, partial_payout, update_incentive_accumulators};
use crate::state::{Aggregator, CollateralVault, RateDistributor, StakeLedger};

#[derive(Accounts)]
pub struct Harvest<'info> {
    #[account(
        mut,
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = !aggregator.paused @ ErrorCode::AggregatorPaused,
    )]
    pub aggregator: Box<Account<'info, Aggregator>>,

    #[account(
        mut,
        seeds = [COLLATERAL_VAULT_SEED, &collateral_vault.index.to_le_bytes()],
        bump = collateral_vault.bump,
        constraint = collateral_vault.aggregator == aggregator.key() @ ErrorCode::VaultMismatch,
    )]
    pub collateral_vault: Box<Account<'info, CollateralVault>>,

    #[account(
        mut,
        seeds = [STAKE_LEDGER_SEED],
        bump = stake_ledger.bump,
    )]
    pub stake_ledger: Box<Account<'info, StakeLedger>>,

    #[account(
        mut,
        constraint = reward_vault.key() == aggregator.reward_vault @ ErrorCode::InvalidParameter,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        constraint = boost_distributor.key() == stake_ledger.boost_distributor @ ErrorCode::DistributorMismatch,
    )]
    pub boost_distributor: Box<Account<'info, RateDistributor>>,

    #[account(
        mut,
        constraint = boost_buffer.key() == boost_distributor.buffer @ ErrorCode::DistributorMismatch,
    )]
    pub boost_buffer: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = treasury_incentive.key() == aggregator.treasury_incentive @ ErrorCode::InvalidParameter,
    )]
    pub treasury_incentive: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

/// Claim the vault's incentive pool rewards into the reward vault, then
/// forward the boost to its distributor and the treasury cut to treasury.
///
/// remaining_accounts: incentive pool program followed by its get_reward accounts.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<()> {
    let vault_key = ctx.accounts.collateral_vault.key();
    let now = Clock::get()?.unix_timestamp;
    let remaining = ctx.remaining_accounts;
    let accounts = ctx.accounts;

    let pool = IncentivePool::from_remaining(
        remaining,
        &accounts.collateral_vault.incentive_pool_program,
    )?;
    require_keys_eq!(
        pool.pool_account().key(),
        accounts.collateral_vault.incentive_pool_state,
        ErrorCode::IncentivePoolDataInvalid
    );
    require_keys_eq!(
        pool.reward_destination().key(),
        accounts.reward_vault.key(),
        ErrorCode::IncentivePoolDataInvalid
    );

    let snapshot = load_snapshot(
        pool.pool_account(),
        pool.position_account(),
        &accounts.collateral_vault.incentive_pool_program,
        &vault_key,
    )?;
    update_incentive_accumulators(
        &mut accounts.aggregator,
        &mut accounts.collateral_vault,
        &mut accounts.stake_ledger,
        &snapshot,
        now,
    )?;
    mark_harvested(&mut accounts.collateral_vault);

    let boost_owed = std::mem::take(&mut accounts.stake_ledger.pending_boost);
    let treasury_owed = std::mem::take(&mut accounts.aggregator.treasury_incentive_accrued);

    {
        let vault = &accounts.collateral_vault;
        let index_bytes = vault.index.to_le_bytes();
        let seeds = &[COLLATERAL_VAULT_SEED, index_bytes.as_ref(), &[vault.bump]];
        pool.get_reward(&[&seeds[..]])?;
    }
    accounts.reward_vault.reload()?;

    let available = accounts.reward_vault.amount;
    let (boost_paid, boost_left) = partial_payout(boost_owed, available);
    let (treasury_paid, treasury_left) = partial_payout(treasury_owed, available - boost_paid);
    accounts.stake_ledger.pending_boost = boost_left;
    accounts.aggregator.treasury_incentive_accrued = treasury_left;
    if boost_left > 0 || treasury_left > 0 {
        msg!(
            "Reward vault short: boost {} and treasury {} carried over",
            boost_left,
            treasury_left
        );
    }

    let seeds = &[AGGREGATOR_SEED, &[accounts.aggregator.bump]];
    let signer_seeds = &[&seeds[..]];
    transfer_from_pda(
        accounts.token_program.to_account_info(),
        accounts.reward_vault.to_account_info(),
        accounts.boost_buffer.to_account_info(),
        accounts.aggregator.to_account_info(),
        signer_seeds,
        boost_paid,
    )?;
    transfer_from_pda(
        accounts.token_program.to_account_info(),
        accounts.reward_vault.to_account_info(),
        accounts.treasury_incentive.to_account_info(),
        accounts.aggregator.to_account_info(),
        signer_seeds,
        treasury_paid,
    )?;

    emit!(RewardsHarvested {
        vault: vault_key,
        boost_to_distributor: boost_paid,
        treasury_paid,
        timestamp: now,
    });

    Ok(())
}
