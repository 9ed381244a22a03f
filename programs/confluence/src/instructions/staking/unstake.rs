use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::Unstaked;
use crate::instructions::staking::distribute::*;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::rewards::apply_unstake;
use crate::state::{Aggregator, StakeLedger, StakePosition};

#[derive(Accounts)]
pub struct Unstake<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
    )]
    pub aggregator: Box<Account<'info, Aggregator>>,

    #[account(
        mut,
        seeds = [STAKE_LEDGER_SEED],
        bump = stake_ledger.bump,
    )]
    pub stake_ledger: Box<Account<'info, StakeLedger>>,

    #[account(
        mut,
        seeds = [STAKE_POSITION_SEED, owner.key().as_ref()],
        bump = stake_position.bump,
        constraint = stake_position.owner == owner.key() @ ErrorCode::Unauthorized,
    )]
    pub stake_position: Box<Account<'info, StakePosition>>,

    #[account(
        mut,
        constraint = stake_vault.key() == stake_ledger.stake_vault @ ErrorCode::InvalidParameter,
    )]
    pub stake_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = user_incentive_account.owner == owner.key() @ ErrorCode::Unauthorized,
        constraint = user_incentive_account.mint == aggregator.incentive_mint @ ErrorCode::InvalidParameter,
    )]
    pub user_incentive_account: Box<Account<'info, TokenAccount>>,

    pub distributors: LedgerDistributors<'info>,

    pub token_program: Program<'info, Token>,
}

/// Unstaking stays open while paused so stakers can always exit.
pub fn handler(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let owner = ctx.accounts.owner.key();
    let accounts = ctx.accounts;

    accounts.distributors.flush(
        &accounts.aggregator,
        &mut accounts.stake_ledger,
        &accounts.token_program,
        now,
    )?;

    apply_unstake(&mut accounts.stake_ledger, &mut accounts.stake_position, amount)?;
    accounts.stake_position.last_updated = now;

    let seeds = &[AGGREGATOR_SEED, &[accounts.aggregator.bump]];
    let signer_seeds = &[&seeds[..]];
    transfer_from_pda(
        accounts.token_program.to_account_info(),
        accounts.stake_vault.to_account_info(),
        accounts.user_incentive_account.to_account_info(),
        accounts.aggregator.to_account_info(),
        signer_seeds,
        amount,
    )?;

    emit!(Unstaked {
        user: owner,
        amount,
        total_staked: accounts.stake_ledger.total_staked,
        timestamp: now,
    });

    Ok(())
}
