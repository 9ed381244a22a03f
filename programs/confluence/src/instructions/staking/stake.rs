use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::Staked;
use crate::instructions::staking::distribute::*;
use crate::instructions::token_transfer::transfer_from_user;
use crate::math::rewards::apply_stake;
use crate::state::{Aggregator, StakeLedger, StakePosition};

#[derive(Accounts)]
pub struct Stake<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = !aggregator.paused @ ErrorCode::AggregatorPaused,
    )]
    pub aggregator: Box<Account<'info, Aggregator>>,

    #[account(
        mut,
        seeds = [STAKE_LEDGER_SEED],
        bump = stake_ledger.bump,
    )]
    pub stake_ledger: Box<Account<'info, StakeLedger>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = StakePosition::LEN,
        seeds = [STAKE_POSITION_SEED, owner.key().as_ref()],
        bump,
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
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Stake>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);
    let now = Clock::get()?.unix_timestamp;
    let owner = ctx.accounts.owner.key();
    let bump = ctx.bumps.stake_position;
    let accounts = ctx.accounts;

    accounts.distributors.flush(
        &accounts.aggregator,
        &mut accounts.stake_ledger,
        &accounts.token_program,
        now,
    )?;

    let position = &mut accounts.stake_position;
    if position.owner == Pubkey::default() {
        position.owner = owner;
        position.bump = bump;
    }
    apply_stake(&mut accounts.stake_ledger, position, amount)?;
    position.last_updated = now;

    transfer_from_user(
        accounts.token_program.to_account_info(),
        accounts.user_incentive_account.to_account_info(),
        accounts.stake_vault.to_account_info(),
        accounts.owner.to_account_info(),
        amount,
    )?;

    emit!(Staked {
        user: owner,
        amount,
        total_staked: accounts.stake_ledger.total_staked,
        timestamp: now,
    });

    Ok(())
}
