use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::Compounded;
use crate::instructions::staking::distribute::*;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::rewards::{apply_stake, partial_payout, touch_stake};
use crate::state::{Aggregator, StakeLedger, StakePosition};

#[derive(Accounts)]
pub struct Compound<'info> {
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

    pub distributors: LedgerDistributors<'info>,

    pub token_program: Program<'info, Token>,
}

/// Restake incentive-token rewards (staking share and boost) without a
/// round trip through the user's wallet.
pub fn handler(ctx: Context<Compound>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let owner = ctx.accounts.owner.key();
    let accounts = ctx.accounts;

    accounts.distributors.flush(
        &accounts.aggregator,
        &mut accounts.stake_ledger,
        &accounts.token_program,
        now,
    )?;

    let position = &mut accounts.stake_position;
    touch_stake(&accounts.stake_ledger, position)?;
    let owed = position
        .staking_reward
        .accrued_reward
        .checked_add(position.pending_reward)
        .ok_or(ErrorCode::MathOverflow)?;
    let (amount, _) = partial_payout(owed, accounts.distributors.reward_vault.amount);
    require!(amount > 0, ErrorCode::NothingToClaim);

    let from_staking = amount.min(position.staking_reward.accrued_reward);
    position.staking_reward.accrued_reward -= from_staking;
    position.pending_reward -= amount - from_staking;

    apply_stake(&mut accounts.stake_ledger, position, amount)?;
    position.last_updated = now;

    let seeds = &[AGGREGATOR_SEED, &[accounts.aggregator.bump]];
    let signer_seeds = &[&seeds[..]];
    transfer_from_pda(
        accounts.token_program.to_account_info(),
        accounts.distributors.reward_vault.to_account_info(),
        accounts.stake_vault.to_account_info(),
        accounts.aggregator.to_account_info(),
        signer_seeds,
        amount,
    )?;

    emit!(Compounded {
        user: owner,
        amount,
        timestamp: now,
    });

    Ok(())
}
