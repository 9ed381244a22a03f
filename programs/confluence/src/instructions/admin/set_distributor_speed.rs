use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::DistributorSpeedSet;
use crate::instructions::staking::distribute::flush_distributor;
use crate::math::distribution::commit_speed;
use crate::state::{Aggregator, RateDistributor, StakeLedger};

#[derive(Accounts)]
pub struct SetDistributorSpeed<'info> {
    pub admin: Signer<'info>,

    #[account(
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = aggregator.admin == admin.key() @ ErrorCode::Unauthorized,
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
        seeds = [DISTRIBUTOR_SEED, distributor.mint.as_ref(), distributor.receiver.as_ref()],
        bump = distributor.bump,
        constraint = distributor.authority == stake_ledger.key() @ ErrorCode::DistributorMismatch,
    )]
    pub distributor: Box<Account<'info, RateDistributor>>,

    #[account(
        mut,
        constraint = buffer.key() == distributor.buffer @ ErrorCode::DistributorMismatch,
    )]
    pub buffer: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = receiver.key() == distributor.receiver @ ErrorCode::DistributorMismatch,
    )]
    pub receiver: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

/// Two steps: flush what the old speed released, then start the new speed from now.
pub fn handler(ctx: Context<SetDistributorSpeed>, speed: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = ctx.accounts;

    let flushed = flush_distributor(
        &accounts.aggregator,
        &mut accounts.stake_ledger,
        &mut accounts.distributor,
        &accounts.buffer,
        &accounts.receiver,
        &accounts.token_program,
        now,
    )?;

    commit_speed(&mut accounts.distributor, speed, now);

    emit!(DistributorSpeedSet {
        distributor: accounts.distributor.key(),
        flushed,
        speed,
        timestamp: now,
    });

    Ok(())
}
