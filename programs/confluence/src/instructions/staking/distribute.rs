use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::RewardDistributed;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::distribution::flush_into_ledger;
use crate::state::{Aggregator, RateDistributor, StakeLedger};

#[derive(Accounts)]
pub struct Distribute<'info> {
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

/// Pull what `distributor` has released into the ledger's accumulator and
/// move the tokens from its buffer to its receiver.
#[allow(clippy::too_many_arguments)]
pub fn flush_distributor<'info>(
    aggregator: &Account<'info, Aggregator>,
    ledger: &mut Account<'info, StakeLedger>,
    distributor: &mut Account<'info, RateDistributor>,
    buffer: &Account<'info, TokenAccount>,
    receiver: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
    now: i64,
) -> Result<u64> {
    let ledger_key = ledger.key();
    let paid = flush_into_ledger(distributor, ledger, &ledger_key, buffer.amount, now)?;

    let seeds = &[AGGREGATOR_SEED, &[aggregator.bump]];
    let signer_seeds = &[&seeds[..]];
    transfer_from_pda(
        token_program.to_account_info(),
        buffer.to_account_info(),
        receiver.to_account_info(),
        aggregator.to_account_info(),
        signer_seeds,
        paid,
    )?;
    Ok(paid)
}

pub fn handler(ctx: Context<Distribute>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = ctx.accounts;

    let paid = flush_distributor(
        &accounts.aggregator,
        &mut accounts.stake_ledger,
        &mut accounts.distributor,
        &accounts.buffer,
        &accounts.receiver,
        &accounts.token_program,
        now,
    )?;

    emit!(RewardDistributed {
        distributor: accounts.distributor.key(),
        amount: paid,
        timestamp: now,
    });

    Ok(())
}

/// Both ledger distributors with their buffers and receivers. Flushed before
/// any change to total_staked so released rewards land on the old shares.
#[derive(Accounts)]
pub struct LedgerDistributors<'info> {
    #[account(mut)]
    pub boost_distributor: Box<Account<'info, RateDistributor>>,

    #[account(
        mut,
        constraint = boost_buffer.key() == boost_distributor.buffer @ ErrorCode::DistributorMismatch,
    )]
    pub boost_buffer: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = reward_vault.key() == boost_distributor.receiver @ ErrorCode::DistributorMismatch,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub revenue_distributor: Box<Account<'info, RateDistributor>>,

    #[account(
        mut,
        constraint = revenue_buffer.key() == revenue_distributor.buffer @ ErrorCode::DistributorMismatch,
    )]
    pub revenue_buffer: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = revenue_vault.key() == revenue_distributor.receiver @ ErrorCode::DistributorMismatch,
    )]
    pub revenue_vault: Box<Account<'info, TokenAccount>>,
}

impl<'info> LedgerDistributors<'info> {
    pub fn flush(
        &mut self,
        aggregator: &Account<'info, Aggregator>,
        ledger: &mut Account<'info, StakeLedger>,
        token_program: &Program<'info, Token>,
        now: i64,
    ) -> Result<()> {
        require_keys_eq!(
            self.boost_distributor.key(),
            ledger.boost_distributor,
            ErrorCode::DistributorMismatch
        );
        require_keys_eq!(
            self.revenue_distributor.key(),
            ledger.revenue_distributor,
            ErrorCode::DistributorMismatch
        );

        flush_distributor(
            aggregator,
            ledger,
            &mut self.boost_distributor,
            &self.boost_buffer,
            &self.reward_vault,
            token_program,
            now,
        )?;
        flush_distributor(
            aggregator,
            ledger,
            &mut self.revenue_distributor,
            &self.revenue_buffer,
            &self.revenue_vault,
            token_program,
            now,
        )?;
        self.reward_vault.reload()?;
        self.revenue_vault.reload()
    }
}
