use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::state::{Aggregator, DistributorKind, DistributorStatus, RateDistributor, StakeLedger};

#[derive(Accounts)]
pub struct InitializeDistributor<'info> {
    #[account(mut)]
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

    pub mint: Box<Account<'info, Mint>>,

    // Boost pays into the reward vault, revenue into the revenue vault
    pub receiver: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        space = RateDistributor::LEN,
        seeds = [DISTRIBUTOR_SEED, mint.key().as_ref(), receiver.key().as_ref()],
        bump,
    )]
    pub distributor: Box<Account<'info, RateDistributor>>,

    #[account(
        init,
        payer = admin,
        seeds = [DISTRIBUTOR_BUFFER_SEED, distributor.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = aggregator,
    )]
    pub buffer: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn handler(ctx: Context<InitializeDistributor>, kind: DistributorKind) -> Result<()> {
    let (expected_mint, expected_receiver) = match kind {
        DistributorKind::Boost => (
            ctx.accounts.aggregator.incentive_mint,
            ctx.accounts.aggregator.reward_vault,
        ),
        DistributorKind::Revenue => (
            ctx.accounts.aggregator.debt_mint,
            ctx.accounts.stake_ledger.revenue_vault,
        ),
    };
    require_keys_eq!(ctx.accounts.mint.key(), expected_mint, ErrorCode::InvalidParameter);
    require_keys_eq!(ctx.accounts.receiver.key(), expected_receiver, ErrorCode::InvalidParameter);

    let distributor_key = ctx.accounts.distributor.key();
    let ledger_key = ctx.accounts.stake_ledger.key();

    let distributor = &mut ctx.accounts.distributor;
    distributor.bump = ctx.bumps.distributor;
    distributor.kind = kind;
    distributor.mint = ctx.accounts.mint.key();
    distributor.receiver = ctx.accounts.receiver.key();
    distributor.authority = ledger_key;
    distributor.buffer = ctx.accounts.buffer.key();
    distributor.status = DistributorStatus::Uninitialized;

    let ledger = &mut ctx.accounts.stake_ledger;
    match kind {
        DistributorKind::Boost => ledger.boost_distributor = distributor_key,
        DistributorKind::Revenue => ledger.revenue_distributor = distributor_key,
    }

    msg!("distributor {:?} created, inactive until a speed is set", kind);
    Ok(())
}
