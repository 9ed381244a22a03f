use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::AggregatorInitialized;
use crate::state::{Aggregator, RewardConfig, StakeLedger};

#[derive(Accounts)]
pub struct InitializeAggregator<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = Aggregator::LEN,
        seeds = [AGGREGATOR_SEED],
        bump,
    )]
    pub aggregator: Box<Account<'info, Aggregator>>,

    #[account(
        init,
        payer = admin,
        space = StakeLedger::LEN,
        seeds = [STAKE_LEDGER_SEED],
        bump,
    )]
    pub stake_ledger: Box<Account<'info, StakeLedger>>,

    pub debt_mint: Box<Account<'info, Mint>>,
    pub incentive_mint: Box<Account<'info, Mint>>,
    pub secondary_reserve_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        seeds = [REWARD_VAULT_SEED],
        bump,
        token::mint = incentive_mint,
        token::authority = aggregator,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        seeds = [STAKE_VAULT_SEED],
        bump,
        token::mint = incentive_mint,
        token::authority = aggregator,
    )]
    pub stake_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        seeds = [REVENUE_VAULT_SEED],
        bump,
        token::mint = debt_mint,
        token::authority = aggregator,
    )]
    pub revenue_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        seeds = [SECONDARY_RESERVE_SEED],
        bump,
        token::mint = secondary_reserve_mint,
        token::authority = aggregator,
    )]
    pub secondary_reserve: Box<Account<'info, TokenAccount>>,

    #[account(
        constraint = treasury_incentive.mint == incentive_mint.key() @ ErrorCode::InvalidParameter,
    )]
    pub treasury_incentive: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn handler(ctx: Context<InitializeAggregator>, reward_config: RewardConfig) -> Result<()> {
    reward_config.validate()?;

    let aggregator_key = ctx.accounts.aggregator.key();
    let now = Clock::get()?.unix_timestamp;

    let aggregator = &mut ctx.accounts.aggregator;
    aggregator.admin = ctx.accounts.admin.key();
    aggregator.bump = ctx.bumps.aggregator;
    aggregator.debt_mint = ctx.accounts.debt_mint.key();
    aggregator.incentive_mint = ctx.accounts.incentive_mint.key();
    aggregator.secondary_reserve_mint = ctx.accounts.secondary_reserve_mint.key();
    aggregator.reward_vault = ctx.accounts.reward_vault.key();
    aggregator.treasury_incentive = ctx.accounts.treasury_incentive.key();
    aggregator.treasury_authority = ctx.accounts.treasury_incentive.owner;
    aggregator.reward_config = reward_config;
    aggregator.config_version = 1;
    aggregator.treasury_incentive_accrued = 0;
    aggregator.vault_count = 0;
    aggregator.paused = false;

    let ledger = &mut ctx.accounts.stake_ledger;
    ledger.aggregator = aggregator_key;
    ledger.bump = ctx.bumps.stake_ledger;
    ledger.stake_vault = ctx.accounts.stake_vault.key();
    ledger.revenue_vault = ctx.accounts.revenue_vault.key();
    ledger.secondary_reserve = ctx.accounts.secondary_reserve.key();
    ledger.last_update = now;

    emit!(AggregatorInitialized {
        admin: ctx.accounts.admin.key(),
        debt_mint: ctx.accounts.debt_mint.key(),
        incentive_mint: ctx.accounts.incentive_mint.key(),
        timestamp: now,
    });

    Ok(())
}
