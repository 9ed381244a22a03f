use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::BorrowExecuted;
use crate::instructions::rewards::update_reward_accumulators::*;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::interest::apply_borrow;
use crate::math::oracle::get_price;
use crate::math::rewards::touch_position;
use crate::state::{Aggregator, CollateralVault, UserPosition};

#[derive(Accounts)]
pub struct Borrow<'info> {
    pub owner: Signer<'info>,

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
        constraint = !collateral_vault.paused @ ErrorCode::AggregatorPaused,
    )]
    pub collateral_vault: Box<Account<'info, CollateralVault>>,

    #[account(
        mut,
        seeds = [USER_POSITION_SEED, collateral_vault.key().as_ref(), owner.key().as_ref()],
        bump = user_position.bump,
        constraint = user_position.owner == owner.key() @ ErrorCode::Unauthorized,
    )]
    pub user_position: Box<Account<'info, UserPosition>>,

    #[account(
        constraint = idle_account.key() == collateral_vault.idle_account @ ErrorCode::VaultMismatch,
    )]
    pub idle_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = debt_account.key() == collateral_vault.debt_account @ ErrorCode::VaultMismatch,
    )]
    pub debt_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = user_debt_account.owner == owner.key() @ ErrorCode::Unauthorized,
        constraint = user_debt_account.mint == aggregator.debt_mint @ ErrorCode::InvalidParameter,
    )]
    pub user_debt_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: Pyth price feed, key checked against the vault
    #[account(
        constraint = oracle.key() == collateral_vault.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub oracle: UncheckedAccount<'info>,

    pub rewards: VaultRewardSync<'info>,

    pub token_program: Program<'info, Token>,
}

/// Draw minted debt held by the vault against the user's supply.
pub fn handler(ctx: Context<Borrow>, amount: u64) -> Result<()> {
    let vault_key = ctx.accounts.collateral_vault.key();
    let clock = Clock::get()?;
    let price = get_price(&ctx.accounts.oracle.to_account_info(), clock.unix_timestamp)?.price;

    ctx.accounts.rewards.sync(
        &mut ctx.accounts.aggregator,
        &mut ctx.accounts.collateral_vault,
        &vault_key,
        ctx.accounts.idle_account.amount,
        clock.unix_timestamp,
    )?;

    let vault = &mut ctx.accounts.collateral_vault;
    let position = &mut ctx.accounts.user_position;

    // A first borrow ends rebase eligibility, settle it first
    touch_position(vault, position)?;
    let interest_bearing = apply_borrow(vault, position, amount, price, clock.unix_timestamp)?;
    position.last_updated = clock.unix_timestamp;

    let index_bytes = vault.index.to_le_bytes();
    let seeds = &[COLLATERAL_VAULT_SEED, index_bytes.as_ref(), &[vault.bump]];
    let signer_seeds = &[&seeds[..]];

    transfer_from_pda(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.debt_account.to_account_info(),
        ctx.accounts.user_debt_account.to_account_info(),
        vault.to_account_info(),
        signer_seeds,
        amount,
    )?;

    emit!(BorrowExecuted {
        user: ctx.accounts.owner.key(),
        vault: vault_key,
        amount,
        interest_bearing,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
