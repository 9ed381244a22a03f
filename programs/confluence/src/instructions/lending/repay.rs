use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::RepayExecuted;
use crate::instructions::rewards::update_reward_accumulators::*;
use crate::instructions::token_transfer::transfer_from_user;
use crate::math::interest::apply_repay;
use crate::math::rewards::touch_position;
use crate::state::{Aggregator, CollateralVault, RateDistributor, UserPosition};

#[derive(Accounts)]
pub struct Repay<'info> {
    pub payer: Signer<'info>,

    /// CHECK: Owner of the position being repaid, used as a seed only
    pub account: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
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
        seeds = [USER_POSITION_SEED, collateral_vault.key().as_ref(), account.key().as_ref()],
        bump = user_position.bump,
    )]
    pub user_position: Box<Account<'info, UserPosition>>,

    #[account(
        constraint = idle_account.key() == collateral_vault.idle_account @ ErrorCode::VaultMismatch,
    )]
    pub idle_account: Box<Account<'info, TokenAccount>>,

    pub revenue_distributor: Box<Account<'info, RateDistributor>>,

    #[account(
        mut,
        constraint = revenue_buffer.key() == revenue_distributor.buffer @ ErrorCode::DistributorMismatch,
    )]
    pub revenue_buffer: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = debt_account.key() == collateral_vault.debt_account @ ErrorCode::VaultMismatch,
    )]
    pub debt_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = payer_debt_account.owner == payer.key() @ ErrorCode::Unauthorized,
        constraint = payer_debt_account.mint == aggregator.debt_mint @ ErrorCode::InvalidParameter,
    )]
    pub payer_debt_account: Box<Account<'info, TokenAccount>>,

    pub rewards: VaultRewardSync<'info>,

    pub token_program: Program<'info, Token>,
}

/// Repay `account`'s debt; anyone may pay. Interest goes to the revenue
/// distributor, principal back to the vault's minted headroom.
pub fn handler(ctx: Context<Repay>, amount: u64) -> Result<()> {
    let vault_key = ctx.accounts.collateral_vault.key();
    let now = Clock::get()?.unix_timestamp;
    require_keys_eq!(
        ctx.accounts.revenue_distributor.key(),
        ctx.accounts.rewards.stake_ledger.revenue_distributor,
        ErrorCode::DistributorMismatch
    );

    ctx.accounts.rewards.sync(
        &mut ctx.accounts.aggregator,
        &mut ctx.accounts.collateral_vault,
        &vault_key,
        ctx.accounts.idle_account.amount,
        now,
    )?;

    let vault = &mut ctx.accounts.collateral_vault;
    let position = &mut ctx.accounts.user_position;

    // A full repay restores rebase eligibility, settle it first
    touch_position(vault, position)?;
    let outcome = apply_repay(vault, position, amount, now)?;
    position.last_updated = now;

    transfer_from_user(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.payer_debt_account.to_account_info(),
        ctx.accounts.debt_account.to_account_info(),
        ctx.accounts.payer.to_account_info(),
        outcome.principal_paid,
    )?;
    transfer_from_user(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.payer_debt_account.to_account_info(),
        ctx.accounts.revenue_buffer.to_account_info(),
        ctx.accounts.payer.to_account_info(),
        outcome.interest_paid,
    )?;

    emit!(RepayExecuted {
        payer: ctx.accounts.payer.key(),
        account: ctx.accounts.account.key(),
        vault: vault_key,
        interest_paid: outcome.interest_paid,
        principal_paid: outcome.principal_paid,
        position_closed: outcome.position_closed,
        timestamp: now,
    });

    Ok(())
}
