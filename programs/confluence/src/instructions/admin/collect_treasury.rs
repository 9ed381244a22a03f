use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::TreasuryCollected;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::rewards::partial_payout;
use crate::state::{Aggregator, CollateralVault};

#[derive(Accounts)]
pub struct CollectTreasury<'info> {
    pub admin: Signer<'info>,

    #[account(
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = aggregator.admin == admin.key() @ ErrorCode::Unauthorized,
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
        constraint = idle_account.key() == collateral_vault.idle_account @ ErrorCode::VaultMismatch,
    )]
    pub idle_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = treasury_account.owner == aggregator.treasury_authority @ ErrorCode::Unauthorized,
        constraint = treasury_account.mint == collateral_vault.collateral_mint @ ErrorCode::InvalidParameter,
    )]
    pub treasury_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

/// Pay rebase yield forfeited by borrowers to the treasury.
pub fn handler(ctx: Context<CollectTreasury>) -> Result<()> {
    let vault_key = ctx.accounts.collateral_vault.key();
    let now = Clock::get()?.unix_timestamp;

    let owed = ctx.accounts.collateral_vault.rebase.treasury_accrued;
    require!(owed > 0, ErrorCode::NothingToClaim);
    let (_, available) = ctx
        .accounts
        .collateral_vault
        .rebase_surplus_split(ctx.accounts.idle_account.amount);
    let (paid, remaining) = partial_payout(owed, available);
    ctx.accounts.collateral_vault.rebase.treasury_accrued = remaining;

    let vault = &ctx.accounts.collateral_vault;
    let index_bytes = vault.index.to_le_bytes();
    let seeds = &[COLLATERAL_VAULT_SEED, index_bytes.as_ref(), &[vault.bump]];
    let signer_seeds = &[&seeds[..]];

    transfer_from_pda(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.idle_account.to_account_info(),
        ctx.accounts.treasury_account.to_account_info(),
        ctx.accounts.collateral_vault.to_account_info(),
        signer_seeds,
        paid,
    )?;

    emit!(TreasuryCollected {
        vault: vault_key,
        amount: paid,
        timestamp: now,
    });

    Ok(())
}
