use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::CollateralSupplied;
use crate::instructions::collateral::rebalance::rebalance_vault;
use crate::instructions::rewards::update_reward_accumulators::*;
use crate::instructions::token_transfer::transfer_from_user;
use crate::math::collateral::record_supply;
use crate::math::oracle::get_price;
use crate::math::rewards::touch_position;
use crate::state::{Aggregator, CollateralVault, UserPosition};

#[derive(Accounts)]
pub struct Supply<'info> {
    #[account(mut)]
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
        init_if_needed,
        payer = owner,
        space = UserPosition::LEN,
        seeds = [USER_POSITION_SEED, collateral_vault.key().as_ref(), owner.key().as_ref()],
        bump,
    )]
    pub user_position: Box<Account<'info, UserPosition>>,

    #[account(
        mut,
        constraint = idle_account.key() == collateral_vault.idle_account @ ErrorCode::VaultMismatch,
    )]
    pub idle_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = user_token_account.owner == owner.key() @ ErrorCode::Unauthorized,
        constraint = user_token_account.mint == collateral_vault.collateral_mint @ ErrorCode::InvalidParameter,
    )]
    pub user_token_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: Pyth price feed, key checked against the vault
    #[account(
        constraint = oracle.key() == collateral_vault.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub oracle: UncheckedAccount<'info>,

    pub rewards: VaultRewardSync<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// remaining_accounts: [external vault program, its 8 accounts]
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Supply<'info>>,
    amount: u64,
) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);

    let vault_key = ctx.accounts.collateral_vault.key();
    let clock = Clock::get()?;
    let price = get_price(&ctx.accounts.oracle.to_account_info(), clock.unix_timestamp)?.price;

    // Indices first, against the idle balance before this transfer
    ctx.accounts.rewards.sync(
        &mut ctx.accounts.aggregator,
        &mut ctx.accounts.collateral_vault,
        &vault_key,
        ctx.accounts.idle_account.amount,
        clock.unix_timestamp,
    )?;

    let position = &mut ctx.accounts.user_position;
    if position.owner == Pubkey::default() {
        position.owner = ctx.accounts.owner.key();
        position.vault = vault_key;
        position.bump = ctx.bumps.user_position;
    }

    // Settle rewards under the old share
    touch_position(&ctx.accounts.collateral_vault, position)?;
    record_supply(&mut ctx.accounts.collateral_vault, position, amount)?;
    position.last_updated = clock.unix_timestamp;

    transfer_from_user(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.user_token_account.to_account_info(),
        ctx.accounts.idle_account.to_account_info(),
        ctx.accounts.owner.to_account_info(),
        amount,
    )?;

    rebalance_vault(
        &mut ctx.accounts.collateral_vault,
        ctx.remaining_accounts,
        price,
        clock.unix_timestamp,
    )?;

    emit!(CollateralSupplied {
        user: ctx.accounts.owner.key(),
        vault: vault_key,
        amount,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
