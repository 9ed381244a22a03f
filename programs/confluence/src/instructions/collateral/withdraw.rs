use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::adapters::ExternalVault;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::CollateralWithdrawn;
use crate::instructions::rewards::update_reward_accumulators::*;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::collateral::{apply_withdraw, free_balance, plan_withdraw, record_withdraw};
use crate::math::oracle::get_price;
use crate::math::rewards::touch_position;
use crate::state::{Aggregator, CollateralVault, UserPosition};

#[derive(Accounts)]
pub struct Withdraw<'info> {
    pub owner: Signer<'info>,

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
        seeds = [USER_POSITION_SEED, collateral_vault.key().as_ref(), owner.key().as_ref()],
        bump = user_position.bump,
        constraint = user_position.owner == owner.key() @ ErrorCode::Unauthorized,
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
}

/// Withdraw from the user's free balance. Idle funds go first, then deposit
/// surplus; unborrowed debt is burned when the rest would breach the ratio.
///
/// remaining_accounts: [external vault program, its 8 accounts], needed only
/// when idle funds fall short.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    amount: u64,
) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);

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

    let free = free_balance(position, price, &vault.config)?;
    require!(amount <= free, ErrorCode::WithdrawExceedsFreeBalance);

    let plan = plan_withdraw(vault, amount, price)?;

    // Ledger first, collaborators after
    touch_position(vault, position)?;
    apply_withdraw(vault, &plan)?;
    record_withdraw(vault, position, amount, price)?;
    position.last_updated = clock.unix_timestamp;

    let index_bytes = vault.index.to_le_bytes();
    let seeds = &[COLLATERAL_VAULT_SEED, index_bytes.as_ref(), &[vault.bump]];
    let signer_seeds = &[&seeds[..]];

    if plan.burn > 0 || plan.external_withdraw > 0 {
        let external = ExternalVault::from_remaining(
            ctx.remaining_accounts,
            &vault.external_vault_program,
            &vault.external_vault_state,
        )?;
        external.execute_withdraw(&plan, signer_seeds)?;
    }

    transfer_from_pda(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.idle_account.to_account_info(),
        ctx.accounts.user_token_account.to_account_info(),
        vault.to_account_info(),
        signer_seeds,
        amount,
    )?;

    emit!(CollateralWithdrawn {
        user: ctx.accounts.owner.key(),
        vault: vault_key,
        amount,
        burned: plan.burn,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
