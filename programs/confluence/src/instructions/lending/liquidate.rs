use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::PositionLiquidated;
use crate::instructions::rewards::update_reward_accumulators::*;
use crate::instructions::token_transfer::transfer_from_user;
use crate::math::collateral::transfer_supply;
use crate::math::interest::apply_repay;
use crate::math::liquidation::plan_liquidation;
use crate::math::oracle::get_price;
use crate::math::rewards::touch_position;
use crate::state::{Aggregator, CollateralVault, RateDistributor, UserPosition};

#[derive(Accounts)]
pub struct Liquidate<'info> {
    #[account(mut)]
    pub liquidator: Signer<'info>,

    /// CHECK: The borrower being liquidated
    #[account(
        constraint = borrower.key() != liquidator.key() @ ErrorCode::SelfLiquidation,
    )]
    pub borrower: UncheckedAccount<'info>,

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
        seeds = [USER_POSITION_SEED, collateral_vault.key().as_ref(), borrower.key().as_ref()],
        bump = borrower_position.bump,
    )]
    pub borrower_position: Box<Account<'info, UserPosition>>,

    #[account(
        init_if_needed,
        payer = liquidator,
        space = UserPosition::LEN,
        seeds = [USER_POSITION_SEED, collateral_vault.key().as_ref(), liquidator.key().as_ref()],
        bump,
    )]
    pub liquidator_position: Box<Account<'info, UserPosition>>,

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
        constraint = liquidator_debt_account.owner == liquidator.key() @ ErrorCode::Unauthorized,
        constraint = liquidator_debt_account.mint == aggregator.debt_mint @ ErrorCode::InvalidParameter,
    )]
    pub liquidator_debt_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: Pyth price feed, key checked against the vault
    #[account(
        constraint = oracle.key() == collateral_vault.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub oracle: UncheckedAccount<'info>,

    pub rewards: VaultRewardSync<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Single-shot liquidation. Seized collateral moves between positions; the
/// liquidator withdraws it like any other supply.
pub fn handler(ctx: Context<Liquidate>, repay_amount: u64) -> Result<()> {
    let vault_key = ctx.accounts.collateral_vault.key();
    let clock = Clock::get()?;
    let price = get_price(&ctx.accounts.oracle.to_account_info(), clock.unix_timestamp)?.price;
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
        clock.unix_timestamp,
    )?;

    let liquidator_position = &mut ctx.accounts.liquidator_position;
    if liquidator_position.owner == Pubkey::default() {
        liquidator_position.owner = ctx.accounts.liquidator.key();
        liquidator_position.vault = vault_key;
        liquidator_position.bump = ctx.bumps.liquidator_position;
    }

    let vault = &mut ctx.accounts.collateral_vault;
    let borrower_position = &mut ctx.accounts.borrower_position;

    let plan = plan_liquidation(vault, borrower_position, repay_amount, price)?;

    touch_position(vault, borrower_position)?;
    touch_position(vault, liquidator_position)?;

    let outcome = apply_repay(vault, borrower_position, plan.repay_amount, clock.unix_timestamp)?;
    transfer_supply(vault, borrower_position, liquidator_position, plan.seize_amount)?;
    borrower_position.last_updated = clock.unix_timestamp;
    liquidator_position.last_updated = clock.unix_timestamp;

    transfer_from_user(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.liquidator_debt_account.to_account_info(),
        ctx.accounts.debt_account.to_account_info(),
        ctx.accounts.liquidator.to_account_info(),
        outcome.principal_paid,
    )?;
    transfer_from_user(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.liquidator_debt_account.to_account_info(),
        ctx.accounts.revenue_buffer.to_account_info(),
        ctx.accounts.liquidator.to_account_info(),
        outcome.interest_paid,
    )?;

    emit!(PositionLiquidated {
        liquidator: ctx.accounts.liquidator.key(),
        account: ctx.accounts.borrower.key(),
        vault: vault_key,
        repay_amount: outcome.total(),
        seize_amount: plan.seize_amount,
        stressed: plan.stressed,
        price,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
