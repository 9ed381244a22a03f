use anchor_lang::prelude::*;
use crate::adapters::ExternalVault;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::VaultRebalanced;
use crate::math::collateral::{apply_rebalance, plan_rebalance, RebalancePlan};
use crate::math::oracle::get_price;
use crate::state::{Aggregator, CollateralVault};

#[derive(Accounts)]
pub struct Rebalance<'info> {
    #[account(
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

    /// CHECK: Pyth price feed, key checked against the vault
    #[account(
        constraint = oracle.key() == collateral_vault.oracle @ ErrorCode::OracleAccountMismatch,
    )]
    pub oracle: UncheckedAccount<'info>,
}

/// Plan, book, then carry out a rebalance against the external vault.
///
/// remaining_accounts: [external vault program, its 8 accounts]
pub fn rebalance_vault<'info>(
    vault: &mut Account<'info, CollateralVault>,
    remaining_accounts: &[AccountInfo<'info>],
    price: u64,
    now: i64,
) -> Result<RebalancePlan> {
    let plan = plan_rebalance(vault, price)?;
    if plan.is_noop() {
        return Ok(plan);
    }
    apply_rebalance(vault, &plan)?;

    let external = ExternalVault::from_remaining(
        remaining_accounts,
        &vault.external_vault_program,
        &vault.external_vault_state,
    )?;
    let index_bytes = vault.index.to_le_bytes();
    let seeds = &[COLLATERAL_VAULT_SEED, index_bytes.as_ref(), &[vault.bump]];
    external.execute_rebalance(&plan, &[&seeds[..]])?;

    emit!(VaultRebalanced {
        vault: vault.key(),
        deposited: plan.deposit,
        minted: plan.mint,
        total_deposited: vault.total_deposited,
        total_minted: vault.total_minted,
        price,
        config_version: vault.config.version,
        timestamp: now,
    });
    Ok(plan)
}

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let price = get_price(&ctx.accounts.oracle.to_account_info(), now)?.price;

    rebalance_vault(
        &mut ctx.accounts.collateral_vault,
        ctx.remaining_accounts,
        price,
        now,
    )?;
    Ok(())
}
