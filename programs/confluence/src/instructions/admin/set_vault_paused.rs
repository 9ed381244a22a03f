use anchor_lang::prelude::*;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::VaultPauseToggled;
use crate::state::{Aggregator, CollateralVault};

#[derive(Accounts)]
pub struct SetVaultPaused<'info> {
    pub admin: Signer<'info>,

    #[account(
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = aggregator.admin == admin.key() @ ErrorCode::Unauthorized,
    )]
    pub aggregator: Account<'info, Aggregator>,

    #[account(
        mut,
        seeds = [COLLATERAL_VAULT_SEED, &collateral_vault.index.to_le_bytes()],
        bump = collateral_vault.bump,
        constraint = collateral_vault.aggregator == aggregator.key() @ ErrorCode::VaultMismatch,
    )]
    pub collateral_vault: Account<'info, CollateralVault>,
}

/// Halt supply and borrow on one vault. Withdraw, repay and liquidation stay open.
pub fn handler(ctx: Context<SetVaultPaused>, paused: bool) -> Result<()> {
    ctx.accounts.collateral_vault.paused = paused;

    emit!(VaultPauseToggled {
        vault: ctx.accounts.collateral_vault.key(),
        paused,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
