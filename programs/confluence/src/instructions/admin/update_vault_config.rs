use anchor_lang::prelude::*;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::VaultConfigUpdated;
use crate::state::{Aggregator, CollateralVault, VaultConfig};

#[derive(Accounts)]
pub struct UpdateVaultConfig<'info> {
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
}

/// Takes effect from the next call. Interest not yet settled on a position
/// accrues at the rate in force when it is settled.
pub fn handler(ctx: Context<UpdateVaultConfig>, config: VaultConfig) -> Result<()> {
    config.validate()?;

    let vault_key = ctx.accounts.collateral_vault.key();
    let vault = &mut ctx.accounts.collateral_vault;
    let version = vault
        .config
        .version
        .checked_add(1)
        .ok_or(ErrorCode::MathOverflow)?;
    vault.config = VaultConfig { version, ..config };

    emit!(VaultConfigUpdated {
        vault: vault_key,
        version,
        target_collateral_ratio: config.target_collateral_ratio,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
