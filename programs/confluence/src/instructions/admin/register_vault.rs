use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::VaultRegistered;
use crate::state::{Aggregator, CollateralVault, VaultConfig};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RegisterVaultParams {
    pub external_vault_program: Pubkey,
    pub external_vault_state: Pubkey,
    pub incentive_pool_program: Pubkey,
    pub incentive_pool_state: Pubkey,
    pub deposit_helper: Pubkey,
    pub is_rebasing: bool,
    pub config: VaultConfig,
}

#[derive(Accounts)]
pub struct RegisterVault<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = aggregator.admin == admin.key() @ ErrorCode::Unauthorized,
    )]
    pub aggregator: Box<Account<'info, Aggregator>>,

    #[account(
        init,
        payer = admin,
        space = CollateralVault::LEN,
        seeds = [COLLATERAL_VAULT_SEED, &aggregator.vault_count.to_le_bytes()],
        bump,
    )]
    pub collateral_vault: Box<Account<'info, CollateralVault>>,

    pub collateral_mint: Box<Account<'info, Mint>>,

    #[account(
        constraint = debt_mint.key() == aggregator.debt_mint @ ErrorCode::InvalidParameter,
    )]
    pub debt_mint: Box<Account<'info, Mint>>,

    /// CHECK: Pyth price feed, parsed on every read
    pub oracle: UncheckedAccount<'info>,

    #[account(
        init,
        payer = admin,
        seeds = [IDLE_SEED, collateral_vault.key().as_ref()],
        bump,
        token::mint = collateral_mint,
        token::authority = collateral_vault,
    )]
    pub idle_account: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        seeds = [DEBT_SEED, collateral_vault.key().as_ref()],
        bump,
        token::mint = debt_mint,
        token::authority = collateral_vault,
    )]
    pub debt_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn handler(ctx: Context<RegisterVault>, params: RegisterVaultParams) -> Result<()> {
    params.config.validate()?;

    let vault_key = ctx.accounts.collateral_vault.key();
    let aggregator_key = ctx.accounts.aggregator.key();
    let collateral_mint = ctx.accounts.collateral_mint.key();
    let index = ctx.accounts.aggregator.vault_count;
    let now = Clock::get()?.unix_timestamp;

    let vault = &mut ctx.accounts.collateral_vault;
    vault.aggregator = aggregator_key;
    vault.bump = ctx.bumps.collateral_vault;
    vault.index = index;
    vault.collateral_mint = collateral_mint;
    vault.oracle = ctx.accounts.oracle.key();
    vault.external_vault_program = params.external_vault_program;
    vault.external_vault_state = params.external_vault_state;
    vault.incentive_pool_program = params.incentive_pool_program;
    vault.incentive_pool_state = params.incentive_pool_state;
    vault.deposit_helper = params.deposit_helper;
    vault.is_rebasing = params.is_rebasing;
    vault.idle_account = ctx.accounts.idle_account.key();
    vault.debt_account = ctx.accounts.debt_account.key();
    vault.config = VaultConfig {
        version: 1,
        ..params.config
    };
    vault.incentive.last_update = now;

    let aggregator = &mut ctx.accounts.aggregator;
    aggregator.vault_count = aggregator
        .vault_count
        .checked_add(1)
        .ok_or(ErrorCode::MathOverflow)?;

    emit!(VaultRegistered {
        vault: vault_key,
        index,
        collateral_mint,
        is_rebasing: params.is_rebasing,
        timestamp: now,
    });

    Ok(())
}
