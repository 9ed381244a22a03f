use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;
use crate::adapters::{load_position, load_snapshot};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::RewardAccumulatorsUpdated;
use crate::math::rewards::{sync_vault_rewards, SyncOutcome};
use crate::state::{Aggregator, CollateralVault, StakeLedger};

/// Accounts needed to fold the external incentive pool and, for rebasing
/// vaults, the external position into a vault's indices. Every instruction
/// that changes supplied shares or rebase eligibility carries these.
#[derive(Accounts)]
pub struct VaultRewardSync<'info> {
    #[account(
        mut,
        seeds = [STAKE_LEDGER_SEED],
        bump = stake_ledger.bump,
    )]
    pub stake_ledger: Box<Account<'info, StakeLedger>>,

    /// CHECK: Incentive pool state, key checked against the vault on sync
    pub incentive_pool_state: UncheckedAccount<'info>,

    /// CHECK: The vault's position in the incentive pool; owner and layout checked on parse
    pub incentive_position: UncheckedAccount<'info>,

    /// CHECK: The vault's position in the external vault, rebasing vaults only
    pub external_position: Option<UncheckedAccount<'info>>,
}

impl<'info> VaultRewardSync<'info> {
    /// `idle_balance` is the idle token account balance before this
    /// instruction moves any collateral.
    pub fn sync(
        &mut self,
        aggregator: &mut Aggregator,
        vault: &mut CollateralVault,
        vault_key: &Pubkey,
        idle_balance: u64,
        now: i64,
    ) -> Result<SyncOutcome> {
        require_keys_eq!(
            self.incentive_pool_state.key(),
            vault.incentive_pool_state,
            ErrorCode::IncentivePoolDataInvalid
        );
        let snapshot = load_snapshot(
            &self.incentive_pool_state.to_account_info(),
            &self.incentive_position.to_account_info(),
            &vault.incentive_pool_program,
            vault_key,
        )?;

        let physical = if vault.is_rebasing {
            let external_position = self
                .external_position
                .as_ref()
                .ok_or(ErrorCode::ExternalVaultDataInvalid)?;
            let deposited = load_position(
                &external_position.to_account_info(),
                &vault.external_vault_program,
                vault_key,
            )?
            .deposited;
            Some(
                idle_balance
                    .checked_add(deposited)
                    .ok_or(ErrorCode::MathOverflow)?,
            )
        } else {
            None
        };

        sync_vault_rewards(aggregator, vault, &mut self.stake_ledger, &snapshot, physical, now)
    }
}

#[derive(Accounts)]
pub struct UpdateRewardAccumulators<'info> {
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
        constraint = idle_account.key() == collateral_vault.idle_account @ ErrorCode::VaultMismatch,
    )]
    pub idle_account: Box<Account<'info, TokenAccount>>,

    pub rewards: VaultRewardSync<'info>,
}

/// Permissionless crank: book incentive rewards and, for rebasing vaults,
/// rebase yield since the last call.
pub fn handler(ctx: Context<UpdateRewardAccumulators>) -> Result<()> {
    let vault_key = ctx.accounts.collateral_vault.key();
    let now = Clock::get()?.unix_timestamp;
    let accounts = ctx.accounts;

    let outcome = accounts.rewards.sync(
        &mut accounts.aggregator,
        &mut accounts.collateral_vault,
        &vault_key,
        accounts.idle_account.amount,
        now,
    )?;

    emit!(RewardAccumulatorsUpdated {
        vault: vault_key,
        normal_reward: outcome.incentive.normal,
        boost_reward: outcome.incentive.boost,
        rebase_yield: outcome.rebase_yield,
        timestamp: now,
    });

    Ok(())
}
