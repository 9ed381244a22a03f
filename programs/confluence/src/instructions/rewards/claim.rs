use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::RewardClaimed;
use crate::instructions::token_transfer::transfer_from_pda;
use crate::math::rewards::{partial_payout, split_revenue_payout, touch_position, touch_stake};
use crate::state::{Aggregator, CollateralVault, StakeLedger, StakePosition, UserPosition};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum RewardPool {
    /// Supplier share of the incentive pool reward of one vault
    Incentive,
    /// Rebase yield of one rebasing vault
    Rebase,
    /// Staking reward, boost and protocol revenue
    Staking,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub amount: u64,
    pub secondary_amount: u64,
}

/// Accounts for every pool; each pool only needs its own optional group.
#[derive(Accounts)]
pub struct Claim<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
    )]
    pub aggregator: Box<Account<'info, Aggregator>>,

    #[account(
        mut,
        constraint = reward_vault.key() == aggregator.reward_vault @ ErrorCode::InvalidParameter,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = user_incentive_account.owner == owner.key() @ ErrorCode::Unauthorized,
        constraint = user_incentive_account.mint == aggregator.incentive_mint @ ErrorCode::InvalidParameter,
    )]
    pub user_incentive_account: Box<Account<'info, TokenAccount>>,

    // Incentive and rebase pools
    #[account(mut)]
    pub collateral_vault: Option<Box<Account<'info, CollateralVault>>>,
    #[account(mut)]
    pub user_position: Option<Box<Account<'info, UserPosition>>>,
    #[account(mut)]
    pub idle_account: Option<Box<Account<'info, TokenAccount>>>,
    #[account(mut)]
    pub user_collateral_account: Option<Box<Account<'info, TokenAccount>>>,

    // Staking pool
    pub stake_ledger: Option<Box<Account<'info, StakeLedger>>>,
    #[account(mut)]
    pub stake_position: Option<Box<Account<'info, StakePosition>>>,
    #[account(mut)]
    pub revenue_vault: Option<Box<Account<'info, TokenAccount>>>,
    #[account(mut)]
    pub secondary_reserve: Option<Box<Account<'info, TokenAccount>>>,
    #[account(mut)]
    pub user_debt_account: Option<Box<Account<'info, TokenAccount>>>,
    #[account(mut)]
    pub user_secondary_account: Option<Box<Account<'info, TokenAccount>>>,

    pub token_program: Program<'info, Token>,
}

fn required<T>(account: Option<T>) -> Result<T> {
    account.ok_or_else(|| error!(ErrorCode::InvalidParameter))
}

impl<'info> Claim<'info> {
    fn has_vault_accounts(&self) -> bool {
        self.collateral_vault.is_some() && self.user_position.is_some()
    }

    fn has_rebase_accounts(&self) -> bool {
        self.has_vault_accounts()
            && self.idle_account.is_some()
            && self.user_collateral_account.is_some()
            && self
                .collateral_vault
                .as_ref()
                .map_or(false, |vault| vault.is_rebasing)
    }

    fn has_staking_accounts(&self) -> bool {
        self.stake_ledger.is_some() && self.stake_position.is_some()
    }

    fn check_vault_accounts(&self) -> Result<()> {
        let vault = required(self.collateral_vault.as_ref())?;
        let position = required(self.user_position.as_ref())?;
        require_keys_eq!(vault.aggregator, self.aggregator.key(), ErrorCode::VaultMismatch);
        require_keys_eq!(position.vault, vault.key(), ErrorCode::VaultMismatch);
        require_keys_eq!(position.owner, self.owner.key(), ErrorCode::Unauthorized);
        Ok(())
    }

    fn pay_incentive(&mut self, amount: u64) -> Result<()> {
        let seeds = &[AGGREGATOR_SEED, &[self.aggregator.bump]];
        transfer_from_pda(
            self.token_program.to_account_info(),
            self.reward_vault.to_account_info(),
            self.user_incentive_account.to_account_info(),
            self.aggregator.to_account_info(),
            &[&seeds[..]],
            amount,
        )?;
        self.reward_vault.reload()
    }

    /// Supplier share of incentive rewards, paid from the reward vault.
    pub fn claim_incentive(&mut self) -> Result<ClaimOutcome> {
        self.check_vault_accounts()?;
        let available = self.reward_vault.amount;
        let vault = required(self.collateral_vault.as_ref())?;
        let position = required(self.user_position.as_mut())?;

        touch_position(vault, position)?;
        let (paid, remaining) = partial_payout(position.incentive.accrued_reward, available);
        position.incentive.accrued_reward = remaining;

        self.pay_incentive(paid)?;
        Ok(ClaimOutcome {
            amount: paid,
            secondary_amount: 0,
        })
    }

    /// Rebase yield, paid in collateral out of the idle surplus.
    pub fn claim_rebase(&mut self) -> Result<ClaimOutcome> {
        self.check_vault_accounts()?;
        let idle = required(self.idle_account.as_ref())?;
        let user_collateral = required(self.user_collateral_account.as_ref())?;
        let vault = required(self.collateral_vault.as_mut())?;
        let position = required(self.user_position.as_mut())?;
        require!(vault.is_rebasing, ErrorCode::NotRebasingVault);
        require_keys_eq!(idle.key(), vault.idle_account, ErrorCode::VaultMismatch);
        require_keys_eq!(user_collateral.owner, position.owner, ErrorCode::Unauthorized);
        require_keys_eq!(
            user_collateral.mint,
            vault.collateral_mint,
            ErrorCode::InvalidParameter
        );

        touch_position(vault, position)?;
        let (available, _) = vault.rebase_surplus_split(idle.amount);
        let (paid, remaining) = partial_payout(position.rebase.accrued_reward, available);
        position.rebase.accrued_reward = remaining;
        vault.rebase.unclaimed = vault.rebase.unclaimed.saturating_sub(paid);

        let index_bytes = vault.index.to_le_bytes();
        let seeds = &[COLLATERAL_VAULT_SEED, index_bytes.as_ref(), &[vault.bump]];
        transfer_from_pda(
            self.token_program.to_account_info(),
            idle.to_account_info(),
            user_collateral.to_account_info(),
            vault.to_account_info(),
            &[&seeds[..]],
            paid,
        )?;
        required(self.idle_account.as_mut())?.reload()?;

        Ok(ClaimOutcome {
            amount: paid,
            secondary_amount: 0,
        })
    }

    /// Staking reward and boost from the reward vault, then protocol revenue
    /// from the revenue vault with the secondary reserve covering any shortfall.
    pub fn claim_staking(&mut self) -> Result<ClaimOutcome> {
        let ledger = required(self.stake_ledger.as_ref())?;
        let position = required(self.stake_position.as_mut())?;
        require_keys_eq!(ledger.aggregator, self.aggregator.key(), ErrorCode::InvalidParameter);
        require_keys_eq!(position.owner, self.owner.key(), ErrorCode::Unauthorized);

        touch_stake(ledger, position)?;

        // Incentive token: settled staking reward first, then boost
        let owed = position
            .staking_reward
            .accrued_reward
            .checked_add(position.pending_reward)
            .ok_or(ErrorCode::MathOverflow)?;
        let (incentive_paid, _) = partial_payout(owed, self.reward_vault.amount);
        let from_staking = incentive_paid.min(position.staking_reward.accrued_reward);
        position.staking_reward.accrued_reward -= from_staking;
        position.pending_reward -= incentive_paid - from_staking;

        // Debt token revenue
        let revenue_owed = std::mem::take(&mut position.pending_protocol_revenue);
        let (primary, secondary) = if revenue_owed > 0 {
            let revenue_vault = required(self.revenue_vault.as_ref())?;
            let secondary_reserve = required(self.secondary_reserve.as_ref())?;
            require_keys_eq!(revenue_vault.key(), ledger.revenue_vault, ErrorCode::InvalidParameter);
            require_keys_eq!(
                secondary_reserve.key(),
                ledger.secondary_reserve,
                ErrorCode::InvalidParameter
            );
            split_revenue_payout(revenue_owed, revenue_vault.amount, secondary_reserve.amount)?
        } else {
            (0, 0)
        };

        self.pay_incentive(incentive_paid)?;

        let seeds = &[AGGREGATOR_SEED, &[self.aggregator.bump]];
        let signer_seeds = &[&seeds[..]];
        if primary > 0 {
            let user_debt_account = required(self.user_debt_account.as_ref())?;
            require_keys_eq!(user_debt_account.owner, self.owner.key(), ErrorCode::Unauthorized);
            require_keys_eq!(
                user_debt_account.mint,
                self.aggregator.debt_mint,
                ErrorCode::InvalidParameter
            );
            transfer_from_pda(
                self.token_program.to_account_info(),
                required(self.revenue_vault.as_ref())?.to_account_info(),
                user_debt_account.to_account_info(),
                self.aggregator.to_account_info(),
                signer_seeds,
                primary,
            )?;
        }
        if secondary > 0 {
            let user_secondary_account = required(self.user_secondary_account.as_ref())?;
            require_keys_eq!(
                user_secondary_account.owner,
                self.owner.key(),
                ErrorCode::Unauthorized
            );
            require_keys_eq!(
                user_secondary_account.mint,
                self.aggregator.secondary_reserve_mint,
                ErrorCode::InvalidParameter
            );
            transfer_from_pda(
                self.token_program.to_account_info(),
                required(self.secondary_reserve.as_ref())?.to_account_info(),
                user_secondary_account.to_account_info(),
                self.aggregator.to_account_info(),
                signer_seeds,
                secondary,
            )?;
        }

        Ok(ClaimOutcome {
            amount: incentive_paid + primary,
            secondary_amount: secondary,
        })
    }

    pub fn claim_pool(&mut self, pool: RewardPool) -> Result<ClaimOutcome> {
        match pool {
            RewardPool::Incentive => self.claim_incentive(),
            RewardPool::Rebase => self.claim_rebase(),
            RewardPool::Staking => self.claim_staking(),
        }
    }
}

fn emit_claim(user: Pubkey, pool: RewardPool, outcome: ClaimOutcome, now: i64) {
    emit!(RewardClaimed {
        user,
        pool: pool as u8,
        amount: outcome.amount,
        secondary_amount: outcome.secondary_amount,
        timestamp: now,
    });
}

pub fn handler(ctx: Context<Claim>, pool: RewardPool) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.owner.key();

    let outcome = ctx.accounts.claim_pool(pool)?;
    require!(
        outcome.amount > 0 || outcome.secondary_amount > 0,
        ErrorCode::NothingToClaim
    );
    emit_claim(user, pool, outcome, now);
    Ok(())
}

/// Claim from every pool whose accounts were passed.
pub fn claim_all_handler(ctx: Context<Claim>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.owner.key();

    let mut pools = Vec::with_capacity(3);
    if ctx.accounts.has_vault_accounts() {
        pools.push(RewardPool::Incentive);
    }
    if ctx.accounts.has_rebase_accounts() {
        pools.push(RewardPool::Rebase);
    }
    if ctx.accounts.has_staking_accounts() {
        pools.push(RewardPool::Staking);
    }

    let mut claimed_any = false;
    for pool in pools {
        let outcome = ctx.accounts.claim_pool(pool)?;
        if outcome.amount > 0 || outcome.secondary_amount > 0 {
            claimed_any = true;
            emit_claim(user, pool, outcome, now);
        }
    }
    require!(claimed_any, ErrorCode::NothingToClaim);
    Ok(())
}
