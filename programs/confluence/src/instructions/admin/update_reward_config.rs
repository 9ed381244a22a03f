use anchor_lang::prelude::*;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::RewardConfigUpdated;
use crate::state::{Aggregator, RewardConfig};

#[derive(Accounts)]
pub struct UpdateRewardConfig<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = aggregator.admin == admin.key() @ ErrorCode::Unauthorized,
    )]
    pub aggregator: Box<Account<'info, Aggregator>>,
}

pub fn handler(ctx: Context<UpdateRewardConfig>, reward_config: RewardConfig) -> Result<()> {
    reward_config.validate()?;

    let aggregator = &mut ctx.accounts.aggregator;
    aggregator.reward_config = reward_config;
    aggregator.config_version = aggregator
        .config_version
        .checked_add(1)
        .ok_or(ErrorCode::MathOverflow)?;

    emit!(RewardConfigUpdated {
        version: aggregator.config_version,
        treasury_share_bps: reward_config.treasury_share_bps,
        staker_share_bps: reward_config.staker_share_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
