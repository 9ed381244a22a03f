use anchor_lang::prelude::*;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::PauseToggled;
use crate::state::Aggregator;

#[derive(Accounts)]
pub struct SetPaused<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [AGGREGATOR_SEED],
        bump = aggregator.bump,
        constraint = aggregator.admin == admin.key() @ ErrorCode::Unauthorized,
    )]
    pub aggregator: Account<'info, Aggregator>,
}

pub fn handler(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
    ctx.accounts.aggregator.paused = paused;

    emit!(PauseToggled {
        paused,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
