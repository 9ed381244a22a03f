use anchor_lang::prelude::*;
use crate::adapters::account_bridge::*;
use crate::constants::WAD;
use crate::error::ErrorCode;
use crate::math::fixed_point::{mul_div, to_amount};
use crate::math::rewards::IncentiveSnapshot;

// Pool state: discriminator(8) + reward_per_token_stored(16)
const POOL_REWARD_PER_TOKEN_OFFSET: usize = 8;
const POOL_LEN: usize = 24;

// Position: discriminator(8) + owner(32) + staked(8) + boosted balance(8)
//   + rewards(8) + reward_per_token_paid(16)
const POSITION_OWNER_OFFSET: usize = 8;
const POSITION_STAKED_OFFSET: usize = 40;
const POSITION_BALANCE_OFFSET: usize = 48;
const POSITION_REWARDS_OFFSET: usize = 56;
const POSITION_PAID_OFFSET: usize = 64;
const POSITION_LEN: usize = 80;

fn invalid() -> ErrorCode {
    ErrorCode::IncentivePoolDataInvalid
}

/// Read the aggregate position out of the pool and position accounts.
///
/// The pool credits the boosted balance, so
/// earned = rewards + balance * (reward_per_token - paid) / WAD
/// and the boost multiplier is balance / staked.
pub fn parse_snapshot(pool: &[u8], position: &[u8], expected_owner: &Pubkey) -> Result<IncentiveSnapshot> {
    require!(pool.len() >= POOL_LEN, invalid());
    require!(position.len() >= POSITION_LEN, invalid());

    let reward_per_token = read_u128(pool, POOL_REWARD_PER_TOKEN_OFFSET).ok_or(invalid())?;
    let owner = read_pubkey(position, POSITION_OWNER_OFFSET).ok_or(invalid())?;
    require_keys_eq!(owner, *expected_owner, invalid());

    let staked = read_u64(position, POSITION_STAKED_OFFSET).ok_or(invalid())?;
    let balance = read_u64(position, POSITION_BALANCE_OFFSET).ok_or(invalid())?;
    let rewards = read_u64(position, POSITION_REWARDS_OFFSET).ok_or(invalid())?;
    let paid = read_u128(position, POSITION_PAID_OFFSET).ok_or(invalid())?;

    let fresh = mul_div(
        balance as u128,
        reward_per_token.saturating_sub(paid),
        WAD,
    )?;
    let earned = rewards
        .checked_add(to_amount(fresh)?)
        .ok_or(ErrorCode::MathOverflow)?;
    let boost = if staked == 0 {
        WAD
    } else {
        mul_div(balance as u128, WAD, staked as u128)?
    };

    Ok(IncentiveSnapshot {
        reward_per_token,
        earned,
        boost,
        staked,
        balance,
    })
}

/// Snapshot from live accounts, both owned by the incentive pool program.
pub fn load_snapshot(
    pool_info: &AccountInfo,
    position_info: &AccountInfo,
    pool_program: &Pubkey,
    expected_owner: &Pubkey,
) -> Result<IncentiveSnapshot> {
    require_keys_eq!(*pool_info.owner, *pool_program, invalid());
    require_keys_eq!(*position_info.owner, *pool_program, invalid());
    let pool = pool_info.try_borrow_data()?;
    let position = position_info.try_borrow_data()?;
    parse_snapshot(&pool, &position, expected_owner)
}

/// get_reward CPI. Accounts:
///   pool state, aggregate position, authority (collateral vault PDA),
///   reward source, reward destination, token program
pub struct IncentivePool<'a, 'info> {
    pub program: &'a AccountInfo<'info>,
    pub accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> IncentivePool<'a, 'info> {
    pub const ACCOUNTS_LEN: usize = 6;

    pub fn from_remaining(
        remaining_accounts: &'a [AccountInfo<'info>],
        expected_program: &Pubkey,
    ) -> Result<Self> {
        let (program, accounts) =
            split_collaborator_accounts(remaining_accounts, expected_program)?;
        require!(accounts.len() >= Self::ACCOUNTS_LEN, invalid());
        Ok(Self { program, accounts })
    }

    pub fn pool_account(&self) -> &'a AccountInfo<'info> {
        &self.accounts[0]
    }

    pub fn position_account(&self) -> &'a AccountInfo<'info> {
        &self.accounts[1]
    }

    pub fn reward_destination(&self) -> &'a AccountInfo<'info> {
        &self.accounts[4]
    }

    pub fn get_reward(&self, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        invoke_collaborator_signed(
            self.program,
            &self.accounts[..Self::ACCOUNTS_LEN],
            encode_instruction("get_reward", &[]),
            signer_seeds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(reward_per_token: u128) -> Vec<u8> {
        let mut data = vec![0u8; POOL_LEN];
        data[8..24].copy_from_slice(&reward_per_token.to_le_bytes());
        data
    }

    fn position(owner: &Pubkey, staked: u64, balance: u64, rewards: u64, paid: u128) -> Vec<u8> {
        let mut data = vec![0u8; POSITION_LEN];
        data[8..40].copy_from_slice(owner.as_ref());
        data[40..48].copy_from_slice(&staked.to_le_bytes());
        data[48..56].copy_from_slice(&balance.to_le_bytes());
        data[56..64].copy_from_slice(&rewards.to_le_bytes());
        data[64..80].copy_from_slice(&paid.to_le_bytes());
        data
    }

    #[test]
    fn boosted_balance_earns_above_staked_share() {
        let owner = Pubkey::new_unique();
        let snapshot = parse_snapshot(
            &pool(3 * WAD),
            &position(&owner, 1_000, 1_500, 40, WAD),
            &owner,
        )
        .unwrap();
        assert_eq!(snapshot.earned, 40 + 3_000);
        assert_eq!(snapshot.boost, WAD + WAD / 2);
        assert_eq!(snapshot.staked, 1_000);
    }

    #[test]
    fn rejects_truncated_accounts() {
        let owner = Pubkey::new_unique();
        assert!(parse_snapshot(&pool(WAD)[..10], &position(&owner, 1, 1, 0, 0), &owner).is_err());
        assert!(parse_snapshot(&pool(WAD), &position(&owner, 1, 1, 0, 0)[..70], &owner).is_err());
        assert!(parse_snapshot(&pool(WAD), &position(&owner, 1, 1, 0, 0), &Pubkey::new_unique()).is_err());
    }
}
