use anchor_lang::prelude::*;
use crate::adapters::account_bridge::*;
use crate::error::ErrorCode;
use crate::math::collateral::{RebalancePlan, WithdrawPlan};

/// The aggregate position a collateral vault holds in the external vault.
///
/// Position account layout:
///   [0..8]   discriminator
///   [8..40]  owner
///   [40..48] deposited collateral
///   [48..56] borrowed (minted) debt, tracked on our side instead
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExternalPosition {
    pub deposited: u64,
}

const OWNER_OFFSET: usize = 8;
const DEPOSITED_OFFSET: usize = 40;
const POSITION_LEN: usize = 56;

pub fn parse_position(data: &[u8], expected_owner: &Pubkey) -> Result<ExternalPosition> {
    require!(data.len() >= POSITION_LEN, ErrorCode::ExternalVaultDataInvalid);
    let owner = read_pubkey(data, OWNER_OFFSET).ok_or(ErrorCode::ExternalVaultDataInvalid)?;
    require_keys_eq!(owner, *expected_owner, ErrorCode::ExternalVaultDataInvalid);
    Ok(ExternalPosition {
        deposited: read_u64(data, DEPOSITED_OFFSET).ok_or(ErrorCode::ExternalVaultDataInvalid)?,
    })
}

/// Load the aggregate position; `position_info` must be owned by the external vault program.
pub fn load_position(
    position_info: &AccountInfo,
    external_program: &Pubkey,
    expected_owner: &Pubkey,
) -> Result<ExternalPosition> {
    require_keys_eq!(*position_info.owner, *external_program, ErrorCode::ExternalVaultDataInvalid);
    let data = position_info.try_borrow_data()?;
    parse_position(&data, expected_owner)
}

/// Calls into the external vault program, signed by the collateral vault PDA.
///
/// Every call passes the same account list:
///   vault state, aggregate position, authority (collateral vault PDA),
///   idle token account, debt token account, collateral custody, debt mint, token program
pub struct ExternalVault<'a, 'info> {
    pub program: &'a AccountInfo<'info>,
    pub accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> ExternalVault<'a, 'info> {
    pub const ACCOUNTS_LEN: usize = 8;

    /// `expected_state` is the vault state the collateral vault was registered with.
    pub fn from_remaining(
        remaining_accounts: &'a [AccountInfo<'info>],
        expected_program: &Pubkey,
        expected_state: &Pubkey,
    ) -> Result<Self> {
        let (program, accounts) =
            split_collaborator_accounts(remaining_accounts, expected_program)?;
        require!(
            accounts.len() >= Self::ACCOUNTS_LEN,
            ErrorCode::ExternalVaultDataInvalid
        );
        require_keys_eq!(
            *accounts[0].key,
            *expected_state,
            ErrorCode::ExternalVaultDataInvalid
        );
        Ok(Self { program, accounts })
    }

    fn call(&self, name: &str, args: &[u64], signer_seeds: &[&[&[u8]]]) -> Result<()> {
        invoke_collaborator_signed(
            self.program,
            &self.accounts[..Self::ACCOUNTS_LEN],
            encode_instruction(name, args),
            signer_seeds,
        )
    }

    pub fn deposit_asset_to_mint(
        &self,
        amount: u64,
        mint_amount: u64,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        self.call("deposit_asset_to_mint", &[amount, mint_amount], signer_seeds)
    }

    pub fn mint(&self, amount: u64, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        self.call("mint", &[amount], signer_seeds)
    }

    pub fn burn(&self, amount: u64, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        self.call("burn", &[amount], signer_seeds)
    }

    pub fn withdraw(&self, amount: u64, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        self.call("withdraw", &[amount], signer_seeds)
    }

    /// Carry out a rebalance. Ledger state is updated by the caller beforehand.
    pub fn execute_rebalance(&self, plan: &RebalancePlan, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        if plan.deposit > 0 {
            self.deposit_asset_to_mint(plan.deposit, plan.mint, signer_seeds)
        } else if plan.mint > 0 {
            self.mint(plan.mint, signer_seeds)
        } else {
            Ok(())
        }
    }

    /// Burn first, then withdraw what the plan takes from the deposit.
    pub fn execute_withdraw(&self, plan: &WithdrawPlan, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        if plan.burn > 0 {
            self.burn(plan.burn, signer_seeds)?;
        }
        if plan.external_withdraw > 0 {
            self.withdraw(plan.external_withdraw, signer_seeds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn position_data(owner: &Pubkey, deposited: u64) -> Vec<u8> {
        let mut data = vec![0u8; POSITION_LEN];
        data[OWNER_OFFSET..OWNER_OFFSET + 32].copy_from_slice(owner.as_ref());
        data[DEPOSITED_OFFSET..DEPOSITED_OFFSET + 8].copy_from_slice(&deposited.to_le_bytes());
        data
    }

    #[test]
    fn parses_aggregate_position() {
        let owner = Pubkey::new_unique();
        let position = parse_position(&position_data(&owner, 2_000), &owner).unwrap();
        assert_eq!(position, ExternalPosition { deposited: 2_000 });
    }

    #[test]
    fn remaining_accounts_must_name_the_registered_vault_state() {
        let program_id = Pubkey::new_unique();
        let state = Pubkey::new_unique();
        let mut keys = vec![program_id, state];
        keys.extend((1..ExternalVault::ACCOUNTS_LEN).map(|_| Pubkey::new_unique()));
        let mut lamports = vec![0u64; keys.len()];
        let mut data = vec![Vec::<u8>::new(); keys.len()];
        let infos: Vec<AccountInfo> = keys
            .iter()
            .zip(lamports.iter_mut())
            .zip(data.iter_mut())
            .enumerate()
            .map(|(i, ((key, lamports), data))| {
                AccountInfo::new(key, false, false, lamports, data.as_mut_slice(), &program_id, i == 0, 0)
            })
            .collect();

        assert!(ExternalVault::from_remaining(&infos, &program_id, &state).is_ok());

        let err = ExternalVault::from_remaining(&infos, &program_id, &Pubkey::new_unique())
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::ExternalVaultDataInvalid));

        // Short list
        assert!(ExternalVault::from_remaining(&infos[..5], &program_id, &state).is_err());
    }

    #[test]
    fn rejects_foreign_or_short_position() {
        let owner = Pubkey::new_unique();
        let data = position_data(&owner, 1);
        let err = parse_position(&data, &Pubkey::new_unique()).unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::ExternalVaultDataInvalid));
        assert!(parse_position(&data[..40], &owner).is_err());
    }
}
