use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hash;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke_signed;
use crate::error::ErrorCode;

/// Collaborator CPIs are routed through remaining_accounts:
///   remaining_accounts[0] = collaborator program (executable)
///   remaining_accounts[1..] = collaborator accounts, in its own order
///
/// The program key is checked against the one registered on the vault, so a
/// caller cannot swap in a different program.
pub fn split_collaborator_accounts<'a, 'info>(
    remaining_accounts: &'a [AccountInfo<'info>],
    expected_program: &Pubkey,
) -> Result<(&'a AccountInfo<'info>, &'a [AccountInfo<'info>])> {
    let (program, accounts) = remaining_accounts
        .split_first()
        .ok_or(ErrorCode::UnsupportedProtocol)?;
    require_keys_eq!(*program.key, *expected_program, ErrorCode::UnsupportedProtocol);
    require!(program.executable, ErrorCode::UnsupportedProtocol);
    Ok((program, accounts))
}

/// Anchor instruction discriminator: sha256("global:<name>")[..8]
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("global:{}", name).as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest.to_bytes()[..8]);
    discriminator
}

/// discriminator followed by little-endian u64 arguments
pub fn encode_instruction(name: &str, args: &[u64]) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + 8 * args.len());
    data.extend_from_slice(&instruction_discriminator(name));
    for arg in args {
        data.extend_from_slice(&arg.to_le_bytes());
    }
    data
}

/// Build an instruction over `accounts` and invoke it with PDA signer seeds.
pub fn invoke_collaborator_signed<'info>(
    program: &AccountInfo<'info>,
    accounts: &[AccountInfo<'info>],
    data: Vec<u8>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let account_metas: Vec<AccountMeta> = accounts
        .iter()
        .map(|a| {
            if a.is_writable {
                AccountMeta::new(*a.key, a.is_signer)
            } else {
                AccountMeta::new_readonly(*a.key, a.is_signer)
            }
        })
        .collect();

    let ix = Instruction {
        program_id: *program.key,
        accounts: account_metas,
        data,
    };

    let mut all_accounts = vec![program.clone()];
    all_accounts.extend_from_slice(accounts);

    invoke_signed(&ix, &all_accounts, signer_seeds)?;
    Ok(())
}

/// Read a little-endian u64 at `offset`.
pub fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}

/// Read a little-endian u128 at `offset`.
pub fn read_u128(data: &[u8], offset: usize) -> Option<u128> {
    let bytes = data.get(offset..offset + 16)?;
    Some(u128::from_le_bytes(bytes.try_into().ok()?))
}

pub fn read_pubkey(data: &[u8], offset: usize) -> Option<Pubkey> {
    let bytes: [u8; 32] = data.get(offset..offset + 32)?.try_into().ok()?;
    Some(Pubkey::new_from_array(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_discriminator_then_args() {
        let data = encode_instruction("deposit_asset_to_mint", &[5, 7]);
        assert_eq!(data.len(), 24);
        assert_eq!(&data[..8], &instruction_discriminator("deposit_asset_to_mint"));
        assert_eq!(read_u64(&data, 8), Some(5));
        assert_eq!(read_u64(&data, 16), Some(7));
        assert_ne!(
            instruction_discriminator("mint"),
            instruction_discriminator("burn")
        );
    }

    #[test]
    fn readers_reject_short_data() {
        let data = [1u8; 20];
        assert_eq!(read_u64(&data, 12), Some(u64::from_le_bytes([1; 8])));
        assert_eq!(read_u64(&data, 13), None);
        assert_eq!(read_u128(&data, 8), None);
        assert_eq!(read_pubkey(&data, 0), None);
    }
}
