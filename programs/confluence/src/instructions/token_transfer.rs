use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

/// Transfer signed by the wallet that owns `from`.
pub fn transfer_from_user<'info>(
    token_program: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token::transfer(
        CpiContext::new(token_program, Transfer { from, to, authority }),
        amount,
    )
}

/// Transfer out of a program-owned token account, signed by its PDA.
pub fn transfer_from_pda<'info>(
    token_program: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token::transfer(
        CpiContext::new_with_signer(token_program, Transfer { from, to, authority }, signer_seeds),
        amount,
    )
}
