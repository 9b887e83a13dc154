//! Instruction pairs that allocate and initialize SPL token program accounts.
//!
//! Every account here is created by the system program with the token program as its owner, then
//! initialized in the same transaction, so the new account's keypair must co-sign.

use solana_address::Address;
use solana_instruction::Instruction;
use solana_sdk::program_pack::Pack;
use spl_token_interface::state::{
    Account,
    Mint,
    Multisig,
};

use crate::error::ClientError;

fn token_error(e: impl ToString) -> ClientError {
    ClientError::Token(e.to_string())
}

pub fn create_and_initialize_token_instructions(
    payer: &Address,
    mint: &Address,
    mint_authority: &Address,
    rent_lamports: u64,
    mint_decimals: u8,
    token_program: &Address,
) -> Result<(Instruction, Instruction), ClientError> {
    let create_mint_account = solana_system_interface::instruction::create_account(
        payer,
        mint,
        rent_lamports,
        Mint::LEN as u64,
        token_program,
    );

    let initialize_mint = spl_token_interface::instruction::initialize_mint2(
        token_program,
        mint,
        mint_authority,
        None,
        mint_decimals,
    )
    .map_err(token_error)?;

    Ok((create_mint_account, initialize_mint))
}

/// A token account at a fresh address rather than the owner's associated token account.
pub fn create_and_initialize_token_account_instructions(
    payer: &Address,
    token_account: &Address,
    mint: &Address,
    owner: &Address,
    rent_lamports: u64,
    token_program: &Address,
) -> Result<(Instruction, Instruction), ClientError> {
    let create_token_account = solana_system_interface::instruction::create_account(
        payer,
        token_account,
        rent_lamports,
        Account::LEN as u64,
        token_program,
    );

    let initialize_account = spl_token_interface::instruction::initialize_account3(
        token_program,
        token_account,
        mint,
        owner,
    )
    .map_err(token_error)?;

    Ok((create_token_account, initialize_account))
}

/// An `m` of `signers.len()` multisig authority.
pub fn create_and_initialize_multisig_instructions(
    payer: &Address,
    multisig: &Address,
    signers: &[Address],
    m: u8,
    rent_lamports: u64,
    token_program: &Address,
) -> Result<(Instruction, Instruction), ClientError> {
    let create_multisig_account = solana_system_interface::instruction::create_account(
        payer,
        multisig,
        rent_lamports,
        Multisig::LEN as u64,
        token_program,
    );

    let signer_refs = signers.iter().collect::<Vec<_>>();
    let initialize_multisig = spl_token_interface::instruction::initialize_multisig2(
        token_program,
        multisig,
        &signer_refs,
        m,
    )
    .map_err(token_error)?;

    Ok((create_multisig_account, initialize_multisig))
}
