//! Instruction execution for [`super::LocalCluster`].
//!
//! Each processor reads and writes accounts in a scratch copy of the account store. The caller
//! only commits the copy once every instruction in the transaction has succeeded.

use std::collections::HashMap;

use favorites_interface::{
    error::{
        AnchorError,
        FavoritesError,
        KnownError,
        SystemError,
    },
    instructions::{
        FavoritesAccounts,
        FavoritesInstruction,
        SetFavoritesArgs,
        UpdateFavoritesArgs,
    },
    pda::find_favorites_address,
    state::Favorites,
    SYSTEM_PROGRAM_ID,
};
use solana_account::Account;
use solana_address::Address;
use solana_instruction::{
    AccountMeta,
    Instruction,
};
use solana_instruction_error::InstructionError;
use solana_sdk::rent::Rent;
use solana_system_interface::instruction::SystemInstruction;

use super::token;

pub type AccountStore = HashMap<Address, Account>;

pub(super) fn custom(error: impl Into<KnownError>) -> InstructionError {
    InstructionError::Custom(error.into().code())
}

/// Runs `instruction` against `accounts`. `favorites_program` is the address the favorites
/// program is deployed at.
pub fn process_instruction(
    accounts: &mut AccountStore,
    favorites_program: &Address,
    instruction: &Instruction,
) -> Result<(), InstructionError> {
    if instruction.program_id == SYSTEM_PROGRAM_ID {
        process_system(accounts, instruction)
    } else if instruction.program_id == solana_compute_budget_interface::ID {
        Ok(())
    } else if &instruction.program_id == favorites_program {
        process_favorites(accounts, favorites_program, instruction)
    } else if instruction.program_id == spl_token_interface::ID {
        token::process_token(accounts, instruction)
    } else if instruction.program_id == spl_associated_token_account_interface::program::ID {
        token::process_associated_token_account(accounts, instruction)
    } else {
        Err(InstructionError::UnsupportedProgramId)
    }
}

fn process_system(
    accounts: &mut AccountStore,
    instruction: &Instruction,
) -> Result<(), InstructionError> {
    let system_instruction: SystemInstruction = bincode::deserialize(&instruction.data)
        .map_err(|_| InstructionError::InvalidInstructionData)?;

    let [from, to, ..] = instruction.accounts.as_slice() else {
        return Err(InstructionError::MissingAccount);
    };
    if !from.is_signer {
        return Err(InstructionError::MissingRequiredSignature);
    }
    if !from.is_writable || !to.is_writable {
        return Err(InstructionError::ReadonlyLamportChange);
    }

    match system_instruction {
        SystemInstruction::Transfer { lamports } => {
            debit(accounts, &from.pubkey, lamports)?;
            credit_lamports(accounts, &to.pubkey, lamports)
        }
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            if !to.is_signer {
                return Err(InstructionError::MissingRequiredSignature);
            }
            let in_use = accounts.get(&to.pubkey).is_some_and(|account| {
                account.lamports > 0 || !account.data.is_empty() || account.owner != SYSTEM_PROGRAM_ID
            });
            if in_use {
                return Err(custom(SystemError::AccountAlreadyInUse));
            }

            debit(accounts, &from.pubkey, lamports)?;
            accounts.insert(
                to.pubkey,
                Account {
                    lamports,
                    data: vec![0; space as usize],
                    owner,
                    executable: false,
                    rent_epoch: 0,
                },
            );
            Ok(())
        }
        _ => Err(InstructionError::InvalidInstructionData),
    }
}

/// Removes `lamports` from a system-owned account, failing the way the system program does when
/// the balance can't cover it.
pub(super) fn debit(
    accounts: &mut AccountStore,
    address: &Address,
    lamports: u64,
) -> Result<(), InstructionError> {
    let account = accounts
        .get_mut(address)
        .filter(|account| account.lamports >= lamports)
        .ok_or_else(|| custom(SystemError::ResultWithNegativeLamports))?;
    if !account.data.is_empty() {
        return Err(InstructionError::InvalidArgument);
    }
    account.lamports -= lamports;
    Ok(())
}

/// Adds `lamports` to `address`, creating a system-owned account if none exists.
pub fn credit_lamports(
    accounts: &mut AccountStore,
    address: &Address,
    lamports: u64,
) -> Result<(), InstructionError> {
    let account = accounts
        .entry(*address)
        .or_insert_with(|| Account::new(0, 0, &SYSTEM_PROGRAM_ID));
    account.lamports = account
        .lamports
        .checked_add(lamports)
        .ok_or(InstructionError::ArithmeticOverflow)?;
    Ok(())
}

/// Mirrors the framework's account handling: every account is deserialized in order first (signer,
/// the favorites account for updates, the system program), then the `mut` and `seeds` constraints
/// are checked.
fn process_favorites(
    accounts: &mut AccountStore,
    program_id: &Address,
    instruction: &Instruction,
) -> Result<(), InstructionError> {
    let decoded = FavoritesInstruction::unpack(&instruction.data)
        .map_err(|e| custom(AnchorError::from(&e)))?;

    let [user, favorites, system_program, ..] = instruction.accounts.as_slice() else {
        return Err(custom(AnchorError::AccountNotEnoughKeys));
    };
    if !user.is_signer {
        return Err(custom(AnchorError::AccountNotSigner));
    }

    match decoded {
        FavoritesInstruction::SetFavorites(args) => {
            check_system_program(system_program)?;
            let keys = check_constraints(program_id, user, favorites)?;
            set_favorites(accounts, program_id, keys, args)
        }
        FavoritesInstruction::UpdateFavorites(args) => {
            let current = load_favorites(accounts, program_id, &favorites.pubkey)?;
            check_system_program(system_program)?;
            let keys = check_constraints(program_id, user, favorites)?;
            update_favorites(accounts, keys, current, args)
        }
    }
}

fn check_system_program(system_program: &AccountMeta) -> Result<(), InstructionError> {
    if system_program.pubkey != SYSTEM_PROGRAM_ID {
        return Err(custom(AnchorError::InvalidProgramId));
    }
    Ok(())
}

fn check_constraints(
    program_id: &Address,
    user: &AccountMeta,
    favorites: &AccountMeta,
) -> Result<FavoritesAccounts, InstructionError> {
    if !user.is_writable {
        return Err(custom(AnchorError::ConstraintMut));
    }
    if !favorites.is_writable {
        return Err(custom(AnchorError::ConstraintMut));
    }

    let (expected, _bump) = find_favorites_address(&user.pubkey, program_id)
        .map_err(|_| custom(AnchorError::ConstraintSeeds))?;
    if favorites.pubkey != expected {
        return Err(custom(AnchorError::ConstraintSeeds));
    }

    Ok(FavoritesAccounts {
        user: user.pubkey,
        favorites: favorites.pubkey,
    })
}

/// Reads an initialized favorites account owned by `program_id`.
fn load_favorites(
    accounts: &AccountStore,
    program_id: &Address,
    address: &Address,
) -> Result<Favorites, InstructionError> {
    let account = accounts
        .get(address)
        .filter(|account| account.lamports > 0)
        .ok_or_else(|| custom(AnchorError::AccountNotInitialized))?;
    if &account.owner != program_id {
        return Err(custom(AnchorError::AccountOwnedByWrongProgram));
    }

    Favorites::unpack(&account.data).map_err(|e| custom(AnchorError::from(&e)))
}

/// Creates the favorites account funded by the user, then writes the initial values.
fn set_favorites(
    accounts: &mut AccountStore,
    program_id: &Address,
    keys: FavoritesAccounts,
    args: SetFavoritesArgs,
) -> Result<(), InstructionError> {
    let in_use = accounts
        .get(&keys.favorites)
        .is_some_and(|account| account.lamports > 0 || !account.data.is_empty());
    if in_use {
        return Err(custom(SystemError::AccountAlreadyInUse));
    }

    let rent = Rent::default().minimum_balance(Favorites::LEN);
    debit(accounts, &keys.user, rent)?;

    let data = Favorites::new(args.number, args.color)
        .pack()
        .map_err(|e| custom(AnchorError::from(&e)))?;

    accounts.insert(
        keys.favorites,
        Account {
            lamports: rent,
            data,
            owner: *program_id,
            executable: false,
            rent_epoch: 0,
        },
    );
    Ok(())
}

fn update_favorites(
    accounts: &mut AccountStore,
    keys: FavoritesAccounts,
    mut favorites: Favorites,
    args: UpdateFavoritesArgs,
) -> Result<(), InstructionError> {
    if args.is_empty() {
        return Err(custom(FavoritesError::NothingToUpdate));
    }
    if let Some(number) = args.number {
        favorites.number = number;
    }
    if let Some(color) = args.color {
        favorites.color = color;
    }

    let data = favorites
        .pack()
        .map_err(|e| custom(AnchorError::from(&e)))?;
    let account = accounts
        .get_mut(&keys.favorites)
        .ok_or_else(|| custom(AnchorError::AccountNotInitialized))?;
    account.data = data;
    Ok(())
}
