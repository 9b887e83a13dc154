//! The subset of the SPL token and associated token account programs the token scripts use:
//! initializing mints, token accounts and multisig authorities, creating associated token
//! accounts, and minting.

use favorites_interface::error::SystemError;
use solana_address::Address;
use solana_instruction::{
    AccountMeta,
    Instruction,
};
use solana_instruction_error::InstructionError;
use solana_sdk::{
    program_pack::Pack,
    rent::Rent,
};
use spl_associated_token_account_interface::address::get_associated_token_address_with_program_id;
use spl_token_interface::{
    error::TokenError,
    instruction::{
        TokenInstruction,
        MAX_SIGNERS,
    },
    state::{
        Account as TokenAccount,
        AccountState,
        Mint,
        Multisig,
    },
};

use super::processor::{
    custom,
    debit,
    AccountStore,
};

fn token_err(error: TokenError) -> InstructionError {
    InstructionError::Custom(error as u32)
}

pub fn process_token(
    accounts: &mut AccountStore,
    instruction: &Instruction,
) -> Result<(), InstructionError> {
    let token_program = &instruction.program_id;
    let token_instruction = TokenInstruction::unpack(&instruction.data)
        .map_err(|_| InstructionError::InvalidInstructionData)?;
    let metas = instruction.accounts.as_slice();

    match token_instruction {
        TokenInstruction::InitializeMint2 {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            let [mint, ..] = metas else {
                return Err(InstructionError::NotEnoughAccountKeys);
            };
            let data = uninitialized_data(accounts, token_program, &mint.pubkey, Mint::LEN)?;
            if Mint::unpack_unchecked(data).is_ok_and(|mint| mint.is_initialized) {
                return Err(token_err(TokenError::AlreadyInUse));
            }

            let mint = Mint {
                mint_authority: Some(mint_authority).into(),
                supply: 0,
                decimals,
                is_initialized: true,
                freeze_authority,
            };
            pack(mint, data)
        }
        TokenInstruction::InitializeAccount3 { owner } => {
            let [account, mint, ..] = metas else {
                return Err(InstructionError::NotEnoughAccountKeys);
            };
            load_mint(accounts, token_program, &mint.pubkey)?;

            let data =
                uninitialized_data(accounts, token_program, &account.pubkey, TokenAccount::LEN)?;
            if TokenAccount::unpack_unchecked(data)
                .is_ok_and(|account| account.state != AccountState::Uninitialized)
            {
                return Err(token_err(TokenError::AlreadyInUse));
            }

            pack(new_token_account(mint.pubkey, owner), data)
        }
        TokenInstruction::InitializeMultisig2 { m } => {
            let [multisig, signers @ ..] = metas else {
                return Err(InstructionError::NotEnoughAccountKeys);
            };
            if !(1..=MAX_SIGNERS).contains(&signers.len()) {
                return Err(token_err(TokenError::InvalidNumberOfProvidedSigners));
            }
            if m == 0 || m as usize > signers.len() {
                return Err(token_err(TokenError::InvalidNumberOfRequiredSigners));
            }

            let data = uninitialized_data(accounts, token_program, &multisig.pubkey, Multisig::LEN)?;
            if Multisig::unpack_unchecked(data).is_ok_and(|multisig| multisig.is_initialized) {
                return Err(token_err(TokenError::AlreadyInUse));
            }

            let mut state = Multisig {
                m,
                n: signers.len() as u8,
                is_initialized: true,
                ..Default::default()
            };
            for (slot, signer) in state.signers.iter_mut().zip(signers) {
                *slot = signer.pubkey;
            }
            pack(state, data)
        }
        TokenInstruction::MintTo { amount } => mint_to(accounts, token_program, metas, amount, None),
        TokenInstruction::MintToChecked { amount, decimals } => {
            mint_to(accounts, token_program, metas, amount, Some(decimals))
        }
        _ => Err(InstructionError::InvalidInstructionData),
    }
}

fn mint_to(
    accounts: &mut AccountStore,
    token_program: &Address,
    metas: &[AccountMeta],
    amount: u64,
    expected_decimals: Option<u8>,
) -> Result<(), InstructionError> {
    let [mint_meta, destination, authority, signers @ ..] = metas else {
        return Err(InstructionError::NotEnoughAccountKeys);
    };

    let mut mint = load_mint(accounts, token_program, &mint_meta.pubkey)?;
    if expected_decimals.is_some_and(|decimals| decimals != mint.decimals) {
        return Err(token_err(TokenError::MintDecimalsMismatch));
    }
    let mut token_account = load_token_account(accounts, token_program, &destination.pubkey)?;
    if token_account.mint != mint_meta.pubkey {
        return Err(token_err(TokenError::MintMismatch));
    }

    let mint_authority = Option::<Address>::from(mint.mint_authority)
        .ok_or_else(|| token_err(TokenError::FixedSupply))?;
    validate_owner(accounts, token_program, &mint_authority, authority, signers)?;

    mint.supply = mint
        .supply
        .checked_add(amount)
        .ok_or_else(|| token_err(TokenError::Overflow))?;
    token_account.amount = token_account
        .amount
        .checked_add(amount)
        .ok_or_else(|| token_err(TokenError::Overflow))?;

    store(accounts, &mint_meta.pubkey, mint)?;
    store(accounts, &destination.pubkey, token_account)
}

/// Checks that `authority` is `expected` and has signed, either directly or, for a multisig
/// authority, through at least `m` of its listed signers.
fn validate_owner(
    accounts: &AccountStore,
    token_program: &Address,
    expected: &Address,
    authority: &AccountMeta,
    signers: &[AccountMeta],
) -> Result<(), InstructionError> {
    if expected != &authority.pubkey {
        return Err(token_err(TokenError::OwnerMismatch));
    }

    let multisig = accounts
        .get(&authority.pubkey)
        .filter(|account| &account.owner == token_program && account.data.len() == Multisig::LEN)
        .and_then(|account| Multisig::unpack(&account.data).ok());

    match multisig {
        Some(multisig) => {
            let signed = multisig.signers[..multisig.n as usize]
                .iter()
                .filter(|listed| {
                    signers
                        .iter()
                        .any(|meta| meta.is_signer && &meta.pubkey == *listed)
                })
                .count();
            if signed < multisig.m as usize {
                return Err(InstructionError::MissingRequiredSignature);
            }
        }
        None if !authority.is_signer => return Err(InstructionError::MissingRequiredSignature),
        None => {}
    }
    Ok(())
}

/// Creates the wallet's associated token account for a mint, funded by the first account.
pub fn process_associated_token_account(
    accounts: &mut AccountStore,
    instruction: &Instruction,
) -> Result<(), InstructionError> {
    let idempotent = match instruction.data.as_slice() {
        [] | [0] => false,
        [1] => true,
        _ => return Err(InstructionError::InvalidInstructionData),
    };
    let [funder, ata, wallet, mint, _system_program, token_program, ..] =
        instruction.accounts.as_slice()
    else {
        return Err(InstructionError::NotEnoughAccountKeys);
    };
    if token_program.pubkey != spl_token_interface::ID {
        return Err(InstructionError::IncorrectProgramId);
    }
    if !funder.is_signer {
        return Err(InstructionError::MissingRequiredSignature);
    }

    let expected = get_associated_token_address_with_program_id(
        &wallet.pubkey,
        &mint.pubkey,
        &token_program.pubkey,
    );
    if expected != ata.pubkey {
        return Err(InstructionError::InvalidSeeds);
    }

    if accounts.get(&ata.pubkey).is_some_and(|account| account.lamports > 0) {
        if !idempotent {
            return Err(custom(SystemError::AccountAlreadyInUse));
        }
        let existing = load_token_account(accounts, &token_program.pubkey, &ata.pubkey)?;
        if existing.owner != wallet.pubkey || existing.mint != mint.pubkey {
            return Err(InstructionError::IllegalOwner);
        }
        return Ok(());
    }

    load_mint(accounts, &token_program.pubkey, &mint.pubkey)?;
    let rent = Rent::default().minimum_balance(TokenAccount::LEN);
    debit(accounts, &funder.pubkey, rent)?;

    let mut data = vec![0; TokenAccount::LEN];
    pack(new_token_account(mint.pubkey, wallet.pubkey), &mut data)?;
    accounts.insert(
        ata.pubkey,
        solana_account::Account {
            lamports: rent,
            data,
            owner: token_program.pubkey,
            executable: false,
            rent_epoch: 0,
        },
    );
    Ok(())
}

fn new_token_account(mint: Address, owner: Address) -> TokenAccount {
    TokenAccount {
        mint,
        owner,
        state: AccountState::Initialized,
        ..Default::default()
    }
}

/// The data of a freshly allocated, rent exempt account owned by `token_program`.
fn uninitialized_data<'a>(
    accounts: &'a mut AccountStore,
    token_program: &Address,
    address: &Address,
    len: usize,
) -> Result<&'a mut Vec<u8>, InstructionError> {
    let account = accounts
        .get_mut(address)
        .ok_or(InstructionError::UninitializedAccount)?;
    if &account.owner != token_program {
        return Err(InstructionError::IncorrectProgramId);
    }
    if account.data.len() != len {
        return Err(InstructionError::InvalidAccountData);
    }
    if account.lamports < Rent::default().minimum_balance(len) {
        return Err(token_err(TokenError::NotRentExempt));
    }
    Ok(&mut account.data)
}

fn load_mint(
    accounts: &AccountStore,
    token_program: &Address,
    address: &Address,
) -> Result<Mint, InstructionError> {
    accounts
        .get(address)
        .filter(|account| &account.owner == token_program)
        .and_then(|account| Mint::unpack(&account.data).ok())
        .ok_or_else(|| token_err(TokenError::InvalidMint))
}

fn load_token_account(
    accounts: &AccountStore,
    token_program: &Address,
    address: &Address,
) -> Result<TokenAccount, InstructionError> {
    let account = accounts
        .get(address)
        .ok_or(InstructionError::UninitializedAccount)?;
    if &account.owner != token_program {
        return Err(InstructionError::IncorrectProgramId);
    }
    TokenAccount::unpack(&account.data).map_err(|_| InstructionError::UninitializedAccount)
}

fn store<T: Pack>(
    accounts: &mut AccountStore,
    address: &Address,
    state: T,
) -> Result<(), InstructionError> {
    let account = accounts
        .get_mut(address)
        .ok_or(InstructionError::UninitializedAccount)?;
    pack(state, &mut account.data)
}

fn pack<T: Pack>(state: T, data: &mut [u8]) -> Result<(), InstructionError> {
    T::pack(state, data).map_err(|_| InstructionError::InvalidAccountData)
}

#[cfg(test)]
mod tests {
    use favorites_interface::{
        program,
        SYSTEM_PROGRAM_ID,
    };
    use solana_account::Account;
    use spl_associated_token_account_interface::instruction::create_associated_token_account_idempotent;

    use super::*;
    use crate::{
        local_cluster::processor::process_instruction,
        token_instructions::{
            create_and_initialize_multisig_instructions,
            create_and_initialize_token_instructions,
        },
    };

    const FUNDS: u64 = 1_000_000_000;

    fn run(store: &mut AccountStore, ix: &Instruction) -> Result<(), InstructionError> {
        process_instruction(store, &program::ID, ix)
    }

    fn store_with(payer: &Address) -> AccountStore {
        AccountStore::from([(*payer, Account::new(FUNDS, 0, &SYSTEM_PROGRAM_ID))])
    }

    fn create_mint(store: &mut AccountStore, payer: &Address, authority: &Address) -> Address {
        let mint = Address::new_unique();
        let (create, initialize) = create_and_initialize_token_instructions(
            payer,
            &mint,
            authority,
            Rent::default().minimum_balance(Mint::LEN),
            6,
            &spl_token_interface::ID,
        )
        .unwrap();
        run(store, &create).unwrap();
        run(store, &initialize).unwrap();
        mint
    }

    fn create_ata(store: &mut AccountStore, payer: &Address, mint: &Address) -> Address {
        let ix = create_associated_token_account_idempotent(
            payer,
            payer,
            mint,
            &spl_token_interface::ID,
        );
        run(store, &ix).unwrap();
        get_associated_token_address_with_program_id(payer, mint, &spl_token_interface::ID)
    }

    fn balance(store: &AccountStore, token_account: &Address) -> u64 {
        TokenAccount::unpack(&store[token_account].data).unwrap().amount
    }

    #[test]
    fn mint_to_credits_the_token_account_and_supply() {
        let payer = Address::new_unique();
        let mut store = store_with(&payer);
        let mint = create_mint(&mut store, &payer, &payer);
        let ata = create_ata(&mut store, &payer, &mint);

        let ix = spl_token_interface::instruction::mint_to_checked(
            &spl_token_interface::ID,
            &mint,
            &ata,
            &payer,
            &[],
            500,
            6,
        )
        .unwrap();
        run(&mut store, &ix).unwrap();

        assert_eq!(balance(&store, &ata), 500);
        assert_eq!(Mint::unpack(&store[&mint].data).unwrap().supply, 500);
    }

    #[test]
    fn mint_to_checks_the_authority_and_decimals() {
        let payer = Address::new_unique();
        let mut store = store_with(&payer);
        let mint = create_mint(&mut store, &payer, &payer);
        let ata = create_ata(&mut store, &payer, &mint);

        let impostor = Address::new_unique();
        let ix = spl_token_interface::instruction::mint_to(
            &spl_token_interface::ID,
            &mint,
            &ata,
            &impostor,
            &[],
            1,
        )
        .unwrap();
        assert_eq!(
            run(&mut store, &ix),
            Err(InstructionError::Custom(TokenError::OwnerMismatch as u32))
        );

        let ix = spl_token_interface::instruction::mint_to_checked(
            &spl_token_interface::ID,
            &mint,
            &ata,
            &payer,
            &[],
            1,
            9,
        )
        .unwrap();
        assert_eq!(
            run(&mut store, &ix),
            Err(InstructionError::Custom(TokenError::MintDecimalsMismatch as u32))
        );
    }

    #[test]
    fn multisig_authority_needs_m_signers() {
        let payer = Address::new_unique();
        let second = Address::new_unique();
        let multisig = Address::new_unique();
        let mut store = store_with(&payer);

        let (create, initialize) = create_and_initialize_multisig_instructions(
            &payer,
            &multisig,
            &[payer, second],
            2,
            Rent::default().minimum_balance(Multisig::LEN),
            &spl_token_interface::ID,
        )
        .unwrap();
        run(&mut store, &create).unwrap();
        run(&mut store, &initialize).unwrap();

        let mint = create_mint(&mut store, &payer, &multisig);
        let ata = create_ata(&mut store, &payer, &mint);

        let mut ix = spl_token_interface::instruction::mint_to(
            &spl_token_interface::ID,
            &mint,
            &ata,
            &multisig,
            &[&payer, &second],
            7,
        )
        .unwrap();
        run(&mut store, &ix).unwrap();
        assert_eq!(balance(&store, &ata), 7);

        ix.accounts[4].is_signer = false;
        assert_eq!(
            run(&mut store, &ix),
            Err(InstructionError::MissingRequiredSignature)
        );
    }

    #[test]
    fn idempotent_ata_creation_is_a_no_op_the_second_time() {
        let payer = Address::new_unique();
        let mut store = store_with(&payer);
        let mint = create_mint(&mut store, &payer, &payer);

        let ata = create_ata(&mut store, &payer, &mint);
        let lamports = store[&payer].lamports;
        assert_eq!(create_ata(&mut store, &payer, &mint), ata);

        assert_eq!(store[&payer].lamports, lamports);
        assert_eq!(store[&ata].owner, spl_token_interface::ID);
    }

    #[test]
    fn mint_cannot_be_initialized_twice() {
        let payer = Address::new_unique();
        let mut store = store_with(&payer);
        let mint = create_mint(&mut store, &payer, &payer);

        let ix = spl_token_interface::instruction::initialize_mint2(
            &spl_token_interface::ID,
            &mint,
            &payer,
            None,
            6,
        )
        .unwrap();
        assert_eq!(
            run(&mut store, &ix),
            Err(InstructionError::Custom(TokenError::AlreadyInUse as u32))
        );
    }
}
