//! Token-level context for creating mints, token accounts and multisig authorities, and for
//! minting, in scripts and tests.

use solana_address::Address;
use solana_sdk::{
    program_pack::Pack,
    signature::{
        Keypair,
        Signature,
    },
    signer::Signer,
};
use spl_associated_token_account_interface::{
    address::get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token_interface::{
    instruction::{
        mint_to,
        mint_to_checked,
    },
    state::{
        Account,
        Mint,
        Multisig,
    },
};

use crate::{
    error::ClientError,
    rpc::ClusterRpc,
    token_instructions::{
        create_and_initialize_multisig_instructions,
        create_and_initialize_token_account_instructions,
        create_and_initialize_token_instructions,
    },
    transactions::ChainClient,
};

/// An `m` of `n` multisig account that can act as a mint authority.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MultisigAuthority {
    pub address: Address,
    pub signers: Vec<Address>,
    pub m: u8,
}

impl MultisigAuthority {
    /// Allocates and initializes `multisig`, paid for by `payer`.
    pub async fn create<R: ClusterRpc>(
        rpc: &ChainClient<R>,
        payer: &Keypair,
        multisig: &Keypair,
        signers: Vec<Address>,
        m: u8,
    ) -> Result<Self, ClientError> {
        let rent = rpc
            .client
            .get_minimum_balance_for_rent_exemption(Multisig::LEN)
            .await?;
        let (create, initialize) = create_and_initialize_multisig_instructions(
            &payer.pubkey(),
            &multisig.pubkey(),
            &signers,
            m,
            rent,
            &spl_token_interface::ID,
        )?;

        rpc.send_and_confirm_txn(payer, &[multisig], &[create, initialize])
            .await?;

        Ok(Self {
            address: multisig.pubkey(),
            signers,
            m,
        })
    }
}

pub struct TokenContext {
    /// If the mint authority is provided, [`TokenContext`] can mint tokens directly to token
    /// accounts.
    mint_authority: Option<Keypair>,
    pub mint_address: Address,
    pub token_program: Address,
    pub mint_decimals: u8,
}

impl TokenContext {
    /// Creates a new [`TokenContext`] from an existing mint. Checks that the mint exists and is
    /// owned by the token program.
    pub async fn new_from_existing<R: ClusterRpc>(
        rpc: &ChainClient<R>,
        mint: Address,
        mint_authority: Option<Keypair>,
    ) -> Result<Self, ClientError> {
        let account = rpc
            .client
            .get_account(&mint)
            .await?
            .ok_or(ClientError::AccountNotFound(mint))?;
        let invalid = |reason: String| ClientError::InvalidAccount {
            address: mint,
            reason,
        };
        if account.owner != spl_token_interface::ID {
            return Err(invalid(format!(
                "owned by {}, expected the token program",
                account.owner
            )));
        }
        let state = Mint::unpack(&account.data).map_err(|e| invalid(e.to_string()))?;

        let passed = mint_authority.as_ref().map(|kp| kp.pubkey());
        let on_chain = Option::<Address>::from(state.mint_authority);
        // If the mint authority is passed in, it must match the mint authority on-chain.
        if passed.is_some() && passed != on_chain {
            return Err(ClientError::Token(format!(
                "mint authority passed in {passed:?} doesn't match authority on-chain {on_chain:?}"
            )));
        }

        Ok(Self {
            mint_authority,
            mint_address: mint,
            token_program: account.owner,
            mint_decimals: state.decimals,
        })
    }

    /// Creates `mint` with `mint_authority` paying for it and holding the authority.
    pub async fn create_new_from_mint<R: ClusterRpc>(
        rpc: &ChainClient<R>,
        mint_authority: Keypair,
        mint: &Keypair,
        decimals: u8,
    ) -> Result<Self, ClientError> {
        let authority = mint_authority.pubkey();
        Self::create_mint(rpc, &mint_authority, mint, &authority, decimals).await?;

        Ok(Self {
            mint_authority: Some(mint_authority),
            mint_address: mint.pubkey(),
            token_program: spl_token_interface::ID,
            mint_decimals: decimals,
        })
    }

    /// Creates `mint` with a multisig mint authority. Minting then goes through
    /// [`TokenContext::mint_to_with_multisig`].
    pub async fn create_new_with_multisig<R: ClusterRpc>(
        rpc: &ChainClient<R>,
        payer: &Keypair,
        multisig: &MultisigAuthority,
        mint: &Keypair,
        decimals: u8,
    ) -> Result<Self, ClientError> {
        Self::create_mint(rpc, payer, mint, &multisig.address, decimals).await?;

        Ok(Self {
            mint_authority: None,
            mint_address: mint.pubkey(),
            token_program: spl_token_interface::ID,
            mint_decimals: decimals,
        })
    }

    async fn create_mint<R: ClusterRpc>(
        rpc: &ChainClient<R>,
        payer: &Keypair,
        mint: &Keypair,
        mint_authority: &Address,
        decimals: u8,
    ) -> Result<Signature, ClientError> {
        let rent = rpc
            .client
            .get_minimum_balance_for_rent_exemption(Mint::LEN)
            .await?;
        let (create_mint_account, initialize_mint) = create_and_initialize_token_instructions(
            &payer.pubkey(),
            &mint.pubkey(),
            mint_authority,
            rent,
            decimals,
            &spl_token_interface::ID,
        )?;

        rpc.send_and_confirm_txn(payer, &[mint], &[create_mint_account, initialize_mint])
            .await
    }

    pub fn mint_authority(&self) -> Result<&Keypair, ClientError> {
        self.mint_authority.as_ref().ok_or_else(|| {
            ClientError::Token("mint authority wasn't passed to the token context".into())
        })
    }

    /// Creates the associated token account of `owner`, paid for by `payer`. Does nothing if it
    /// already exists.
    pub async fn create_ata_for<R: ClusterRpc>(
        &self,
        rpc: &ChainClient<R>,
        payer: &Keypair,
        owner: &Address,
    ) -> Result<Address, ClientError> {
        let create_ata_instruction = create_associated_token_account_idempotent(
            &payer.pubkey(),
            owner,
            &self.mint_address,
            &self.token_program,
        );
        rpc.send_single_signer(payer, [create_ata_instruction])
            .await?;

        Ok(self.get_ata_for(owner))
    }

    pub fn get_ata_for(&self, owner: &Address) -> Address {
        get_associated_token_address_with_program_id(owner, &self.mint_address, &self.token_program)
    }

    /// Creates a token account for `owner` at the address of `token_account`, outside the
    /// associated token account scheme.
    pub async fn create_token_account<R: ClusterRpc>(
        &self,
        rpc: &ChainClient<R>,
        payer: &Keypair,
        owner: &Address,
        token_account: &Keypair,
    ) -> Result<Address, ClientError> {
        let rent = rpc
            .client
            .get_minimum_balance_for_rent_exemption(Account::LEN)
            .await?;
        let (create, initialize) = create_and_initialize_token_account_instructions(
            &payer.pubkey(),
            &token_account.pubkey(),
            &self.mint_address,
            owner,
            rent,
            &self.token_program,
        )?;

        rpc.send_and_confirm_txn(payer, &[token_account], &[create, initialize])
            .await?;

        Ok(token_account.pubkey())
    }

    /// If the mint authority was passed to the token context upon creation, this mints tokens
    /// directly to `token_account`. Otherwise, it fails immediately.
    pub async fn mint_to<R: ClusterRpc>(
        &self,
        rpc: &ChainClient<R>,
        payer: &Keypair,
        token_account: &Address,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let mint_authority = self.mint_authority()?;
        let mint_ix = mint_to_checked(
            &self.token_program,
            &self.mint_address,
            token_account,
            &mint_authority.pubkey(),
            &[],
            amount,
            self.mint_decimals,
        )
        .map_err(|e| ClientError::Token(e.to_string()))?;

        rpc.send_and_confirm_txn(payer, &[mint_authority], &[mint_ix])
            .await
    }

    /// Mints through a multisig authority. `signers` must include at least `multisig.m` of its
    /// listed signers.
    pub async fn mint_to_with_multisig<R: ClusterRpc>(
        &self,
        rpc: &ChainClient<R>,
        payer: &Keypair,
        multisig: &MultisigAuthority,
        signers: &[&Keypair],
        token_account: &Address,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let signer_pubkeys = signers.iter().map(|kp| kp.pubkey()).collect::<Vec<_>>();
        let mint_ix = mint_to(
            &self.token_program,
            &self.mint_address,
            token_account,
            &multisig.address,
            &signer_pubkeys.iter().collect::<Vec<_>>(),
            amount,
        )
        .map_err(|e| ClientError::Token(e.to_string()))?;

        rpc.send_and_confirm_txn(payer, signers, &[mint_ix]).await
    }

    /// The token amount held by `token_account`.
    pub async fn token_balance<R: ClusterRpc>(
        &self,
        rpc: &ChainClient<R>,
        token_account: &Address,
    ) -> Result<u64, ClientError> {
        let account = rpc
            .client
            .get_account(token_account)
            .await?
            .ok_or(ClientError::AccountNotFound(*token_account))?;
        let state = Account::unpack(&account.data).map_err(|e| ClientError::InvalidAccount {
            address: *token_account,
            reason: e.to_string(),
        })?;
        Ok(state.amount)
    }

    /// The token amount held by the associated token account of `owner`.
    pub async fn get_balance_for<R: ClusterRpc>(
        &self,
        rpc: &ChainClient<R>,
        owner: &Address,
    ) -> Result<u64, ClientError> {
        self.token_balance(rpc, &self.get_ata_for(owner)).await
    }
}
