//! Lightweight, nonblocking client utilities for funding accounts, sending transactions, and
//! reading `favorites` state back from a cluster.

use std::time::Duration;

use colored::Colorize;
use favorites_interface::state::Favorites;
use itertools::Itertools;
use solana_address::Address;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_sdk::{
    message::{
        Instruction,
        Message,
    },
    signature::{
        Keypair,
        Signature,
        Signer,
    },
    transaction::Transaction,
};

use crate::{
    config::ClientConfig,
    error::{
        ClientError,
        RpcError,
        SubmissionFailure,
    },
    pretty::instruction_error::PrettyInstructionError,
    print_kv,
    rpc::ClusterRpc,
    LogColor,
};

pub const DEFAULT_FUND_AMOUNT: u64 = 10_000_000_000;

/// Confirmation polls allowed for an airdrop at `processed` or `confirmed` commitment.
pub const CONFIRMED_CONFIRM_POLLS: u32 = 30;

/// Confirmation polls allowed for an airdrop at `finalized` commitment. Finalization trails the
/// tip by at least 32 slots, roughly 13 seconds on a live cluster.
pub const FINALIZED_CONFIRM_POLLS: u32 = 90;

pub struct ChainClient<R: ClusterRpc = RpcClient> {
    pub client: R,
    pub config: SendTransactionConfig,
    pub funding: FundingConfig,
}

impl Default for ChainClient {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl ChainClient {
    pub fn new(client: Option<RpcClient>, config: Option<SendTransactionConfig>) -> Self {
        let config = config.unwrap_or_default();
        let client = client.unwrap_or_else(|| ClientConfig::default().rpc_client());
        Self::with_rpc_client(client, config)
    }

    pub fn new_from_url(url: &str, config: SendTransactionConfig) -> Self {
        let client = RpcClient::new_with_commitment(url.into(), ClientConfig::default().commitment);
        Self::with_rpc_client(client, config)
    }

    /// Connects to the configured endpoint and sends to the configured program.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_rpc_client(
            config.rpc_client(),
            SendTransactionConfig {
                program_id: config.program_id,
                ..Default::default()
            },
        )
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::from_config(&ClientConfig::from_env()?))
    }

    /// Sizes the airdrop confirmation budget for the commitment `client` waits on.
    fn with_rpc_client(client: RpcClient, config: SendTransactionConfig) -> Self {
        let funding = FundingConfig::for_commitment(client.commitment());
        Self::with_client(client, config).with_funding(funding)
    }
}

impl<R: ClusterRpc> ChainClient<R> {
    pub fn with_client(client: R, config: SendTransactionConfig) -> Self {
        Self {
            client,
            config,
            funding: Default::default(),
        }
    }

    pub fn with_funding(mut self, funding: FundingConfig) -> Self {
        self.funding = funding;
        self
    }

    pub async fn balance(&self, address: &Address) -> Result<u64, ClientError> {
        Ok(self.client.get_balance(address).await?)
    }

    pub async fn fund_account(&self, address: &Address) -> Result<(), ClientError> {
        self.airdrop(address, self.funding.default_fund_amount)
            .await
    }

    pub async fn fund_new_account(&self) -> Result<Keypair, ClientError> {
        let kp = Keypair::new();
        self.fund_account(&kp.pubkey()).await?;

        Ok(kp)
    }

    /// Tops `address` up with `airdrop_amount` lamports if its balance is below
    /// `minimum_balance`, then returns the balance.
    ///
    /// No faucet request is made when the balance already meets the minimum.
    pub async fn airdrop_if_required(
        &self,
        address: &Address,
        airdrop_amount: u64,
        minimum_balance: u64,
    ) -> Result<u64, ClientError> {
        let balance = self.balance(address).await?;
        if balance >= minimum_balance {
            return Ok(balance);
        }

        self.airdrop(address, airdrop_amount).await?;
        self.balance(address).await
    }

    async fn airdrop(&self, address: &Address, lamports: u64) -> Result<(), ClientError> {
        let funding_error = |reason: String| ClientError::Funding {
            address: *address,
            reason,
        };

        let airdrop_signature = self
            .client
            .request_airdrop(address, lamports)
            .await
            .map_err(|e| funding_error(format!("airdrop request failed: {e}")))?;

        // Wait for airdrop confirmation.
        for _ in 0..self.funding.max_confirm_polls {
            if self
                .client
                .confirm_transaction(&airdrop_signature)
                .await
                .map_err(|e| funding_error(format!("couldn't confirm airdrop: {e}")))?
            {
                return Ok(());
            }
            tokio::time::sleep(self.funding.poll_interval).await;
        }

        Err(funding_error(format!(
            "airdrop {airdrop_signature} did not land after {} polls",
            self.funding.max_confirm_polls
        )))
    }

    /// Sends and confirms a single signer transaction with the signer passed in as the payer and
    /// sole signer.
    /// Instructions that require multiple signers should not be used here as they will fail.
    pub async fn send_single_signer(
        &self,
        signer: &Keypair,
        instructions: impl AsRef<[Instruction]>,
    ) -> Result<Signature, ClientError> {
        self.send_and_confirm_txn(signer, &[signer], instructions.as_ref())
            .await
    }

    /// Signs `instructions` with `payer` and `signers`, submits them, and waits for the client's
    /// commitment level.
    ///
    /// A rejected transaction is decoded into [`ClientError::Submission`].
    pub async fn send_and_confirm_txn(
        &self,
        payer: &Keypair,
        signers: &[&Keypair],
        instructions: &[Instruction],
    ) -> Result<Signature, ClientError> {
        let signed = self.sign_transaction(payer, signers, instructions).await?;
        self.send_signed(&signed).await
    }

    /// Builds and signs a transaction against the latest blockhash, prepending compute budget
    /// instructions if configured. `payer` is the fee payer and signs along with `signers`.
    pub async fn sign_transaction(
        &self,
        payer: &Keypair,
        signers: &[&Keypair],
        instructions: &[Instruction],
    ) -> Result<SignedTransaction, ClientError> {
        let bh = self.client.get_latest_blockhash().await?;

        let final_instructions = [
            self.config.compute_budget.map_or(vec![], |budget| {
                vec![
                    ComputeBudgetInstruction::set_compute_unit_limit(budget),
                    ComputeBudgetInstruction::set_compute_unit_price(1),
                ]
            }),
            instructions.to_vec(),
        ]
        .concat();

        let msg = Message::new(&final_instructions, Some(&payer.pubkey()));

        let all_signers = std::iter::once(payer)
            .chain(signers.iter().copied())
            .unique_by(|kp| kp.pubkey())
            .collect_vec();

        let mut transaction = Transaction::new_unsigned(msg);
        transaction
            .try_sign(&all_signers, bh)
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        Ok(SignedTransaction {
            transaction,
            instructions: final_instructions,
        })
    }

    /// Submits an already signed transaction and waits for the client's commitment level.
    ///
    /// Resubmitting a transaction that already landed fails with the network's "already
    /// processed" error.
    pub async fn send_signed(&self, signed: &SignedTransaction) -> Result<Signature, ClientError> {
        let payer = signed.payer();
        let debug_logs = matches!(self.config.debug_logs, Some(true));

        match self
            .client
            .send_and_confirm_transaction(&signed.transaction)
            .await
        {
            Ok(signature) => {
                if debug_logs {
                    print_kv!("Signature", signature, LogColor::Info);
                    if let Some(payer) = payer {
                        print_kv!("Payer", payer, LogColor::Info);
                    }
                }
                Ok(signature)
            }
            Err(RpcError::Transaction(error)) => {
                let failure = SubmissionFailure::from_transaction_error(
                    &error,
                    &signed.instructions,
                    &self.config.program_id,
                );
                if debug_logs {
                    print!("{}", PrettyInstructionError::new(&failure));
                    if let Some(payer) = payer {
                        print_kv!("Payer", payer, LogColor::Error);
                    }
                }
                Err(ClientError::Submission(failure))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Transfers `lamports` from `from` to `to` through the system program.
    pub async fn transfer(
        &self,
        from: &Keypair,
        to: &Address,
        lamports: u64,
    ) -> Result<Signature, ClientError> {
        let ix = solana_system_interface::instruction::transfer(&from.pubkey(), to, lamports);
        self.send_single_signer(from, [ix]).await
    }

    /// Checks if an account at the given address exists on-chain.
    pub async fn account_exists(&self, address: &Address) -> Result<bool, ClientError> {
        Ok(self.client.get_account(address).await?.is_some())
    }

    /// Reads the favorites account at `address`, owned by the configured program.
    pub async fn fetch_favorites(&self, address: &Address) -> Result<Favorites, ClientError> {
        self.fetch_favorites_owned_by(address, &self.config.program_id)
            .await
    }

    pub async fn fetch_favorites_owned_by(
        &self,
        address: &Address,
        program_id: &Address,
    ) -> Result<Favorites, ClientError> {
        let account = self
            .client
            .get_account(address)
            .await?
            .ok_or(ClientError::AccountNotFound(*address))?;

        if &account.owner != program_id {
            return Err(ClientError::InvalidAccount {
                address: *address,
                reason: format!("owned by {}, expected {program_id}", account.owner),
            });
        }

        Favorites::unpack(&account.data).map_err(|e| ClientError::InvalidAccount {
            address: *address,
            reason: e.to_string(),
        })
    }
}

/// A signed transaction with the ordered instruction list it was compiled from, which is needed
/// to attribute a failing instruction index to its program.
#[derive(Clone, Debug)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub instructions: Vec<Instruction>,
}

impl SignedTransaction {
    /// The fee payer, which is always the first account key.
    pub fn payer(&self) -> Option<Address> {
        self.transaction.message.account_keys.first().copied()
    }
}

#[derive(Clone, Debug)]
pub struct SendTransactionConfig {
    pub compute_budget: Option<u32>,
    pub debug_logs: Option<bool>,
    /// The program whose custom error codes are decoded against the favorites tables.
    pub program_id: Address,
}

impl Default for SendTransactionConfig {
    fn default() -> Self {
        SendTransactionConfig {
            compute_budget: Default::default(),
            debug_logs: Some(true),
            program_id: favorites_interface::program::ID,
        }
    }
}

/// How long [`ChainClient`] waits for a faucet credit to be confirmed.
#[derive(Clone, Debug, PartialEq)]
pub struct FundingConfig {
    pub max_confirm_polls: u32,
    pub poll_interval: Duration,
    /// Lamports requested by [`ChainClient::fund_account`].
    pub default_fund_amount: u64,
}

impl FundingConfig {
    pub fn for_commitment(commitment: CommitmentConfig) -> Self {
        let max_confirm_polls = if commitment.is_finalized() {
            FINALIZED_CONFIRM_POLLS
        } else {
            CONFIRMED_CONFIRM_POLLS
        };

        FundingConfig {
            max_confirm_polls,
            poll_interval: Duration::from_millis(500),
            default_fund_amount: DEFAULT_FUND_AMOUNT,
        }
    }

    /// The total time spent polling before an airdrop is reported as not landed.
    pub fn confirm_timeout(&self) -> Duration {
        self.poll_interval * self.max_confirm_polls
    }
}

/// Sized for the default `finalized` commitment.
impl Default for FundingConfig {
    fn default() -> Self {
        Self::for_commitment(ClientConfig::default().commitment)
    }
}
