//! An in-process stand-in for a validator, used to run the client without a network.
//!
//! [`LocalCluster`] keeps accounts in a `HashMap` and executes system transfers, account creation,
//! the common SPL token instructions, and the `favorites` program's instructions with the same
//! custom error codes the deployed programs return.
//! Transactions confirm as soon as they are sent, and signatures are verified against the message.

pub mod processor;
pub mod token;

use std::{
    cell::RefCell,
    collections::{
        HashMap,
        HashSet,
        VecDeque,
    },
};

use solana_account::Account;
use solana_address::Address;
use solana_instruction::{
    AccountMeta,
    Instruction,
};
use solana_sdk::{
    hash::Hash,
    rent::Rent,
    signature::Signature,
    transaction::Transaction,
};
use solana_transaction_error::TransactionError;

use crate::{
    error::RpcError,
    rpc::ClusterRpc,
};
use processor::{
    process_instruction,
    AccountStore,
};

pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// How many blockhashes stay valid for new transactions.
pub const MAX_RECENT_BLOCKHASHES: usize = 150;

/// How the local faucet answers airdrop requests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FaucetBehavior {
    /// Credit the address and confirm immediately.
    #[default]
    Confirm,
    /// Fail the request.
    Reject,
    /// Accept the request but never land the credit.
    NeverConfirm,
    /// Accept the request and land the credit on the given confirmation poll, the way a
    /// `finalized` airdrop trails the tip on a live cluster.
    ConfirmAfter(u32),
}

struct PendingAirdrop {
    address: Address,
    lamports: u64,
    polls_left: u32,
}

struct ClusterState {
    accounts: AccountStore,
    processed: HashSet<Signature>,
    airdrop_requests: Vec<(Address, u64)>,
    pending_airdrops: HashMap<Signature, PendingAirdrop>,
    faucet: FaucetBehavior,
    blockhashes: VecDeque<Hash>,
    counter: u64,
}

impl ClusterState {
    fn next_id(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn advance_blockhash(&mut self) {
        let mut bytes = [0; 32];
        bytes[..8].copy_from_slice(&self.next_id().to_le_bytes());
        self.blockhashes.push_back(Hash::new_from_array(bytes));
        if self.blockhashes.len() > MAX_RECENT_BLOCKHASHES {
            self.blockhashes.pop_front();
        }
    }

    fn next_airdrop_signature(&mut self) -> Signature {
        let mut bytes = [0xad; 64];
        bytes[..8].copy_from_slice(&self.next_id().to_le_bytes());
        Signature::from(bytes)
    }
}

pub struct LocalCluster {
    program_id: Address,
    state: RefCell<ClusterState>,
}

impl Default for LocalCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCluster {
    /// Creates an empty cluster with the favorites program at [`favorites_interface::program::ID`].
    pub fn new() -> Self {
        let mut state = ClusterState {
            accounts: AccountStore::new(),
            processed: HashSet::new(),
            airdrop_requests: vec![],
            pending_airdrops: HashMap::new(),
            faucet: FaucetBehavior::default(),
            blockhashes: VecDeque::new(),
            counter: 0,
        };
        state.advance_blockhash();

        Self {
            program_id: favorites_interface::program::ID,
            state: RefCell::new(state),
        }
    }

    /// Deploys the favorites program at `program_id` instead.
    pub fn with_program_id(mut self, program_id: Address) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_faucet(self, faucet: FaucetBehavior) -> Self {
        self.set_faucet(faucet);
        self
    }

    /// Creates each account passed in at its respective address.
    pub fn with_accounts(self, accounts: impl IntoIterator<Item = (Address, Account)>) -> Self {
        self.state.borrow_mut().accounts.extend(accounts);
        self
    }

    pub fn program_id(&self) -> Address {
        self.program_id
    }

    pub fn set_faucet(&self, faucet: FaucetBehavior) {
        self.state.borrow_mut().faucet = faucet;
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        self.state.borrow().accounts.get(address).cloned()
    }

    pub fn set_account(&self, address: Address, account: Account) {
        self.state.borrow_mut().accounts.insert(address, account);
    }

    /// Every airdrop requested so far, in order, whether or not it landed.
    pub fn airdrop_requests(&self) -> Vec<(Address, u64)> {
        self.state.borrow().airdrop_requests.clone()
    }

    fn process_transaction(&self, tx: &Transaction) -> Result<Signature, TransactionError> {
        let mut state = self.state.borrow_mut();

        tx.verify()
            .map_err(|_| TransactionError::SignatureFailure)?;
        let signature = tx.signatures[0];
        if state.processed.contains(&signature) {
            return Err(TransactionError::AlreadyProcessed);
        }
        if !state.blockhashes.contains(&tx.message.recent_blockhash) {
            return Err(TransactionError::BlockhashNotFound);
        }

        let instructions = decompile(tx)?;

        // Fees are charged even when an instruction fails.
        let fee = LAMPORTS_PER_SIGNATURE * u64::from(tx.message.header.num_required_signatures);
        let payer = tx
            .message
            .account_keys
            .first()
            .ok_or(TransactionError::AccountNotFound)?;
        let payer_account = state
            .accounts
            .get_mut(payer)
            .ok_or(TransactionError::AccountNotFound)?;
        payer_account.lamports = payer_account
            .lamports
            .checked_sub(fee)
            .ok_or(TransactionError::InsufficientFundsForFee)?;

        state.processed.insert(signature);
        state.advance_blockhash();

        let mut scratch = state.accounts.clone();
        for (index, instruction) in instructions.iter().enumerate() {
            process_instruction(&mut scratch, &self.program_id, instruction)
                .map_err(|e| TransactionError::InstructionError(index as u8, e))?;
        }
        state.accounts = scratch;

        Ok(signature)
    }
}

/// Expands the compiled message back into instructions with resolved account metas.
fn decompile(tx: &Transaction) -> Result<Vec<Instruction>, TransactionError> {
    let message = &tx.message;
    let keys = &message.account_keys;
    let num_signers = message.header.num_required_signatures as usize;
    let num_writable_signers =
        num_signers.saturating_sub(message.header.num_readonly_signed_accounts as usize);
    let num_writable =
        keys.len().saturating_sub(message.header.num_readonly_unsigned_accounts as usize);

    let meta = |index: u8| -> Result<AccountMeta, TransactionError> {
        let index = index as usize;
        let pubkey = *keys.get(index).ok_or(TransactionError::AccountNotFound)?;
        let is_signer = index < num_signers;
        let is_writable = if is_signer {
            index < num_writable_signers
        } else {
            index < num_writable
        };
        Ok(AccountMeta {
            pubkey,
            is_signer,
            is_writable,
        })
    };

    message
        .instructions
        .iter()
        .map(|compiled| {
            Ok(Instruction {
                program_id: meta(compiled.program_id_index)?.pubkey,
                accounts: compiled
                    .accounts
                    .iter()
                    .map(|index| meta(*index))
                    .collect::<Result<_, _>>()?,
                data: compiled.data.clone(),
            })
        })
        .collect()
}

impl ClusterRpc for LocalCluster {
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        Ok(self
            .state
            .borrow()
            .accounts
            .get(address)
            .map_or(0, |account| account.lamports))
    }

    async fn get_account(&self, address: &Address) -> Result<Option<Account>, RpcError> {
        Ok(self.account(address))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        self.state
            .borrow()
            .blockhashes
            .back()
            .copied()
            .ok_or_else(|| RpcError::Transport("no blockhash available".into()))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        Ok(Rent::default().minimum_balance(data_len))
    }

    async fn request_airdrop(
        &self,
        address: &Address,
        lamports: u64,
    ) -> Result<Signature, RpcError> {
        let mut state = self.state.borrow_mut();
        state.airdrop_requests.push((*address, lamports));

        match state.faucet {
            FaucetBehavior::Reject => Err(RpcError::Transport(
                "airdrop request rejected by faucet".into(),
            )),
            FaucetBehavior::NeverConfirm => Ok(state.next_airdrop_signature()),
            FaucetBehavior::Confirm => {
                let signature = state.next_airdrop_signature();
                processor::credit_lamports(&mut state.accounts, address, lamports)
                    .map_err(|e| RpcError::Transport(e.to_string()))?;
                state.processed.insert(signature);
                Ok(signature)
            }
            FaucetBehavior::ConfirmAfter(polls) => {
                let signature = state.next_airdrop_signature();
                state.pending_airdrops.insert(
                    signature,
                    PendingAirdrop {
                        address: *address,
                        lamports,
                        polls_left: polls,
                    },
                );
                Ok(signature)
            }
        }
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<bool, RpcError> {
        let mut state = self.state.borrow_mut();

        if let Some(pending) = state.pending_airdrops.get_mut(signature) {
            pending.polls_left = pending.polls_left.saturating_sub(1);
            if pending.polls_left == 0 {
                if let Some(landed) = state.pending_airdrops.remove(signature) {
                    let ClusterState { accounts, .. } = &mut *state;
                    processor::credit_lamports(accounts, &landed.address, landed.lamports)
                        .map_err(|e| RpcError::Transport(e.to_string()))?;
                    state.processed.insert(*signature);
                }
            }
        }

        Ok(state.processed.contains(signature))
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError> {
        self.process_transaction(transaction)
            .map_err(RpcError::Transaction)
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::{
        message::Message,
        signature::{
            Keypair,
            Signer,
        },
    };

    use super::*;

    const FUNDS: u64 = 1_000_000_000;

    fn funded_cluster(payer: &Keypair) -> LocalCluster {
        LocalCluster::new().with_accounts([(
            payer.pubkey(),
            Account::new(FUNDS, 0, &favorites_interface::SYSTEM_PROGRAM_ID),
        )])
    }

    fn transfer_tx(cluster: &LocalCluster, payer: &Keypair, to: &Address, lamports: u64) -> Transaction {
        let ix = solana_system_interface::instruction::transfer(&payer.pubkey(), to, lamports);
        let blockhash = *cluster.state.borrow().blockhashes.back().unwrap();
        Transaction::new_signed_with_payer(&[ix], Some(&payer.pubkey()), &[payer], blockhash)
    }

    #[tokio::test]
    async fn transfer_charges_the_fee_and_moves_lamports() {
        let payer = Keypair::new();
        let to = Address::new_unique();
        let cluster = funded_cluster(&payer);

        let tx = transfer_tx(&cluster, &payer, &to, 1_000);
        let signature = cluster.send_and_confirm_transaction(&tx).await.unwrap();

        assert!(cluster.confirm_transaction(&signature).await.unwrap());
        assert_eq!(
            cluster.get_balance(&payer.pubkey()).await.unwrap(),
            FUNDS - 1_000 - LAMPORTS_PER_SIGNATURE
        );
        assert_eq!(cluster.get_balance(&to).await.unwrap(), 1_000);
    }

    #[tokio::test]
    async fn resubmission_is_already_processed() {
        let payer = Keypair::new();
        let cluster = funded_cluster(&payer);
        let tx = transfer_tx(&cluster, &payer, &Address::new_unique(), 1);

        cluster.send_and_confirm_transaction(&tx).await.unwrap();
        assert_eq!(
            cluster.send_and_confirm_transaction(&tx).await,
            Err(RpcError::Transaction(TransactionError::AlreadyProcessed))
        );
    }

    #[tokio::test]
    async fn failed_instructions_roll_back_but_keep_the_fee() {
        let payer = Keypair::new();
        let to = Address::new_unique();
        let cluster = funded_cluster(&payer);

        let tx = transfer_tx(&cluster, &payer, &to, FUNDS);
        let err = cluster.send_and_confirm_transaction(&tx).await.unwrap_err();
        assert!(matches!(
            err,
            RpcError::Transaction(TransactionError::InstructionError(0, _))
        ));
        assert_eq!(
            cluster.get_balance(&payer.pubkey()).await.unwrap(),
            FUNDS - LAMPORTS_PER_SIGNATURE
        );
        assert_eq!(cluster.get_account(&to).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unsigned_and_stale_transactions_are_rejected() {
        let payer = Keypair::new();
        let cluster = funded_cluster(&payer);
        let ix = solana_system_interface::instruction::transfer(
            &payer.pubkey(),
            &Address::new_unique(),
            1,
        );

        let unsigned = Transaction::new_unsigned(Message::new(&[ix.clone()], Some(&payer.pubkey())));
        assert_eq!(
            cluster.send_and_confirm_transaction(&unsigned).await,
            Err(RpcError::Transaction(TransactionError::SignatureFailure))
        );

        let stale = Transaction::new_signed_with_payer(
            &[ix],
            Some(&payer.pubkey()),
            &[&payer],
            Hash::new_from_array([7; 32]),
        );
        assert_eq!(
            cluster.send_and_confirm_transaction(&stale).await,
            Err(RpcError::Transaction(TransactionError::BlockhashNotFound))
        );
    }

    #[tokio::test]
    async fn forged_signature_is_a_signature_failure() {
        let payer = Keypair::new();
        let to = Address::new_unique();
        let cluster = funded_cluster(&payer);

        let mut tx = transfer_tx(&cluster, &payer, &to, 1_000);
        tx.signatures[0] = Signature::from([7u8; 64]);

        assert_eq!(
            cluster.send_and_confirm_transaction(&tx).await,
            Err(RpcError::Transaction(TransactionError::SignatureFailure))
        );
        assert_eq!(cluster.get_balance(&payer.pubkey()).await.unwrap(), FUNDS);
        assert_eq!(cluster.get_account(&to).await.unwrap(), None);
    }

    #[tokio::test]
    async fn transaction_signed_by_the_wrong_key_is_a_signature_failure() {
        let payer = Keypair::new();
        let impostor = Keypair::new();
        let cluster = funded_cluster(&payer);

        let mut tx = transfer_tx(&cluster, &payer, &Address::new_unique(), 1_000);
        tx.signatures[0] = impostor.sign_message(&tx.message_data());

        assert_eq!(
            cluster.send_and_confirm_transaction(&tx).await,
            Err(RpcError::Transaction(TransactionError::SignatureFailure))
        );
    }

    #[tokio::test]
    async fn unfunded_payer_cannot_pay_fees() {
        let payer = Keypair::new();
        let cluster = LocalCluster::new();
        let tx = transfer_tx(&cluster, &payer, &Address::new_unique(), 1);
        assert_eq!(
            cluster.send_and_confirm_transaction(&tx).await,
            Err(RpcError::Transaction(TransactionError::AccountNotFound))
        );
    }

    #[tokio::test]
    async fn faucet_behaviors() {
        let address = Address::new_unique();
        let cluster = LocalCluster::new();

        let signature = cluster.request_airdrop(&address, 10).await.unwrap();
        assert!(cluster.confirm_transaction(&signature).await.unwrap());
        assert_eq!(cluster.get_balance(&address).await.unwrap(), 10);

        cluster.set_faucet(FaucetBehavior::NeverConfirm);
        let signature = cluster.request_airdrop(&address, 10).await.unwrap();
        assert!(!cluster.confirm_transaction(&signature).await.unwrap());
        assert_eq!(cluster.get_balance(&address).await.unwrap(), 10);

        cluster.set_faucet(FaucetBehavior::Reject);
        assert!(cluster.request_airdrop(&address, 10).await.is_err());

        assert_eq!(cluster.airdrop_requests(), vec![(address, 10); 3]);
    }

    #[tokio::test]
    async fn delayed_airdrop_lands_on_the_given_poll() {
        let address = Address::new_unique();
        let cluster = LocalCluster::new().with_faucet(FaucetBehavior::ConfirmAfter(3));

        let signature = cluster.request_airdrop(&address, 10).await.unwrap();
        assert!(!cluster.confirm_transaction(&signature).await.unwrap());
        assert!(!cluster.confirm_transaction(&signature).await.unwrap());
        assert_eq!(cluster.get_balance(&address).await.unwrap(), 0);

        assert!(cluster.confirm_transaction(&signature).await.unwrap());
        assert!(cluster.confirm_transaction(&signature).await.unwrap());
        assert_eq!(cluster.get_balance(&address).await.unwrap(), 10);
    }
}
