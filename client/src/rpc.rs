//! The RPC calls the client makes, behind a trait so the same helpers drive a live cluster through
//! [`RpcClient`] or the in-process [`crate::local_cluster::LocalCluster`].

use solana_account::Account;
use solana_address::Address;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    hash::Hash,
    signature::Signature,
    transaction::Transaction,
};

use crate::error::RpcError;

/// Single-shot network calls. Each call suspends until the network answers; any retry or timeout
/// policy belongs to the implementation.
#[allow(async_fn_in_trait)]
pub trait ClusterRpc {
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError>;

    /// Returns `None` when no account exists at `address`.
    async fn get_account(&self, address: &Address) -> Result<Option<Account>, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize)
        -> Result<u64, RpcError>;

    async fn request_airdrop(&self, address: &Address, lamports: u64)
        -> Result<Signature, RpcError>;

    /// Whether `signature` has reached the implementation's commitment level.
    async fn confirm_transaction(&self, signature: &Signature) -> Result<bool, RpcError>;

    /// Submits `transaction` and waits until it reaches the implementation's commitment level.
    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError>;
}

impl ClusterRpc for RpcClient {
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        Ok(RpcClient::get_balance(self, address).await?)
    }

    async fn get_account(&self, address: &Address) -> Result<Option<Account>, RpcError> {
        Ok(self
            .get_account_with_commitment(address, self.commitment())
            .await?
            .value)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(RpcClient::get_latest_blockhash(self).await?)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        Ok(RpcClient::get_minimum_balance_for_rent_exemption(self, data_len).await?)
    }

    async fn request_airdrop(
        &self,
        address: &Address,
        lamports: u64,
    ) -> Result<Signature, RpcError> {
        Ok(RpcClient::request_airdrop(self, address, lamports).await?)
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<bool, RpcError> {
        Ok(RpcClient::confirm_transaction(self, signature).await?)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError> {
        Ok(RpcClient::send_and_confirm_transaction(self, transaction).await?)
    }
}
