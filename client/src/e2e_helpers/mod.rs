use favorites_interface::state::Favorites;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    signature::{
        Keypair,
        Signature,
        Signer,
    },
};

use crate::{
    context::favorites::FavoritesContext,
    error::ClientError,
    local_cluster::LocalCluster,
    rpc::ClusterRpc,
    transactions::{
        ChainClient,
        FundingConfig,
        SendTransactionConfig,
    },
};

/// Lamports requested for a fresh user when its balance is below [`USER_MINIMUM_BALANCE`].
pub const USER_AIRDROP_AMOUNT: u64 = LAMPORTS_PER_SOL / 2;
pub const USER_MINIMUM_BALANCE: u64 = LAMPORTS_PER_SOL / 2;

/// Convenience harness for end-to-end tests and examples.
///
/// Upon instantiation it:
/// - Creates a fresh user keypair.
/// - Tops the user up to [`USER_MINIMUM_BALANCE`] through the faucet if needed.
/// - Derives the user's favorites PDA under the client's configured program.
pub struct E2e<R: ClusterRpc = RpcClient> {
    pub rpc: ChainClient<R>,
    pub user: Keypair,
    pub favorites: FavoritesContext,
}

impl<R: ClusterRpc> E2e<R> {
    pub async fn new_funded_user(rpc: ChainClient<R>) -> Result<Self, ClientError> {
        let user = Keypair::new();
        let favorites = FavoritesContext::new_with_program(rpc.config.program_id, user.pubkey())?;

        rpc.airdrop_if_required(&user.pubkey(), USER_AIRDROP_AMOUNT, USER_MINIMUM_BALANCE)
            .await?;

        Ok(Self {
            rpc,
            user,
            favorites,
        })
    }

    pub async fn set_favorites(
        &self,
        number: u64,
        color: impl Into<String>,
    ) -> Result<Signature, ClientError> {
        self.favorites
            .set_favorites(number, color)
            .send_single_signer(&self.rpc, &self.user)
            .await
    }

    pub async fn update_favorites(
        &self,
        number: Option<u64>,
        color: Option<&str>,
    ) -> Result<Signature, ClientError> {
        self.favorites
            .update_favorites(number, color.map(str::to_string))?
            .send_single_signer(&self.rpc, &self.user)
            .await
    }

    pub async fn view_favorites(&self) -> Result<Favorites, ClientError> {
        self.favorites.fetch(&self.rpc).await
    }

    pub async fn balance(&self) -> Result<u64, ClientError> {
        self.rpc.balance(&self.user.pubkey()).await
    }
}

impl E2e<LocalCluster> {
    /// A funded user on a fresh [`LocalCluster`], with debug logging off and no confirmation
    /// delay.
    pub async fn local() -> Result<Self, ClientError> {
        Self::new_funded_user(local_client(LocalCluster::new())).await
    }
}

/// Wraps `cluster` in a [`ChainClient`] configured for network-free tests.
pub fn local_client(cluster: LocalCluster) -> ChainClient<LocalCluster> {
    let config = SendTransactionConfig {
        debug_logs: Some(false),
        program_id: cluster.program_id(),
        ..Default::default()
    };
    ChainClient::with_client(cluster, config).with_funding(FundingConfig {
        poll_interval: std::time::Duration::ZERO,
        ..Default::default()
    })
}
