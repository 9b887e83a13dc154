//! Client configuration read from environment variables, or from a `.env` file in the working
//! directory (or any parent). Variables already set in the process take precedence over the file.
//!
//! | Variable               | Meaning                                                     |
//! |------------------------|-------------------------------------------------------------|
//! | `RPC_URL`              | Explicit RPC endpoint. Takes precedence over the cluster.   |
//! | `SOLANA_CLUSTER`       | `localnet` (default), `devnet`, `testnet`, `mainnet-beta`.  |
//! | `COMMITMENT`           | `processed`, `confirmed`, or `finalized` (default).         |
//! | `FAVORITES_PROGRAM_ID` | Overrides [`favorites_interface::program::ID`].             |
//! | `SECRET_KEY`           | Payer keypair, see [`crate::keypair::keypair_from_str`].    |
//! | `RECIPIENT_WALLET`     | Destination of the `send_sol` script.                       |
//! | `MINT`                 | Existing mint used by the token scripts.                    |
//! | `TOKEN_ACCOUNT`        | Token account credited by the `mint_tokens` script.         |

use std::{
    collections::HashMap,
    path::Path,
    str::FromStr,
};

use solana_address::Address;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use strum_macros::{
    Display,
    EnumString,
};

use crate::error::ClientError;

pub const RPC_URL_VAR: &str = "RPC_URL";
pub const CLUSTER_VAR: &str = "SOLANA_CLUSTER";
pub const COMMITMENT_VAR: &str = "COMMITMENT";
pub const PROGRAM_ID_VAR: &str = "FAVORITES_PROGRAM_ID";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const RECIPIENT_VAR: &str = "RECIPIENT_WALLET";
pub const MINT_VAR: &str = "MINT";
pub const TOKEN_ACCOUNT_VAR: &str = "TOKEN_ACCOUNT";

/// Loads the nearest `.env` file into the process environment, if there is one. Variables that
/// are already set are left untouched.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Localnet,
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    pub fn url(&self) -> &'static str {
        match self {
            Cluster::Localnet => "http://localhost:8899",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub program_id: Address,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: Cluster::default().url().into(),
            commitment: CommitmentConfig::finalized(),
            program_id: favorites_interface::program::ID,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        load_dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the config from the `.env` formatted file at `path` only, ignoring the process
    /// environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let file_error =
            |e: dotenvy::Error| ClientError::Config(format!("couldn't read {}: {e}", path.display()));

        let vars = dotenvy::from_path_iter(path)
            .map_err(file_error)?
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(file_error)?;

        Self::from_lookup(|var| vars.get(var).cloned())
    }

    /// Builds the config from an arbitrary variable lookup. Unset variables fall back to
    /// [`ClientConfig::default`]; set but invalid ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let rpc_url = match (lookup(RPC_URL_VAR), lookup(CLUSTER_VAR)) {
            (Some(url), _) => url,
            (None, Some(cluster)) => Cluster::from_str(cluster.trim())
                .map_err(|_| ClientError::Config(format!("unknown {CLUSTER_VAR} {cluster:?}")))?
                .url()
                .into(),
            (None, None) => defaults.rpc_url,
        };

        let commitment = match lookup(COMMITMENT_VAR) {
            Some(level) => parse_commitment(&level)?,
            None => defaults.commitment,
        };

        let program_id = match lookup(PROGRAM_ID_VAR) {
            Some(id) => Address::from_str(id.trim()).map_err(|e| {
                ClientError::Config(format!("invalid {PROGRAM_ID_VAR} {id:?}: {e}"))
            })?,
            None => defaults.program_id,
        };

        Ok(Self {
            rpc_url,
            commitment,
            program_id,
        })
    }

    pub fn rpc_client(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), self.commitment)
    }
}

fn parse_commitment(level: &str) -> Result<CommitmentConfig, ClientError> {
    match level.trim() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(ClientError::Config(format!(
            "unknown {COMMITMENT_VAR} {other:?}"
        ))),
    }
}
