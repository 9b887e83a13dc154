use client::{
    config::SECRET_KEY_VAR,
    keypair::keypair_from_env,
    logs::fmt_sol,
    print_kv,
    transactions::ChainClient,
    LogColor,
};
use colored::Colorize;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    signer::Signer,
};

/// Requested when the wallet holds less than [`MINIMUM_BALANCE`].
const AIRDROP_AMOUNT: u64 = LAMPORTS_PER_SOL;
const MINIMUM_BALANCE: u64 = 7 * LAMPORTS_PER_SOL / 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let keypair = keypair_from_env(SECRET_KEY_VAR)?;
    let rpc = ChainClient::from_env()?;

    print_kv!("Pubkey", keypair.pubkey(), LogColor::Info);
    print_kv!("Balance", fmt_sol(rpc.balance(&keypair.pubkey()).await?));

    let balance = rpc
        .airdrop_if_required(&keypair.pubkey(), AIRDROP_AMOUNT, MINIMUM_BALANCE)
        .await?;
    print_kv!("Balance after top-up", fmt_sol(balance), LogColor::Highlight);

    Ok(())
}
