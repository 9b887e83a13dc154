use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use client::{
    config::{
        RECIPIENT_VAR,
        SECRET_KEY_VAR,
    },
    keypair::keypair_from_env,
    logs::fmt_sol,
    print_kv,
    transactions::ChainClient,
    LogColor,
};
use colored::Colorize;
use solana_address::Address;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    signer::Signer,
};

/// Sends SOL from the `SECRET_KEY` wallet to `RECIPIENT_WALLET`.
#[derive(Parser)]
struct Args {
    /// Amount to send, in lamports.
    #[arg(short, long, default_value_t = LAMPORTS_PER_SOL / 20)]
    lamports: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let sender = keypair_from_env(SECRET_KEY_VAR)?;
    let recipient = std::env::var(RECIPIENT_VAR)
        .with_context(|| format!("{RECIPIENT_VAR} must be set"))?;
    let recipient = Address::from_str(recipient.trim()).context("Invalid recipient address")?;

    let rpc = ChainClient::from_env()?;

    print_kv!("Sender balance", fmt_sol(rpc.balance(&sender.pubkey()).await?));
    rpc.transfer(&sender, &recipient, args.lamports).await?;
    print_kv!("Sender balance", fmt_sol(rpc.balance(&sender.pubkey()).await?));
    print_kv!("Recipient balance", fmt_sol(rpc.balance(&recipient).await?));

    print_kv!("Transferred", fmt_sol(args.lamports), LogColor::Header);

    Ok(())
}
