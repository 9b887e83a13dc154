//! Creates a token account for the `MINT` token owned by the `SECRET_KEY` wallet: a fresh token
//! account by default, or the wallet's associated token account with `--associated`.

use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use client::{
    config::{
        MINT_VAR,
        SECRET_KEY_VAR,
    },
    context::token::TokenContext,
    keypair::keypair_from_env,
    print_kv,
    transactions::ChainClient,
    LogColor,
};
use colored::Colorize;
use solana_address::Address;
use solana_sdk::signature::{
    Keypair,
    Signer,
};

#[derive(Parser)]
struct Args {
    /// Create the wallet's associated token account instead of a fresh one.
    #[arg(long)]
    associated: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let payer = keypair_from_env(SECRET_KEY_VAR)?;
    let mint = std::env::var(MINT_VAR).with_context(|| format!("{MINT_VAR} must be set"))?;
    let mint = Address::from_str(mint.trim()).context("Invalid mint address")?;

    let rpc = ChainClient::from_env()?;
    let token = TokenContext::new_from_existing(&rpc, mint, None).await?;

    let token_account = if args.associated {
        token.create_ata_for(&rpc, &payer, &payer.pubkey()).await?
    } else {
        token
            .create_token_account(&rpc, &payer, &payer.pubkey(), &Keypair::new())
            .await?
    };

    print_kv!("Token account", token_account, LogColor::Highlight);
    print_kv!("Associated token account", token.get_ata_for(&payer.pubkey()));

    Ok(())
}
