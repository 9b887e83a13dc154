//! Mints `MINT` tokens into `TOKEN_ACCOUNT`, signed by the `SECRET_KEY` wallet as mint authority.

use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use client::{
    config::{
        MINT_VAR,
        SECRET_KEY_VAR,
        TOKEN_ACCOUNT_VAR,
    },
    context::token::TokenContext,
    keypair::keypair_from_env,
    print_kv,
    transactions::ChainClient,
    LogColor,
};
use colored::Colorize;
use solana_address::Address;

#[derive(Parser)]
struct Args {
    /// Amount to mint, in base units.
    #[arg(short, long, default_value_t = 10_000_000_000)]
    amount: u64,
}

fn address_from_env(var: &str) -> anyhow::Result<Address> {
    let value = std::env::var(var).with_context(|| format!("{var} must be set"))?;
    Address::from_str(value.trim()).with_context(|| format!("Invalid {var} address"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mint_authority = keypair_from_env(SECRET_KEY_VAR)?;
    let mint = address_from_env(MINT_VAR)?;
    let token_account = address_from_env(TOKEN_ACCOUNT_VAR)?;

    let rpc = ChainClient::from_env()?;
    let token = TokenContext::new_from_existing(&rpc, mint, Some(mint_authority)).await?;

    token
        .mint_to(&rpc, token.mint_authority()?, &token_account, args.amount)
        .await?;

    print_kv!("Minted", args.amount, LogColor::Highlight);
    print_kv!("Balance", token.token_balance(&rpc, &token_account).await?);

    Ok(())
}
