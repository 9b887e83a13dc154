//! Creates a new SPL token mint with the `SECRET_KEY` wallet as payer and mint authority.

use clap::Parser;
use client::{
    config::SECRET_KEY_VAR,
    context::token::TokenContext,
    keypair::keypair_from_env,
    print_kv,
    transactions::ChainClient,
    LogColor,
};
use colored::Colorize;
use solana_sdk::signature::Keypair;

#[derive(Parser)]
struct Args {
    #[arg(short, long, default_value_t = 9)]
    decimals: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let payer = keypair_from_env(SECRET_KEY_VAR)?;
    let rpc = ChainClient::from_env()?;

    let token = TokenContext::create_new_from_mint(&rpc, payer, &Keypair::new(), args.decimals)
        .await?;

    print_kv!("Mint", token.mint_address, LogColor::Highlight);
    print_kv!("Decimals", token.mint_decimals);

    Ok(())
}
