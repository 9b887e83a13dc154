//! Creates a 2 of 2 multisig mint authority from the `SECRET_KEY` wallet and a fresh second
//! signer, a mint governed by it, and the wallet's associated token account, then mints into that
//! account with both signatures.

use client::{
    config::SECRET_KEY_VAR,
    context::token::{
        MultisigAuthority,
        TokenContext,
    },
    keypair::keypair_from_env,
    print_kv,
    transactions::ChainClient,
    LogColor,
};
use colored::Colorize;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    signature::{
        Keypair,
        Signer,
    },
};

const DECIMALS: u8 = 9;
const AMOUNT: u64 = LAMPORTS_PER_SOL;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let payer = keypair_from_env(SECRET_KEY_VAR)?;
    let second_signer = Keypair::new();
    let rpc = ChainClient::from_env()?;

    let multisig = MultisigAuthority::create(
        &rpc,
        &payer,
        &Keypair::new(),
        vec![payer.pubkey(), second_signer.pubkey()],
        2,
    )
    .await?;
    print_kv!("Multisig", multisig.address, LogColor::Info);
    print_kv!("Second signer", second_signer.pubkey(), LogColor::Info);

    let token =
        TokenContext::create_new_with_multisig(&rpc, &payer, &multisig, &Keypair::new(), DECIMALS)
            .await?;
    print_kv!("Mint", token.mint_address, LogColor::Highlight);

    let ata = token.create_ata_for(&rpc, &payer, &payer.pubkey()).await?;
    print_kv!("Associated token account", ata);

    token
        .mint_to_with_multisig(&rpc, &payer, &multisig, &[&payer, &second_signer], &ata, AMOUNT)
        .await?;
    print_kv!("Balance", token.token_balance(&rpc, &ata).await?);

    Ok(())
}
