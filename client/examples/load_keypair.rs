use client::{
    config::SECRET_KEY_VAR,
    keypair::keypair_from_env,
    print_kv,
    LogColor,
};
use colored::Colorize;
use solana_sdk::signer::Signer;

fn main() -> anyhow::Result<()> {
    let keypair = keypair_from_env(SECRET_KEY_VAR)?;

    print_kv!("Public key", keypair.pubkey(), LogColor::Info);
    print_kv!("Secret key", keypair.to_base58_string(), LogColor::Warning);

    Ok(())
}
