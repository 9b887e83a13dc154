use client::{
    print_kv,
    LogColor,
};
use colored::Colorize;
use solana_sdk::signature::{
    Keypair,
    Signer,
};

fn main() {
    let keypair = Keypair::new();

    print_kv!("Public key", keypair.pubkey(), LogColor::Info);
    // The JSON byte array format `keypair_from_str` and `SECRET_KEY` accept.
    print_kv!("Secret key", format!("{:?}", keypair.to_bytes()), LogColor::Warning);
}
