use clap::Parser;
use client::{
    keypair::grind_keypair,
    logs::log_header,
    print_kv,
    LogColor,
};
use colored::Colorize;
use solana_sdk::signer::Signer;

/// Generates keypairs until one's address starts with the given prefix, ignoring case.
#[derive(Parser)]
struct Args {
    /// The base58 prefix to search for.
    #[arg(default_value = "anza")]
    prefix: String,

    #[arg(short, long, default_value_t = 10)]
    threads: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    log_header(&format!("Grinding for {:?} on {} threads", args.prefix, args.threads));
    let ground = grind_keypair(&args.prefix, args.threads)?;

    print_kv!("Public key", ground.keypair.pubkey(), LogColor::Info);
    print_kv!("Secret key", format!("{:?}", ground.keypair.to_bytes()), LogColor::Warning);
    print_kv!("Attempts", ground.attempts);
    print_kv!("Elapsed", format!("{:?}", ground.elapsed));

    Ok(())
}
