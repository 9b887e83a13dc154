//! Loading keypairs from the environment and grinding vanity addresses.

use std::{
    sync::atomic::{
        AtomicBool,
        AtomicU64,
        Ordering,
    },
    time::{
        Duration,
        Instant,
    },
};

use itertools::Itertools;
use solana_sdk::{
    bs58,
    signature::Keypair,
    signer::Signer,
};
use thiserror::Error;

const SEED_LEN: usize = 32;
const KEYPAIR_LEN: usize = 64;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Debug, Error)]
pub enum KeypairError {
    #[error("environment variable {0} must be set")]
    MissingVar(String),

    #[error("invalid JSON keypair: {0}")]
    InvalidJson(String),

    #[error("invalid base58 keypair: {0}")]
    InvalidBase58(String),

    #[error("expected a {SEED_LEN} byte seed or a {KEYPAIR_LEN} byte keypair, got {0} bytes")]
    InvalidLength(usize),

    #[error("invalid keypair bytes: {0}")]
    InvalidBytes(String),

    #[error("vanity prefix can't be empty")]
    EmptyPrefix,

    #[error("vanity prefix {prefix:?} can never match: {invalid:?} is not a base58 character")]
    InvalidPrefix { prefix: String, invalid: char },

    #[error("every grinder thread exited without a match")]
    GrindFailed,
}

/// Builds a keypair from either a 64 byte keypair or a 32 byte ed25519 seed.
pub fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair, KeypairError> {
    match bytes.len() {
        SEED_LEN => {
            let mut seed = [0u8; SEED_LEN];
            seed.copy_from_slice(bytes);
            Ok(Keypair::new_from_array(seed))
        }
        KEYPAIR_LEN => {
            Keypair::try_from(bytes).map_err(|e| KeypairError::InvalidBytes(e.to_string()))
        }
        len => Err(KeypairError::InvalidLength(len)),
    }
}

/// Parses a keypair from a JSON byte array (the `solana-keygen` file format) or a base58 string.
pub fn keypair_from_str(encoded: &str) -> Result<Keypair, KeypairError> {
    let encoded = encoded.trim();
    let bytes: Vec<u8> = if encoded.starts_with('[') {
        serde_json::from_str(encoded).map_err(|e| KeypairError::InvalidJson(e.to_string()))?
    } else {
        bs58::decode(encoded)
            .into_vec()
            .map_err(|e| KeypairError::InvalidBase58(e.to_string()))?
    };

    keypair_from_bytes(&bytes)
}

/// Loads a keypair from the environment variable `var`, which may also come from a `.env` file.
/// See [`keypair_from_str`] for the accepted formats.
pub fn keypair_from_env(var: &str) -> Result<Keypair, KeypairError> {
    crate::config::load_dotenv();
    let encoded = std::env::var(var).map_err(|_| KeypairError::MissingVar(var.to_string()))?;
    keypair_from_str(&encoded)
}

/// A keypair found by [`grind_keypair`].
pub struct GroundKeypair {
    pub keypair: Keypair,
    /// Keypairs generated across all threads, including the match.
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Generates keypairs on `num_threads` threads until one's base58 address starts with `prefix`,
/// compared case-insensitively.
///
/// Expected work grows by roughly 29x per prefix character, so anything past four or five
/// characters takes a long time.
pub fn grind_keypair(prefix: &str, num_threads: usize) -> Result<GroundKeypair, KeypairError> {
    if prefix.is_empty() {
        return Err(KeypairError::EmptyPrefix);
    }

    if let Some(invalid) = prefix.chars().find(|c| {
        !BASE58_ALPHABET
            .chars()
            .any(|a| a.eq_ignore_ascii_case(c))
    }) {
        return Err(KeypairError::InvalidPrefix {
            prefix: prefix.to_string(),
            invalid,
        });
    }

    let prefix = prefix.to_lowercase();
    let found = AtomicBool::new(false);
    let attempts = AtomicU64::new(0);
    let start = Instant::now();

    let keypair = std::thread::scope(|scope| {
        let (prefix, found, attempts) = (&prefix, &found, &attempts);
        let handles = (0..num_threads.max(1))
            .map(|_| {
                scope.spawn(move || {
                    while !found.load(Ordering::Relaxed) {
                        attempts.fetch_add(1, Ordering::Relaxed);
                        let keypair = Keypair::new();
                        if keypair
                            .pubkey()
                            .to_string()
                            .to_lowercase()
                            .starts_with(prefix.as_str())
                        {
                            found.store(true, Ordering::Relaxed);
                            return Some(keypair);
                        }
                    }
                    None
                })
            })
            .collect_vec();

        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok().flatten())
            .next()
    });

    let keypair = keypair.ok_or(KeypairError::GrindFailed)?;

    Ok(GroundKeypair {
        keypair,
        attempts: attempts.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    })
}
