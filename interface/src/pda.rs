//! Program derived address helpers.

use solana_address::Address;
use thiserror::Error;

use crate::seeds;

/// Returned when no bump in `255..=0` produces an off-curve address for the given seeds.
///
/// This also covers seeds the runtime would never accept (more than 16 seeds, or a seed longer
/// than 32 bytes), since every bump fails for those.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("no valid bump seed for {num_seeds} seed(s) under program {program_id}")]
pub struct DerivationExhausted {
    pub num_seeds: usize,
    pub program_id: Address,
}

/// Finds the canonical program address and bump for `seeds` under `program_id`.
pub fn try_find_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), DerivationExhausted> {
    Address::try_find_program_address(seeds, program_id).ok_or(DerivationExhausted {
        num_seeds: seeds.len(),
        program_id: *program_id,
    })
}

/// Finds the favorites account PDA for `owner`.
pub fn find_favorites_address(
    owner: &Address,
    program_id: &Address,
) -> Result<(Address, u8), DerivationExhausted> {
    try_find_address(&[seeds::FAVORITES, owner.as_ref()], program_id)
}
