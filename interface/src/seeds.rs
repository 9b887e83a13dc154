//! PDA seed constants shared by the program and its clients.

/// The static seed prefix of a user's favorites account. The full seed list is
/// `[FAVORITES, user_address]`.
pub const FAVORITES: &[u8] = b"favorites";
