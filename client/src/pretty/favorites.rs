use colored::Colorize;
use favorites_interface::state::Favorites;
use solana_address::Address;

use crate::{
    fmt_kv,
    LogColor,
};

/// Renders a favorites account read back from the cluster.
pub struct PrettyFavorites<'a> {
    pub address: &'a Address,
    pub favorites: &'a Favorites,
}

impl core::fmt::Display for PrettyFavorites<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{}", fmt_kv!("Favorites PDA", self.address, LogColor::Info))?;
        writeln!(f, "  {}", fmt_kv!("Number", self.favorites.number))?;
        writeln!(f, "  {}", fmt_kv!("Color", self.favorites.color))
    }
}
