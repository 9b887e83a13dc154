//! Client-side interface for the `favorites` program: program id, PDA seeds and derivation,
//! instruction encoding, account state decoding, and the error codes the program can return.

pub mod error;
pub mod instructions;
pub mod pda;
pub mod seeds;
pub mod state;

pub mod program {
    use solana_address::Address;

    /// The address the `favorites` program is deployed at on devnet and localnet.
    pub const ID: Address = solana_sdk::pubkey!("CnEp3Aj6zUyW4o9oiU4Yv6CLzuxz4eRBNGFBFRmBtFks");
}

pub use solana_system_interface::program::ID as SYSTEM_PROGRAM_ID;
