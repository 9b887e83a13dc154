//! Client-side utilities for interacting with the `favorites` program.
//!
//! Includes the funding guard, instruction contexts, transaction submission with decoded errors,
//! state read-back, SPL token helpers, and an in-process cluster for network-free tests.

pub mod config;
pub mod context;
pub mod e2e_helpers;
pub mod error;
pub mod keypair;
pub mod local_cluster;
pub mod logs;
pub mod pretty;
pub mod rpc;
pub mod single_signer_instruction;
pub mod token_instructions;
pub mod transactions;

pub use logs::LogColor;
