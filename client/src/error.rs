//! Error taxonomy surfaced by the client.
//!
//! Every failure is returned to the caller as soon as it happens; nothing here retries.

use favorites_interface::{
    error::{
        describe_custom_error,
        KnownError,
    },
    pda::DerivationExhausted,
};
use solana_address::Address;
use solana_instruction::Instruction;
use solana_instruction_error::InstructionError;
use solana_transaction_error::TransactionError;
use thiserror::Error;

use crate::keypair::KeypairError;

/// Failures reported by the RPC layer, split by whether the network rejected a specific
/// transaction or the request itself failed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RpcError {
    #[error("transaction failed: {0}")]
    Transaction(TransactionError),

    #[error("rpc request failed: {0}")]
    Transport(String),
}

impl From<solana_client::client_error::ClientError> for RpcError {
    fn from(error: solana_client::client_error::ClientError) -> Self {
        match error.get_transaction_error() {
            Some(transaction_error) => RpcError::Transaction(transaction_error),
            None => RpcError::Transport(error.to_string()),
        }
    }
}

/// A rejected transaction, decoded against the known error tables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmissionFailure {
    /// Index of the failing instruction within the submitted transaction.
    pub instruction_index: Option<u8>,
    /// The program that raised the error, when the failure is tied to an instruction.
    pub program_id: Option<Address>,
    /// The raw custom error code, if there was one.
    pub code: Option<u32>,
    /// The table entry `code` resolved to.
    pub known: Option<KnownError>,
    /// Human-readable reason.
    pub message: String,
}

impl SubmissionFailure {
    /// Decodes a transaction error returned for `instructions`.
    ///
    /// `instructions` must be the full, ordered instruction list that was submitted so that the
    /// failing instruction index resolves to the right program.
    pub fn from_transaction_error(
        error: &TransactionError,
        instructions: &[Instruction],
        favorites_program: &Address,
    ) -> Self {
        let TransactionError::InstructionError(index, instruction_error) = error else {
            return Self {
                instruction_index: None,
                program_id: None,
                code: None,
                known: None,
                message: error.to_string(),
            };
        };

        let program_id = instructions.get(*index as usize).map(|ix| ix.program_id);

        match (instruction_error, program_id) {
            (InstructionError::Custom(code), Some(program_id)) => Self {
                instruction_index: Some(*index),
                program_id: Some(program_id),
                code: Some(*code),
                known: KnownError::lookup(favorites_program, &program_id, *code),
                message: describe_custom_error(favorites_program, &program_id, *code),
            },
            (InstructionError::Custom(code), None) => Self {
                instruction_index: Some(*index),
                program_id: None,
                code: Some(*code),
                known: None,
                message: format!("Unknown custom error code {code}"),
            },
            (other, program_id) => Self {
                instruction_index: Some(*index),
                program_id,
                code: None,
                known: None,
                message: other.to_string(),
            },
        }
    }

    /// A failure the client detected before submitting anything, expressed with the same error
    /// the program would have returned.
    pub fn rejected_locally(program_id: Address, known: impl Into<KnownError>) -> Self {
        let known = known.into();
        Self {
            instruction_index: None,
            program_id: Some(program_id),
            code: Some(known.code()),
            known: Some(known),
            message: known.to_string(),
        }
    }
}

impl core::fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)?;
        match (self.instruction_index, self.program_id) {
            (Some(index), Some(program)) => write!(f, " (instruction {index}, program {program})"),
            (Some(index), None) => write!(f, " (instruction {index})"),
            (None, Some(program)) => write!(f, " (program {program})"),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to fund {address}: {reason}")]
    Funding { address: Address, reason: String },

    #[error(transparent)]
    DerivationExhausted(#[from] DerivationExhausted),

    #[error("transaction rejected: {0}")]
    Submission(SubmissionFailure),

    #[error("account {0} not found")]
    AccountNotFound(Address),

    #[error("account {address} is invalid: {reason}")]
    InvalidAccount { address: Address, reason: String },

    #[error("token error: {0}")]
    Token(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error(transparent)]
    Keypair(#[from] KeypairError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// The decoded submission failure, if this is one.
    pub fn submission(&self) -> Option<&SubmissionFailure> {
        match self {
            ClientError::Submission(failure) => Some(failure),
            _ => None,
        }
    }

    /// The known error a rejected submission decoded to, if any.
    pub fn known_error(&self) -> Option<KnownError> {
        self.submission().and_then(|failure| failure.known)
    }
}
