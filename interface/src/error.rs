//! Lookup tables for the custom error codes a `favorites` transaction can fail with, and
//! conversions to human-readable messages.
//!
//! A custom code only means something relative to the program that raised it, so lookups always
//! take the failing program's address into account. See [`KnownError::lookup`].

use solana_address::Address;

use crate::SYSTEM_PROGRAM_ID;

/// Errors defined by the `favorites` program itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::FromRepr)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[repr(u32)]
pub enum FavoritesError {
    CustomError = 6000,
    NothingToUpdate = 6001,
}

/// The subset of framework-level errors the `favorites` program's account validation and
/// instruction dispatch can produce.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::FromRepr)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[repr(u32)]
pub enum AnchorError {
    InstructionMissing = 100,
    InstructionFallbackNotFound = 101,
    InstructionDidNotDeserialize = 102,
    InstructionDidNotSerialize = 103,
    ConstraintMut = 2000,
    ConstraintSeeds = 2006,
    AccountDiscriminatorNotFound = 3001,
    AccountDiscriminatorMismatch = 3002,
    AccountDidNotDeserialize = 3003,
    AccountDidNotSerialize = 3004,
    AccountNotEnoughKeys = 3005,
    AccountOwnedByWrongProgram = 3007,
    InvalidProgramId = 3008,
    AccountNotSigner = 3010,
    AccountNotInitialized = 3012,
}

/// System program errors, raised either directly or through the CPI that allocates the
/// favorites account.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::FromRepr)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[repr(u32)]
pub enum SystemError {
    AccountAlreadyInUse,
    ResultWithNegativeLamports,
    InvalidProgramId,
    InvalidAccountDataLength,
    MaxSeedLengthExceeded,
    AddressWithSeedMismatch,
    NonceNoRecentBlockhashes,
    NonceBlockhashNotExpired,
    NonceUnexpectedBlockhashValue,
}

/// The first custom code reserved for program-defined errors. Anything below it (and at or above
/// [`FRAMEWORK_ERROR_OFFSET`]) is a framework error.
pub const PROGRAM_ERROR_OFFSET: u32 = 6000;
pub const FRAMEWORK_ERROR_OFFSET: u32 = 100;

impl From<FavoritesError> for &'static str {
    fn from(value: FavoritesError) -> Self {
        match value {
            FavoritesError::CustomError => "Custom error message",
            FavoritesError::NothingToUpdate => "Nothing to update",
        }
    }
}

#[rustfmt::skip]
impl From<AnchorError> for &'static str {
    fn from(value: AnchorError) -> Self {
        match value {
            AnchorError::InstructionMissing           => "Instruction discriminator not provided",
            AnchorError::InstructionFallbackNotFound  => "Fallback functions are not supported",
            AnchorError::InstructionDidNotDeserialize => "The program could not deserialize the given instruction",
            AnchorError::InstructionDidNotSerialize   => "The program could not serialize the given instruction",
            AnchorError::ConstraintMut                => "A mut constraint was violated",
            AnchorError::ConstraintSeeds              => "A seeds constraint was violated",
            AnchorError::AccountDiscriminatorNotFound => "No discriminator was found on the account",
            AnchorError::AccountDiscriminatorMismatch => "Account discriminator did not match what was expected",
            AnchorError::AccountDidNotDeserialize     => "Failed to deserialize the account",
            AnchorError::AccountDidNotSerialize       => "Failed to serialize the account",
            AnchorError::AccountNotEnoughKeys         => "Not enough account keys given to the instruction",
            AnchorError::AccountOwnedByWrongProgram   => "The given account is owned by a different program than expected",
            AnchorError::InvalidProgramId             => "Program ID was not as expected",
            AnchorError::AccountNotSigner             => "The given account did not sign",
            AnchorError::AccountNotInitialized        => "The program expected this account to be already initialized",
        }
    }
}

#[rustfmt::skip]
impl From<SystemError> for &'static str {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::AccountAlreadyInUse           => "An account with the same address is already in use",
            SystemError::ResultWithNegativeLamports    => "Account does not have enough SOL to perform the operation",
            SystemError::InvalidProgramId              => "Cannot assign account to this program id",
            SystemError::InvalidAccountDataLength      => "Cannot allocate account data of this length",
            SystemError::MaxSeedLengthExceeded         => "Length of requested seed is too long",
            SystemError::AddressWithSeedMismatch       => "Provided address does not match addressed derived from seed",
            SystemError::NonceNoRecentBlockhashes      => "Advancing stored nonce requires a populated RecentBlockhashes sysvar",
            SystemError::NonceBlockhashNotExpired      => "Stored nonce is still in recent_blockhashes",
            SystemError::NonceUnexpectedBlockhashValue => "Specified nonce does not match stored nonce",
        }
    }
}

macro_rules! impl_error_display {
    ($($error:ty),+ $(,)?) => {
        $(
            impl core::fmt::Display for $error {
                fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    write!(f, "{:?}", self)
                }
            }

            impl std::error::Error for $error {}
        )+
    };
}

impl_error_display!(FavoritesError, AnchorError, SystemError);

/// A custom error code resolved against the table of the program that raised it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KnownError {
    Program(FavoritesError),
    Framework(AnchorError),
    System(SystemError),
}

impl KnownError {
    /// Resolves `code`, raised by `failing_program`, to a known error.
    ///
    /// Codes raised by the system program resolve against [`SystemError`]. Codes raised by
    /// `favorites_program` resolve against [`FavoritesError`] from [`PROGRAM_ERROR_OFFSET`] up,
    /// [`AnchorError`] from [`FRAMEWORK_ERROR_OFFSET`] up, and [`SystemError`] below that, since
    /// the only low codes it surfaces come from its account-creation CPI. Codes raised by any
    /// other program are unknown.
    pub fn lookup(
        favorites_program: &Address,
        failing_program: &Address,
        code: u32,
    ) -> Option<Self> {
        if failing_program == &SYSTEM_PROGRAM_ID {
            return SystemError::from_repr(code).map(Self::System);
        }
        if failing_program != favorites_program {
            return None;
        }
        if code >= PROGRAM_ERROR_OFFSET {
            FavoritesError::from_repr(code).map(Self::Program)
        } else if code >= FRAMEWORK_ERROR_OFFSET {
            AnchorError::from_repr(code).map(Self::Framework)
        } else {
            SystemError::from_repr(code).map(Self::System)
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Program(e) => *e as u32,
            Self::Framework(e) => *e as u32,
            Self::System(e) => *e as u32,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Program(e) => (*e).into(),
            Self::Framework(e) => (*e).into(),
            Self::System(e) => (*e).into(),
        }
    }
}

impl core::fmt::Display for KnownError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Program(e) => e.to_string(),
            Self::Framework(e) => e.to_string(),
            Self::System(e) => e.to_string(),
        };
        write!(f, "{name}: {}", self.message())
    }
}

impl From<FavoritesError> for KnownError {
    fn from(value: FavoritesError) -> Self {
        Self::Program(value)
    }
}

impl From<AnchorError> for KnownError {
    fn from(value: AnchorError) -> Self {
        Self::Framework(value)
    }
}

impl From<SystemError> for KnownError {
    fn from(value: SystemError) -> Self {
        Self::System(value)
    }
}

/// Renders `code` as a human-readable message, falling back to naming the raw code when it isn't
/// in any table.
pub fn describe_custom_error(
    favorites_program: &Address,
    failing_program: &Address,
    code: u32,
) -> String {
    match KnownError::lookup(favorites_program, failing_program, code) {
        Some(known) => known.to_string(),
        None => format!("Unknown custom error code {code} from program {failing_program}"),
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::program;

    #[test]
    fn program_errors_resolve_from_their_codes() {
        for error in FavoritesError::iter() {
            let known = KnownError::lookup(&program::ID, &program::ID, error as u32);
            assert_eq!(known, Some(KnownError::Program(error)));
        }
        assert_eq!(FavoritesError::NothingToUpdate as u32, 6001);
    }

    #[test]
    fn framework_errors_resolve_from_their_codes() {
        for error in AnchorError::iter() {
            let known = KnownError::lookup(&program::ID, &program::ID, error as u32);
            assert_eq!(known, Some(KnownError::Framework(error)));
        }
    }

    #[test]
    fn low_codes_from_the_program_are_system_cpi_errors() {
        let known = KnownError::lookup(&program::ID, &program::ID, 0);
        assert_eq!(known, Some(KnownError::System(SystemError::AccountAlreadyInUse)));
    }

    #[test]
    fn system_program_codes_use_the_system_table() {
        for error in SystemError::iter() {
            let known = KnownError::lookup(&program::ID, &SYSTEM_PROGRAM_ID, error as u32);
            assert_eq!(known, Some(KnownError::System(error)));
        }
        // 6001 means nothing to the system program.
        assert_eq!(KnownError::lookup(&program::ID, &SYSTEM_PROGRAM_ID, 6001), None);
    }

    #[test]
    fn codes_from_unrelated_programs_are_unknown() {
        let other = Address::new_unique();
        assert_eq!(KnownError::lookup(&program::ID, &other, 6001), None);
        let message = describe_custom_error(&program::ID, &other, 6001);
        assert!(message.starts_with("Unknown custom error code 6001"));
    }

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            describe_custom_error(&program::ID, &program::ID, 6001),
            "NothingToUpdate: Nothing to update"
        );
        assert_eq!(
            describe_custom_error(&program::ID, &program::ID, 3012),
            "AccountNotInitialized: The program expected this account to be already initialized"
        );
        assert_eq!(
            describe_custom_error(&program::ID, &program::ID, 3008),
            "InvalidProgramId: Program ID was not as expected"
        );
        assert_eq!(
            describe_custom_error(&program::ID, &program::ID, 4242),
            format!("Unknown custom error code 4242 from program {}", program::ID)
        );
    }

    #[test]
    fn code_round_trips_through_known_error() {
        let known: KnownError = FavoritesError::NothingToUpdate.into();
        assert_eq!(known.code(), 6001);
        let known: KnownError = SystemError::ResultWithNegativeLamports.into();
        assert_eq!(known.code(), 1);
    }
}
