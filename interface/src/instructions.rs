//! Instruction encoding for the `favorites` program.
//!
//! Instruction data is an 8 byte discriminator (`sha256("global:<instruction_name>")[..8]`)
//! followed by the borsh encoding of the instruction's arguments.

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use solana_address::Address;
use solana_instruction::{
    AccountMeta,
    Instruction,
};
use thiserror::Error;

use crate::{
    error::AnchorError,
    SYSTEM_PROGRAM_ID,
};

pub const DISCRIMINATOR_LEN: usize = 8;

/// Arguments for `set_favorites`, which initializes the caller's favorites account.
#[derive(Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct SetFavoritesArgs {
    pub number: u64,
    pub color: String,
}

/// Arguments for `update_favorites`. A `None` field is left unchanged on-chain.
#[derive(Clone, Debug, Default, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct UpdateFavoritesArgs {
    pub number: Option<u64>,
    pub color: Option<String>,
}

impl UpdateFavoritesArgs {
    /// Whether the update leaves both fields unchanged.
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.color.is_none()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, strum_macros::Display)]
pub enum FavoritesInstruction {
    SetFavorites(SetFavoritesArgs),
    UpdateFavorites(UpdateFavoritesArgs),
}

impl FavoritesInstruction {
    /// `sha256("global:set_favorites")[..8]`
    pub const SET_FAVORITES: [u8; DISCRIMINATOR_LEN] = [211, 137, 87, 135, 161, 224, 187, 120];
    /// `sha256("global:update_favorites")[..8]`
    pub const UPDATE_FAVORITES: [u8; DISCRIMINATOR_LEN] = [138, 31, 158, 61, 111, 33, 209, 79];

    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        match self {
            Self::SetFavorites(_) => Self::SET_FAVORITES,
            Self::UpdateFavorites(_) => Self::UPDATE_FAVORITES,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut data = self.discriminator().to_vec();
        let res = match self {
            Self::SetFavorites(args) => args.serialize(&mut data),
            Self::UpdateFavorites(args) => args.serialize(&mut data),
        };
        res.expect("Serializing into a Vec can't fail");
        data
    }

    pub fn unpack(data: &[u8]) -> Result<Self, InstructionDecodeError> {
        let (discriminator, mut args) = data
            .split_first_chunk::<DISCRIMINATOR_LEN>()
            .ok_or(InstructionDecodeError::MissingDiscriminator)?;

        let decoded = match *discriminator {
            Self::SET_FAVORITES => SetFavoritesArgs::deserialize(&mut args).map(Self::SetFavorites),
            Self::UPDATE_FAVORITES => {
                UpdateFavoritesArgs::deserialize(&mut args).map(Self::UpdateFavorites)
            }
            unknown => return Err(InstructionDecodeError::UnknownDiscriminator(unknown)),
        };

        decoded.map_err(|e| InstructionDecodeError::InvalidArgs(e.to_string()))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InstructionDecodeError {
    #[error("instruction data is missing the 8 byte discriminator")]
    MissingDiscriminator,

    #[error("unknown instruction discriminator {0:?}")]
    UnknownDiscriminator([u8; DISCRIMINATOR_LEN]),

    #[error("invalid instruction arguments: {0}")]
    InvalidArgs(String),
}

impl From<&InstructionDecodeError> for AnchorError {
    fn from(value: &InstructionDecodeError) -> Self {
        match value {
            InstructionDecodeError::MissingDiscriminator => AnchorError::InstructionMissing,
            InstructionDecodeError::UnknownDiscriminator(_) => {
                AnchorError::InstructionFallbackNotFound
            }
            InstructionDecodeError::InvalidArgs(_) => AnchorError::InstructionDidNotDeserialize,
        }
    }
}

/// The accounts both favorites instructions take, in order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FavoritesAccounts {
    /// The user paying for and owning the favorites account. Must sign.
    pub user: Address,
    /// The user's favorites PDA.
    pub favorites: Address,
}

impl FavoritesAccounts {
    pub const NUM_ACCOUNTS: usize = 3;

    pub fn account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.user, true),
            AccountMeta::new(self.favorites, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ]
    }
}

pub fn set_favorites(
    program_id: &Address,
    accounts: FavoritesAccounts,
    args: SetFavoritesArgs,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &FavoritesInstruction::SetFavorites(args).pack(),
        accounts.account_metas(),
    )
}

pub fn update_favorites(
    program_id: &Address,
    accounts: FavoritesAccounts,
    args: UpdateFavoritesArgs,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &FavoritesInstruction::UpdateFavorites(args).pack(),
        accounts.account_metas(),
    )
}
