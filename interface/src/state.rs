//! The favorites account layout and conversions to and from raw account data.
//!
//! Layout: an 8 byte account discriminator followed by the borsh encoding of [`Favorites`]. The
//! account is allocated at [`Favorites::LEN`] bytes up front, so any bytes after the encoded
//! struct are zero padding.

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use static_assertions::const_assert_eq;
use thiserror::Error;

use crate::error::AnchorError;

pub const DISCRIMINATOR_LEN: usize = 8;

/// A user's favorite number and color, stored at their favorites PDA.
#[derive(Clone, Debug, Default, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Favorites {
    pub number: u64,
    pub color: String,
}

impl Favorites {
    /// `sha256("account:Favorites")[..8]`
    pub const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = [44, 205, 48, 25, 172, 96, 48, 27];

    /// The maximum length of `color` in bytes.
    pub const MAX_COLOR_LEN: usize = 50;

    /// Space taken by the fields at their maximum size: `u64` + `u32` length prefix + color bytes.
    pub const INIT_SPACE: usize = 8 + 4 + Self::MAX_COLOR_LEN;

    /// The total allocated size of a favorites account.
    pub const LEN: usize = DISCRIMINATOR_LEN + Self::INIT_SPACE;

    pub fn new(number: u64, color: impl Into<String>) -> Self {
        Self {
            number,
            color: color.into(),
        }
    }

    /// Encodes the account data, zero-padded to [`Favorites::LEN`].
    pub fn pack(&self) -> Result<Vec<u8>, StateError> {
        if self.color.len() > Self::MAX_COLOR_LEN {
            return Err(StateError::ColorTooLong(self.color.len()));
        }

        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        self.serialize(&mut data)
            .expect("Serializing into a Vec can't fail");
        data.resize(Self::LEN, 0);

        Ok(data)
    }

    /// Decodes account data, checking the discriminator first. Trailing padding is ignored.
    pub fn unpack(data: &[u8]) -> Result<Self, StateError> {
        let (discriminator, mut rest) = data
            .split_first_chunk::<DISCRIMINATOR_LEN>()
            .ok_or(StateError::MissingDiscriminator(data.len()))?;

        if discriminator != &Self::DISCRIMINATOR {
            return Err(StateError::DiscriminatorMismatch(*discriminator));
        }

        Self::deserialize(&mut rest).map_err(|e| StateError::Deserialize(e.to_string()))
    }
}

const_assert_eq!(Favorites::LEN, 70);

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StateError {
    #[error("account data is {0} bytes, too short for the account discriminator")]
    MissingDiscriminator(usize),

    #[error("account discriminator {0:?} doesn't match the favorites account")]
    DiscriminatorMismatch([u8; DISCRIMINATOR_LEN]),

    #[error("failed to deserialize favorites account: {0}")]
    Deserialize(String),

    #[error("color is {0} bytes long, the maximum is {max}", max = Favorites::MAX_COLOR_LEN)]
    ColorTooLong(usize),
}

impl From<&StateError> for AnchorError {
    fn from(value: &StateError) -> Self {
        match value {
            StateError::MissingDiscriminator(_) => AnchorError::AccountDiscriminatorNotFound,
            StateError::DiscriminatorMismatch(_) => AnchorError::AccountDiscriminatorMismatch,
            StateError::Deserialize(_) => AnchorError::AccountDidNotDeserialize,
            StateError::ColorTooLong(_) => AnchorError::AccountDidNotSerialize,
        }
    }
}

#[cfg(test)]
mod tests {
    use sha2::{
        Digest,
        Sha256,
    };

    use super::*;

    #[test]
    fn discriminator_is_the_account_name_hash() {
        let hash = Sha256::digest(b"account:Favorites");
        assert_eq!(Favorites::DISCRIMINATOR, hash[..DISCRIMINATOR_LEN]);
    }

    #[test]
    fn packed_layout() {
        let data = Favorites::new(23, "red").pack().unwrap();
        assert_eq!(data.len(), Favorites::LEN);
        assert_eq!(data[..8], Favorites::DISCRIMINATOR);
        assert_eq!(data[8..16], 23u64.to_le_bytes());
        assert_eq!(data[16..20], 3u32.to_le_bytes());
        assert_eq!(&data[20..23], b"red");
        assert!(data[23..].iter().all(|b| *b == 0));
    }

    #[test]
    fn unpack_ignores_padding() {
        let favorites = Favorites::new(u64::MAX, "a".repeat(Favorites::MAX_COLOR_LEN));
        let data = favorites.pack().unwrap();
        assert_eq!(Favorites::unpack(&data).unwrap(), favorites);

        let mut padded = Favorites::new(7, "blue").pack().unwrap();
        padded.extend_from_slice(&[0; 16]);
        assert_eq!(Favorites::unpack(&padded).unwrap(), Favorites::new(7, "blue"));
    }

    #[test]
    fn color_longer_than_max_is_rejected() {
        let favorites = Favorites::new(1, "x".repeat(Favorites::MAX_COLOR_LEN + 1));
        assert_eq!(
            favorites.pack(),
            Err(StateError::ColorTooLong(Favorites::MAX_COLOR_LEN + 1))
        );
    }

    #[test]
    fn unpack_rejects_bad_discriminator_and_short_data() {
        let mut data = Favorites::new(1, "red").pack().unwrap();
        assert_eq!(
            Favorites::unpack(&data[..4]),
            Err(StateError::MissingDiscriminator(4))
        );

        data[0] ^= 0xff;
        assert!(matches!(
            Favorites::unpack(&data),
            Err(StateError::DiscriminatorMismatch(_))
        ));
    }

    #[test]
    fn unpack_rejects_truncated_fields() {
        let data = Favorites::new(1, "red").pack().unwrap();
        assert!(matches!(
            Favorites::unpack(&data[..12]),
            Err(StateError::Deserialize(_))
        ));
    }
}
