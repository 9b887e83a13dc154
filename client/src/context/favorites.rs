//! User-level context for building `favorites` instructions from a user's derived addresses.

use favorites_interface::{
    error::FavoritesError,
    instructions::{
        self,
        FavoritesAccounts,
        SetFavoritesArgs,
        UpdateFavoritesArgs,
    },
    pda::find_favorites_address,
    program,
    state::Favorites,
};
use solana_address::Address;

use crate::{
    error::{
        ClientError,
        SubmissionFailure,
    },
    rpc::ClusterRpc,
    single_signer_instruction::SingleSignerInstruction,
    transactions::ChainClient,
};

/// A user's favorites PDA and the program it lives under.
///
/// Implements helper methods for building both program instructions with these values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FavoritesContext {
    pub program_id: Address,
    pub user: Address,
    pub favorites: Address,
    pub bump: u8,
}

impl FavoritesContext {
    /// Derives the context for `user` under the default [`program::ID`].
    pub fn new(user: Address) -> Result<Self, ClientError> {
        Self::new_with_program(program::ID, user)
    }

    pub fn new_with_program(program_id: Address, user: Address) -> Result<Self, ClientError> {
        let (favorites, bump) = find_favorites_address(&user, &program_id)?;
        Ok(Self {
            program_id,
            user,
            favorites,
            bump,
        })
    }

    pub fn accounts(&self) -> FavoritesAccounts {
        FavoritesAccounts {
            user: self.user,
            favorites: self.favorites,
        }
    }

    pub fn set_favorites(&self, number: u64, color: impl Into<String>) -> SingleSignerInstruction {
        instructions::set_favorites(
            &self.program_id,
            self.accounts(),
            SetFavoritesArgs {
                number,
                color: color.into(),
            },
        )
        .try_into()
        .expect("Should be a single signer instruction")
    }

    /// Builds an `update_favorites` instruction. `None` leaves the field unchanged.
    ///
    /// An update that changes nothing is rejected here with
    /// [`FavoritesError::NothingToUpdate`], the same error the program returns for it.
    pub fn update_favorites(
        &self,
        number: Option<u64>,
        color: Option<String>,
    ) -> Result<SingleSignerInstruction, ClientError> {
        let args = UpdateFavoritesArgs { number, color };
        if args.is_empty() {
            return Err(ClientError::Submission(SubmissionFailure::rejected_locally(
                self.program_id,
                FavoritesError::NothingToUpdate,
            )));
        }
        Ok(self.update_favorites_unchecked(args))
    }

    /// Builds an `update_favorites` instruction without checking that it changes anything.
    pub fn update_favorites_unchecked(&self, args: UpdateFavoritesArgs) -> SingleSignerInstruction {
        instructions::update_favorites(&self.program_id, self.accounts(), args)
            .try_into()
            .expect("Should be a single signer instruction")
    }

    /// Reads the user's favorites account back from the cluster.
    pub async fn fetch<R: ClusterRpc>(&self, rpc: &ChainClient<R>) -> Result<Favorites, ClientError> {
        rpc.fetch_favorites_owned_by(&self.favorites, &self.program_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use favorites_interface::{
        error::KnownError,
        instructions::FavoritesInstruction,
    };

    use super::*;

    #[test]
    fn instructions_target_the_derived_pda() {
        let user = Address::new_unique();
        let ctx = FavoritesContext::new(user).unwrap();
        let (expected, bump) = find_favorites_address(&user, &program::ID).unwrap();
        assert_eq!(ctx.favorites, expected);
        assert_eq!(ctx.bump, bump);

        let ix = ctx.set_favorites(23, "red");
        assert_eq!(ix.signer, user);
        assert_eq!(ix.instruction.program_id, program::ID);
        assert_eq!(ix.instruction.accounts[1].pubkey, expected);
        assert_eq!(
            FavoritesInstruction::unpack(&ix.instruction.data).unwrap(),
            FavoritesInstruction::SetFavorites(SetFavoritesArgs {
                number: 23,
                color: "red".into(),
            })
        );
    }

    #[test]
    fn custom_program_id_changes_the_pda() {
        let user = Address::new_unique();
        let other_program = Address::new_unique();
        let default_ctx = FavoritesContext::new(user).unwrap();
        let ctx = FavoritesContext::new_with_program(other_program, user).unwrap();
        assert_ne!(ctx.favorites, default_ctx.favorites);
        assert_eq!(ctx.set_favorites(1, "a").instruction.program_id, other_program);
    }

    #[test]
    fn empty_update_is_rejected_before_sending() {
        let ctx = FavoritesContext::new(Address::new_unique()).unwrap();
        let err = ctx.update_favorites(None, None).unwrap_err();
        assert_eq!(
            err.known_error(),
            Some(KnownError::Program(FavoritesError::NothingToUpdate))
        );

        assert!(ctx.update_favorites(Some(7), None).is_ok());
        assert!(ctx.update_favorites(None, Some("blue".into())).is_ok());
    }
}
