//! An [`Instruction`] wrapper for instructions that require exactly one signer.

use solana_address::Address;
use solana_instruction::Instruction;
use solana_sdk::signature::{
    Keypair,
    Signature,
    Signer,
};

use crate::{
    error::ClientError,
    rpc::ClusterRpc,
    transactions::ChainClient,
};

/// An instruction with exactly one signing account, which can therefore be sent with that signer as
/// both the fee payer and the only signature.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleSignerInstruction {
    pub instruction: Instruction,
    pub signer: Address,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("expected exactly one signer, found {0}")]
pub struct NotSingleSigner(pub usize);

impl TryFrom<Instruction> for SingleSignerInstruction {
    type Error = NotSingleSigner;

    fn try_from(instruction: Instruction) -> Result<Self, Self::Error> {
        let mut signers = instruction.accounts.iter().filter(|meta| meta.is_signer);
        match (signers.next(), signers.count()) {
            (Some(signer), 0) => Ok(Self {
                signer: signer.pubkey,
                instruction,
            }),
            (first, rest) => Err(NotSingleSigner(first.map_or(0, |_| 1 + rest))),
        }
    }
}

impl From<SingleSignerInstruction> for Instruction {
    fn from(value: SingleSignerInstruction) -> Self {
        value.instruction
    }
}

impl AsRef<Instruction> for SingleSignerInstruction {
    fn as_ref(&self) -> &Instruction {
        &self.instruction
    }
}

impl SingleSignerInstruction {
    /// Sends the instruction in its own transaction with `signer` paying and signing.
    ///
    /// Fails with [`ClientError::Signing`] before anything is sent if `signer` isn't the
    /// instruction's signing account.
    pub async fn send_single_signer<R: ClusterRpc>(
        &self,
        rpc: &ChainClient<R>,
        signer: &Keypair,
    ) -> Result<Signature, ClientError> {
        if signer.pubkey() != self.signer {
            return Err(ClientError::Signing(format!(
                "instruction must be signed by {}, got {}",
                self.signer,
                signer.pubkey()
            )));
        }
        rpc.send_single_signer(signer, [self.instruction.clone()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use solana_instruction::AccountMeta;

    use super::*;

    fn instruction_with_signers(num_signers: usize) -> Instruction {
        let mut accounts = (0..num_signers)
            .map(|_| AccountMeta::new(Address::new_unique(), true))
            .collect::<Vec<_>>();
        accounts.push(AccountMeta::new_readonly(Address::new_unique(), false));
        Instruction::new_with_bytes(Address::new_unique(), &[], accounts)
    }

    #[test]
    fn accepts_exactly_one_signer() {
        let instruction = instruction_with_signers(1);
        let signer = instruction.accounts[0].pubkey;
        let single: SingleSignerInstruction = instruction.clone().try_into().unwrap();
        assert_eq!(single.signer, signer);
        assert_eq!(Instruction::from(single), instruction);
    }

    #[test]
    fn rejects_zero_or_many_signers() {
        assert_eq!(
            SingleSignerInstruction::try_from(instruction_with_signers(0)),
            Err(NotSingleSigner(0))
        );
        assert_eq!(
            SingleSignerInstruction::try_from(instruction_with_signers(3)),
            Err(NotSingleSigner(3))
        );
    }
}
