// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::instance::InstanceManager;
use crate::sdk::{EncryptRequest, FheInstance};
use alloy::primitives::{Address, Bytes, B256};
use cv_events::VoteError;
use tracing::debug;

/// A freshly built encrypted vote: ciphertext handle plus the validity
/// proof the contract checks on submission. Never reused across sessions,
/// users, or contracts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedVote {
    pub handle: B256,
    pub proof: Bytes,
}

/// Encrypt a yes/no choice as a 32-bit value (`true→1`, `false→0`) bound
/// to the (contract, user) pair it will be submitted under.
pub async fn build_vote(
    instance: &dyn FheInstance,
    contract_address: Address,
    user_address: Address,
    vote_yes: bool,
) -> Result<EncryptedVote, VoteError> {
    let value: u32 = if vote_yes { 1 } else { 0 };
    debug!(
        contract = %contract_address,
        user = %user_address,
        "Encrypting vote"
    );

    let request = EncryptRequest::bound_to(contract_address, user_address).add32(value);
    let response = instance.encrypt_input(request).await?;
    response.into_encrypted_vote()
}

/// As [`build_vote`], but sourced from the manager; fails with
/// `NotInitialized` before the encryption instance is ready.
pub async fn build_vote_checked(
    manager: &InstanceManager,
    contract_address: Address,
    user_address: Address,
    vote_yes: bool,
) -> Result<EncryptedVote, VoteError> {
    let instance = manager.get().ok_or(VoteError::NotInitialized)?;
    build_vote(instance.as_ref(), contract_address, user_address, vote_yes).await
}
