// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::sdk::FheInstance;
use alloy::primitives::{Bytes, B256};
use cv_events::VoteError;

/// Cleartexts for one batch of handles, in input order, with the proof
/// material needed to resolve the tally on-chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedBatch {
    pub cleartexts: Bytes,
    pub decryption_proof: Bytes,
    pub values: Vec<u64>,
}

/// Publicly decrypt a batch of ciphertext handles in a single relayer
/// call. Values are narrowed to `u64`; anything wider is an error, never a
/// silent truncation.
pub async fn decrypt_handles(
    instance: &dyn FheInstance,
    handles: &[B256],
) -> Result<DecryptedBatch, VoteError> {
    if handles.is_empty() {
        return Err(VoteError::EmptyInput);
    }

    let result = instance.public_decrypt(handles).await?;

    let mut values = Vec::with_capacity(handles.len());
    for handle in handles {
        let raw = result
            .value_for(handle)
            .ok_or_else(|| VoteError::MissingValue(handle.to_string()))?;
        let narrowed = u64::try_from(raw).map_err(|_| {
            VoteError::MalformedResult(format!("cleartext for {handle} exceeds u64 range"))
        })?;
        values.push(narrowed);
    }

    Ok(DecryptedBatch {
        cleartexts: result.cleartexts(),
        decryption_proof: result.proof(),
        values,
    })
}
