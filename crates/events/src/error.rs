// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::voting_event::VotingErrorType;
use thiserror::Error;

/// Every failure mode of the voting core. Each arm is distinguishable at
/// the call site so the presentation layer can decide how to surface it;
/// nothing in the core retries on its own.
#[derive(Debug, Error)]
pub enum VoteError {
    /// No wallet provider was detected in the environment.
    #[error("no wallet provider detected: {0}")]
    Environment(String),

    /// The encryption SDK is not reachable or failed its one-time bootstrap.
    #[error("encryption SDK not available: {0}")]
    SdkNotLoaded(String),

    /// A cryptographic operation was attempted before the encryption
    /// instance became ready.
    #[error("encryption instance is not initialized")]
    NotInitialized,

    /// The SDK answered with a shape this client does not recognize.
    #[error("unrecognized response from encryption SDK: {0}")]
    MalformedResult(String),

    /// The relayer rejected or failed a request after initialization.
    #[error("relayer request failed: {0}")]
    Relayer(String),

    #[error("decryption requires at least one ciphertext handle")]
    EmptyInput,

    /// The batch decryption result carried no value for this handle.
    #[error("no cleartext for handle {0} in decryption result")]
    MissingValue(String),

    #[error("address {address} has already voted on session {session_id}")]
    AlreadyVoted { session_id: u64, address: String },

    #[error("wallet is not connected")]
    WalletNotConnected,

    /// Wraps the underlying chain-client failure (user rejection, RPC
    /// error, insufficient funds, revert).
    #[error("transaction failed: {0}")]
    Transaction(#[source] anyhow::Error),

    /// Local persistent storage failed underneath a core operation.
    #[error("local storage failed: {0}")]
    Storage(#[source] anyhow::Error),
}

impl VoteError {
    pub fn transaction(err: impl Into<anyhow::Error>) -> Self {
        VoteError::Transaction(err.into())
    }

    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        VoteError::Storage(err.into())
    }

    pub fn err_type(&self) -> VotingErrorType {
        use VoteError::*;
        match self {
            Environment(_) => VotingErrorType::Environment,
            SdkNotLoaded(_) | NotInitialized | MalformedResult(_) | Relayer(_) | EmptyInput
            | MissingValue(_) => VotingErrorType::Fhe,
            Transaction(_) => VotingErrorType::Evm,
            Storage(_) => VotingErrorType::Data,
            AlreadyVoted { .. } | WalletNotConnected => VotingErrorType::Vote,
        }
    }
}
