// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::builder::EncryptedVote;
use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cv_config::ChainConfig;
use cv_events::VoteError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration handed to instance creation: the chain preset merged with
/// the network the active wallet is on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(rename = "network")]
    pub network_url: String,
}

impl InstanceConfig {
    pub fn from_chain(chain: &ChainConfig) -> Result<Self> {
        Ok(Self {
            chain_id: chain
                .chain_id
                .ok_or_else(|| anyhow!("chain {} has no chain_id configured", chain.name))?,
            network_url: chain.rpc_url()?.as_http_url()?,
        })
    }
}

/// The relayer SDK surface this client consumes. The cryptography itself
/// stays behind it; we only move handles and proofs around.
#[async_trait]
pub trait RelayerSdk: Send + Sync {
    /// One-time bootstrap, performed before the first instance is created.
    async fn init_sdk(&self) -> Result<(), VoteError>;

    async fn create_instance(
        &self,
        config: InstanceConfig,
    ) -> Result<Arc<dyn FheInstance>, VoteError>;
}

/// A network-bound encryption instance.
#[async_trait]
pub trait FheInstance: Send + Sync + std::fmt::Debug {
    async fn encrypt_input(&self, request: EncryptRequest) -> Result<EncryptResponse, VoteError>;

    /// One call decrypts the whole batch; per-handle calls would produce
    /// proofs that cannot be checked together.
    async fn public_decrypt(&self, handles: &[B256]) -> Result<DecryptResponse, VoteError>;
}

/// An encrypted-input request bound to the exact (contract, user) pair it
/// will be submitted under. The binding is what stops a ciphertext from
/// being replayed against another contract or from another account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EncryptRequest {
    #[serde(rename = "contractAddress")]
    pub contract_address: Address,
    #[serde(rename = "userAddress")]
    pub user_address: Address,
    pub values: Vec<InputValue>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum InputValue {
    #[serde(rename = "uint32")]
    U32(u32),
}

impl EncryptRequest {
    pub fn bound_to(contract_address: Address, user_address: Address) -> Self {
        Self {
            contract_address,
            user_address,
            values: Vec::new(),
        }
    }

    pub fn add32(mut self, value: u32) -> Self {
        self.values.push(InputValue::U32(value));
        self
    }
}

/// The two encrypt-result shapes relayer deployments are known to answer
/// with. Anything else fails the decode and surfaces as
/// `VoteError::MalformedResult`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum EncryptResponse {
    Handles {
        handles: Vec<B256>,
        #[serde(rename = "inputProof")]
        input_proof: Bytes,
    },
    Flat {
        #[serde(rename = "encryptedData")]
        encrypted_data: B256,
        proof: Bytes,
    },
}

impl EncryptResponse {
    pub fn into_encrypted_vote(self) -> Result<EncryptedVote, VoteError> {
        match self {
            EncryptResponse::Handles {
                handles,
                input_proof,
            } => handles
                .first()
                .copied()
                .map(|handle| EncryptedVote {
                    handle,
                    proof: input_proof,
                })
                .ok_or_else(|| VoteError::MalformedResult("empty handle list".to_string())),
            EncryptResponse::Flat {
                encrypted_data,
                proof,
            } => Ok(EncryptedVote {
                handle: encrypted_data,
                proof,
            }),
        }
    }
}

/// The two public-decrypt result shapes: a keyed envelope carrying the
/// proof material, or a bare handle→value map.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum DecryptResponse {
    Keyed {
        #[serde(rename = "clearValues")]
        clear_values: HashMap<String, U256>,
        #[serde(rename = "abiEncodedClearValues", default)]
        abi_encoded_clear_values: Option<Bytes>,
        #[serde(rename = "decryptionProof", default)]
        decryption_proof: Option<Bytes>,
    },
    Direct(HashMap<String, U256>),
}

impl DecryptResponse {
    pub fn value_for(&self, handle: &B256) -> Option<U256> {
        let key = handle.to_string();
        match self {
            DecryptResponse::Keyed { clear_values, .. } => clear_values.get(&key).copied(),
            DecryptResponse::Direct(map) => map.get(&key).copied(),
        }
    }

    pub fn cleartexts(&self) -> Bytes {
        match self {
            DecryptResponse::Keyed {
                abi_encoded_clear_values,
                ..
            } => abi_encoded_clear_values.clone().unwrap_or_default(),
            DecryptResponse::Direct(_) => Bytes::default(),
        }
    }

    pub fn proof(&self) -> Bytes {
        match self {
            DecryptResponse::Keyed {
                decryption_proof, ..
            } => decryption_proof.clone().unwrap_or_default(),
            DecryptResponse::Direct(_) => Bytes::default(),
        }
    }
}
