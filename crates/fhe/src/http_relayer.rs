// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::sdk::{
    DecryptResponse, EncryptRequest, EncryptResponse, FheInstance, InstanceConfig, RelayerSdk,
};
use alloy::primitives::B256;
use async_trait::async_trait;
use cv_config::RelayerConfig;
use cv_events::VoteError;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const KEYURL_PATH: &str = "/v1/keyurl";
const INPUT_PROOF_PATH: &str = "/v1/input-proof";
const PUBLIC_DECRYPT_PATH: &str = "/v1/public-decrypt";

/// The hosted relayer's HTTP surface. Ciphertext construction and
/// decryption proofs are produced remotely; handles and proofs travel as
/// JSON.
pub struct HttpRelayerSdk {
    client: Client,
    base_url: Url,
}

impl HttpRelayerSdk {
    pub fn new(config: &RelayerConfig) -> Result<Self, VoteError> {
        let base_url = config
            .url()
            .map_err(|e| VoteError::SdkNotLoaded(e.to_string()))?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, VoteError> {
        self.base_url
            .join(path)
            .map_err(|e| VoteError::SdkNotLoaded(e.to_string()))
    }
}

#[async_trait]
impl RelayerSdk for HttpRelayerSdk {
    async fn init_sdk(&self) -> Result<(), VoteError> {
        let url = self.endpoint(KEYURL_PATH)?;
        debug!(%url, "Bootstrapping relayer SDK");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VoteError::SdkNotLoaded(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VoteError::SdkNotLoaded(format!(
                "key material fetch answered {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn create_instance(
        &self,
        config: InstanceConfig,
    ) -> Result<Arc<dyn FheInstance>, VoteError> {
        Ok(Arc::new(HttpFheInstance {
            client: self.client.clone(),
            input_proof_url: self.endpoint(INPUT_PROOF_PATH)?,
            public_decrypt_url: self.endpoint(PUBLIC_DECRYPT_PATH)?,
            config,
        }))
    }
}

#[derive(Debug)]
struct HttpFheInstance {
    client: Client,
    input_proof_url: Url,
    public_decrypt_url: Url,
    config: InstanceConfig,
}

#[derive(Serialize)]
struct InputProofBody<'a> {
    #[serde(rename = "chainId")]
    chain_id: u64,
    #[serde(flatten)]
    request: &'a EncryptRequest,
}

#[derive(Serialize)]
struct PublicDecryptBody<'a> {
    handles: &'a [B256],
}

#[async_trait]
impl FheInstance for HttpFheInstance {
    async fn encrypt_input(&self, request: EncryptRequest) -> Result<EncryptResponse, VoteError> {
        let body = InputProofBody {
            chain_id: self.config.chain_id,
            request: &request,
        };
        post_json(&self.client, self.input_proof_url.clone(), &body).await
    }

    async fn public_decrypt(&self, handles: &[B256]) -> Result<DecryptResponse, VoteError> {
        let body = PublicDecryptBody { handles };
        post_json(&self.client, self.public_decrypt_url.clone(), &body).await
    }
}

async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
    client: &Client,
    url: Url,
    body: &B,
) -> Result<T, VoteError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| VoteError::Relayer(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| VoteError::Relayer(e.to_string()))?;

    if !status.is_success() {
        return Err(VoteError::Relayer(format!("{status}: {text}")));
    }

    serde_json::from_str(&text).map_err(|e| VoteError::MalformedResult(e.to_string()))
}
