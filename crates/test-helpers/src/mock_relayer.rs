// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::B256;
use async_trait::async_trait;
use cv_events::VoteError;
use cv_fhe::{
    DecryptResponse, EncryptRequest, EncryptResponse, FheInstance, InstanceConfig, RelayerSdk,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Relayer SDK double. Counts bootstraps, optionally fails them, and hands
/// out a shared [`MockFheInstance`].
pub struct MockRelayerSdk {
    pub bootstraps: AtomicUsize,
    fail_init: AtomicBool,
    instance: Arc<MockFheInstance>,
}

impl MockRelayerSdk {
    pub fn new() -> Self {
        Self {
            bootstraps: AtomicUsize::new(0),
            fail_init: AtomicBool::new(false),
            instance: Arc::new(MockFheInstance::new()),
        }
    }

    pub fn with_instance(instance: Arc<MockFheInstance>) -> Self {
        Self {
            bootstraps: AtomicUsize::new(0),
            fail_init: AtomicBool::new(false),
            instance,
        }
    }

    pub fn fail_init(&self) {
        self.fail_init.store(true, Ordering::SeqCst);
    }

    pub fn instance(&self) -> Arc<MockFheInstance> {
        self.instance.clone()
    }

    pub fn bootstrap_count(&self) -> usize {
        self.bootstraps.load(Ordering::SeqCst)
    }
}

impl Default for MockRelayerSdk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayerSdk for MockRelayerSdk {
    async fn init_sdk(&self) -> Result<(), VoteError> {
        self.bootstraps.fetch_add(1, Ordering::SeqCst);
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(VoteError::SdkNotLoaded(
                "mock relayer configured to fail bootstrap".to_string(),
            ));
        }
        Ok(())
    }

    async fn create_instance(
        &self,
        _config: InstanceConfig,
    ) -> Result<Arc<dyn FheInstance>, VoteError> {
        Ok(self.instance.clone())
    }
}

/// Encryption instance double. Responses are canned JSON so tests exercise
/// the same decoding path as the HTTP client; requests are recorded for
/// binding assertions.
#[derive(Debug)]
pub struct MockFheInstance {
    pub encrypt_calls: AtomicUsize,
    pub decrypt_calls: AtomicUsize,
    fail_encrypt: AtomicBool,
    encrypt_json: Mutex<String>,
    decrypt_json: Mutex<String>,
    last_request: Mutex<Option<EncryptRequest>>,
}

impl MockFheInstance {
    pub fn new() -> Self {
        let handle = B256::repeat_byte(0xaa);
        Self {
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
            fail_encrypt: AtomicBool::new(false),
            encrypt_json: Mutex::new(format!(
                r#"{{"handles": ["{handle}"], "inputProof": "0x0102"}}"#
            )),
            decrypt_json: Mutex::new("{}".to_string()),
            last_request: Mutex::new(None),
        }
    }

    pub fn set_encrypt_json(&self, json: impl Into<String>) {
        *self.encrypt_json.lock().unwrap() = json.into();
    }

    pub fn set_decrypt_json(&self, json: impl Into<String>) {
        *self.decrypt_json.lock().unwrap() = json.into();
    }

    pub fn fail_encryption(&self) {
        self.fail_encrypt.store(true, Ordering::SeqCst);
    }

    pub fn last_request(&self) -> Option<EncryptRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn encrypt_call_count(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_call_count(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockFheInstance {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FheInstance for MockFheInstance {
    async fn encrypt_input(&self, request: EncryptRequest) -> Result<EncryptResponse, VoteError> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(VoteError::Relayer(
                "mock relayer configured to fail encryption".to_string(),
            ));
        }

        let json = self.encrypt_json.lock().unwrap().clone();
        serde_json::from_str(&json).map_err(|e| VoteError::MalformedResult(e.to_string()))
    }

    async fn public_decrypt(&self, _handles: &[B256]) -> Result<DecryptResponse, VoteError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        let json = self.decrypt_json.lock().unwrap().clone();
        serde_json::from_str(&json).map_err(|e| VoteError::MalformedResult(e.to_string()))
    }
}
