// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use std::env;
use tokio::sync::watch;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletStatus {
    Disconnected,
    Connected { address: Address, chain_id: u64 },
}

impl WalletStatus {
    pub fn address(&self) -> Option<Address> {
        match self {
            WalletStatus::Connected { address, .. } => Some(*address),
            WalletStatus::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, WalletStatus::Connected { .. })
    }
}

/// Connection state of the active wallet. Account and chain switches are
/// pushed through a watch channel, so anything holding a subscription sees
/// the latest state without polling.
#[derive(Clone)]
pub struct Wallet {
    tx: watch::Sender<WalletStatus>,
}

impl Wallet {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WalletStatus::Disconnected);
        Self { tx }
    }

    pub fn connect(&self, address: Address, chain_id: u64) {
        self.tx
            .send_replace(WalletStatus::Connected { address, chain_id });
    }

    pub fn disconnect(&self) {
        self.tx.send_replace(WalletStatus::Disconnected);
    }

    pub fn status(&self) -> WalletStatus {
        self.tx.borrow().clone()
    }

    pub fn address(&self) -> Option<Address> {
        self.status().address()
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletStatus> {
        self.tx.subscribe()
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_signer_from_env(var: &str) -> Result<PrivateKeySigner> {
    let private_key = env::var(var)?;
    env::remove_var(var);
    private_key.parse().map_err(Into::into)
}
