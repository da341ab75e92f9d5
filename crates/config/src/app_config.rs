// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::ChainConfig;
use crate::contract::{Contract, ContractAddresses};
use crate::relayer_config::RelayerConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sepolia deployment the public client points at out of the box.
pub const DEFAULT_VOTING_CONTRACT: &str = "0x5Bdeb5390cA4063029F3eF44Bc15F01e8d621260";
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";
pub const DEFAULT_RELAYER_URL: &str = "https://relayer.testnet.zama.cloud";

const SEPOLIA_CHAIN_ID: u64 = 11155111;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Instance name, used for logging scope and the data dir suffix
    pub name: String,
    /// Where sled keeps its files. Defaults to the OS data dir.
    pub data_dir: PathBuf,
    pub chain: ChainConfig,
    pub relayer: RelayerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "ciphervote".to_string(),
            data_dir: OsDirs::data_dir(),
            chain: ChainConfig {
                name: "sepolia".to_string(),
                rpc_url: DEFAULT_RPC_URL.to_string(),
                rpc_auth: Default::default(),
                contracts: ContractAddresses {
                    voting: Contract::AddressOnly(DEFAULT_VOTING_CONTRACT.to_string()),
                },
                chain_id: Some(SEPOLIA_CHAIN_ID),
            },
            relayer: RelayerConfig {
                url: DEFAULT_RELAYER_URL.to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn db_file(&self) -> PathBuf {
        self.data_dir.join(&self.name).join("store")
    }
}

/// Load the config from the given YAML file (if any), then apply
/// `CIPHERVOTE_`-prefixed environment overrides on top of the defaults.
pub fn load_config(config_file: Option<PathBuf>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_file {
        figment = figment.merge(Yaml::file(path));
    }

    figment
        .merge(Env::prefixed("CIPHERVOTE_").split("__"))
        .extract()
        .context("Could not parse configuration")
}

pub struct OsDirs;
impl OsDirs {
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .expect("CipherVote may only be run on an OS that can provide a data dir. See https://docs.rs/dirs for more information.")
            .join("ciphervote")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcAuth;
    use figment::Jail;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = AppConfig::default();
        assert_eq!(config.name, "ciphervote");
        assert_eq!(config.chain.contracts.voting.address(), DEFAULT_VOTING_CONTRACT);
        assert_eq!(config.chain.chain_id, Some(SEPOLIA_CHAIN_ID));
        assert_eq!(config.relayer.url()?.scheme(), "https");
        assert!(config.db_file().ends_with("ciphervote/store"));
        Ok(())
    }

    #[test]
    fn test_deserialization() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ciphervote.config.yaml",
                r#"
name: "myvote"
data_dir: "/mydata/ciphervote"
chain:
  name: "hardhat"
  rpc_url: "ws://localhost:8545"
  rpc_auth:
    type: "Basic"
    credentials:
      username: "testUser"
      password: "testPassword"
  contracts:
    voting:
      address: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
      deploy_block: 1764352
relayer:
  url: "http://localhost:3000"
"#,
            )?;

            let config = load_config(Some(PathBuf::from("ciphervote.config.yaml")))
                .map_err(|e| figment::Error::from(e.to_string()))?;

            assert_eq!(config.name, "myvote");
            assert_eq!(config.data_dir, PathBuf::from("/mydata/ciphervote"));
            assert_eq!(config.chain.name, "hardhat");
            assert_eq!(
                config.chain.rpc_auth,
                RpcAuth::Basic {
                    username: "testUser".to_string(),
                    password: "testPassword".to_string(),
                }
            );
            assert_eq!(
                config.chain.contracts.voting.address(),
                "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
            );
            assert_eq!(config.chain.contracts.voting.deploy_block(), Some(1764352));
            assert_eq!(config.relayer.url, "http://localhost:3000");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("CIPHERVOTE_NAME", "from-env");
            jail.set_env("CIPHERVOTE_RELAYER__URL", "http://localhost:9000");

            let config =
                load_config(None).map_err(|e| figment::Error::from(e.to_string()))?;

            assert_eq!(config.name, "from-env");
            assert_eq!(config.relayer.url, "http://localhost:9000");
            // untouched keys keep their defaults
            assert_eq!(config.chain.rpc_url, DEFAULT_RPC_URL);
            Ok(())
        });
    }
}
