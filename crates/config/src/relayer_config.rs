// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Where the FHE relayer service lives. The relayer performs the actual
/// cryptography; this client only speaks its HTTP surface.
#[derive(Debug, Clone, PartialEq, Hash, Eq, Deserialize, Serialize)]
pub struct RelayerConfig {
    pub url: String,
}

impl RelayerConfig {
    pub fn url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|e| anyhow!("Failed to parse relayer URL: {}", e))
    }
}
