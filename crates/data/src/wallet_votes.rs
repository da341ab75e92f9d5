// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::sled_db::{DataError, SledDb};
use std::collections::HashMap;

const WALLET_VOTES_KEY: &str = "ciphervote_wallet_votes";

/// Per-wallet record of voted session ids, used only when no chain backing
/// is available. Addresses are normalized to lower case so checksummed and
/// plain forms of the same account share a record.
#[derive(Clone)]
pub struct WalletVoteStore {
    db: SledDb,
}

impl WalletVoteStore {
    pub fn new(db: SledDb) -> Self {
        Self { db }
    }

    async fn all(&self) -> HashMap<String, Vec<u64>> {
        match self
            .db
            .get::<HashMap<String, Vec<u64>>>(WALLET_VOTES_KEY)
            .await
        {
            Ok(Some(map)) => map,
            Ok(None) => HashMap::new(),
            Err(err) => {
                tracing::warn!("Failed to read wallet vote records: {err}");
                HashMap::new()
            }
        }
    }

    pub async fn voted_sessions(&self, address: &str) -> Vec<u64> {
        self.all()
            .await
            .remove(&address.to_lowercase())
            .unwrap_or_default()
    }

    pub async fn has_voted(&self, address: &str, session_id: u64) -> bool {
        self.voted_sessions(address).await.contains(&session_id)
    }

    pub async fn record(&self, address: &str, session_id: u64) -> Result<(), DataError> {
        let mut map = self.all().await;
        let sessions = map.entry(address.to_lowercase()).or_default();
        if !sessions.contains(&session_id) {
            sessions.push(session_id);
        }
        self.db.insert(WALLET_VOTES_KEY, &map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn test_record_and_lookup_normalizes_case() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = WalletVoteStore::new(SledDb::new(dir.path())?);

        assert!(!store.has_voted("0xAbCd", 1).await);

        store.record("0xAbCd", 1).await?;
        assert!(store.has_voted("0xabcd", 1).await);
        assert!(store.has_voted("0xABCD", 1).await);
        assert!(!store.has_voted("0xabcd", 2).await);

        // duplicate records do not duplicate entries
        store.record("0xabcd", 1).await?;
        assert_eq!(store.voted_sessions("0xAbCd").await, vec![1]);
        Ok(())
    }
}
