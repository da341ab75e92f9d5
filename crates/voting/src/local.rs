// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cv_data::WalletVoteStore;
use cv_events::VoteError;
use tracing::info;

/// Vote bookkeeping for deployments with no chain backing: who voted on
/// what is tracked per lower-cased wallet address in local storage, so the
/// demo UI still refuses duplicate votes.
pub struct LocalVoteLedger {
    store: WalletVoteStore,
}

impl LocalVoteLedger {
    pub fn new(store: WalletVoteStore) -> Self {
        Self { store }
    }

    pub async fn cast_vote(&self, address: &str, session_id: u64) -> Result<(), VoteError> {
        if self.store.has_voted(address, session_id).await {
            return Err(VoteError::AlreadyVoted {
                session_id,
                address: address.to_lowercase(),
            });
        }
        self.store
            .record(address, session_id)
            .await
            .map_err(VoteError::storage)?;
        info!(session_id, "Recorded local vote");
        Ok(())
    }

    pub async fn has_voted(&self, address: &str, session_id: u64) -> bool {
        self.store.has_voted(address, session_id).await
    }

    pub async fn voted_sessions(&self, address: &str) -> Vec<u64> {
        self.store.voted_sessions(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_data::SledDb;

    #[tokio::test]
    async fn test_duplicate_local_votes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = LocalVoteLedger::new(WalletVoteStore::new(SledDb::new(dir.path()).unwrap()));

        ledger.cast_vote("0xAbCd", 3).await.unwrap();
        assert!(ledger.has_voted("0xabcd", 3).await);

        let err = ledger.cast_vote("0xABCD", 3).await.unwrap_err();
        assert!(matches!(
            err,
            VoteError::AlreadyVoted { session_id: 3, .. }
        ));

        // a different session is still open
        ledger.cast_vote("0xabcd", 4).await.unwrap();
        assert_eq!(ledger.voted_sessions("0xAbCd").await, vec![3, 4]);
    }
}
