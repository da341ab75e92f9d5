// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::view::{placeholder_description, placeholder_title, SessionView, Tally};
use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use cv_data::{DataError, SessionMeta, SessionMetaStore};
use cv_evm::VotingRead;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Merges on-chain session records with locally stored metadata into the
/// view model, and keeps the most recent result around for eligibility
/// checks. Loads are not debounced; when two overlap, the later completion
/// wins the cache.
pub struct SessionSynchronizer {
    reader: Arc<dyn VotingRead>,
    voter_reader: Option<Arc<dyn VotingRead>>,
    meta: SessionMetaStore,
    cache: RwLock<Vec<SessionView>>,
}

impl SessionSynchronizer {
    pub fn new(reader: Arc<dyn VotingRead>, meta: SessionMetaStore) -> Self {
        Self {
            reader,
            voter_reader: None,
            meta,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Route `hasVoted` lookups through the signer-capable connection;
    /// everything else stays on the public read-only one.
    pub fn with_voter_reader(mut self, reader: Arc<dyn VotingRead>) -> Self {
        self.voter_reader = Some(reader);
        self
    }

    /// Fetch every session in contract index order. A failure on one index
    /// drops that session from the result and never aborts the rest; only
    /// a failure to read the count itself is fatal.
    pub async fn load_sessions(&self, connected: Option<Address>) -> Result<Vec<SessionView>> {
        let count = self.reader.get_session_count().await?;
        let meta_map = self.meta.all().await;

        let mut sessions = Vec::with_capacity(count as usize);
        for session_id in 0..count {
            match self.load_one(session_id, connected, &meta_map).await {
                Ok(view) => sessions.push(view),
                Err(err) => warn!(session_id, "Error loading session: {err}"),
            }
        }

        *self.cache.write().await = sessions.clone();
        Ok(sessions)
    }

    async fn load_one(
        &self,
        session_id: u64,
        connected: Option<Address>,
        meta_map: &HashMap<String, SessionMeta>,
    ) -> Result<SessionView> {
        let info = self.reader.get_session(session_id).await?;
        let record = self.reader.get_session_record(session_id).await?;

        let has_voted = match connected {
            Some(address) => {
                let reader = self.voter_reader.as_ref().unwrap_or(&self.reader);
                match reader.has_voted(session_id, address).await {
                    Ok(voted) => voted,
                    Err(err) => {
                        warn!(session_id, "Failed to check hasVoted: {err}");
                        false
                    }
                }
            }
            None => false,
        };

        let end_time = DateTime::<Utc>::from_timestamp(info.end_time as i64, 0)
            .ok_or_else(|| anyhow!("session {session_id} has out-of-range end time"))?;
        let is_active = Utc::now() < end_time && !info.resolved;

        let tally = if info.resolved {
            Tally::Revealed {
                yes_votes: info.yes_votes,
                no_votes: info.no_votes,
            }
        } else {
            Tally::Pending {
                yes_votes: info.yes_votes,
                no_votes: info.no_votes,
            }
        };

        let (title, description) = match meta_map.get(&session_id.to_string()) {
            Some(meta) => (meta.title.clone(), meta.description.clone()),
            None => (
                placeholder_title(session_id),
                placeholder_description(&info.creator),
            ),
        };

        Ok(SessionView {
            session_id,
            title,
            description,
            creator: info.creator,
            end_time,
            resolved: info.resolved,
            reveal_requested: record.reveal_requested,
            has_voted,
            is_active,
            tally,
        })
    }

    /// The most recently loaded sessions, without touching the chain.
    pub async fn snapshot(&self) -> Vec<SessionView> {
        self.cache.read().await.clone()
    }

    pub async fn session(&self, session_id: u64) -> Option<SessionView> {
        self.cache
            .read()
            .await
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned()
    }

    /// Resolved sessions from the latest snapshot, in index order.
    pub async fn completed_sessions(&self) -> Vec<SessionView> {
        self.cache
            .read()
            .await
            .iter()
            .filter(|s| s.resolved)
            .cloned()
            .collect()
    }

    /// Persist title/description for a session id. Overwrites whatever was
    /// there; no merge.
    pub async fn create_session_metadata(
        &self,
        session_id: u64,
        title: &str,
        description: &str,
    ) -> Result<(), DataError> {
        self.meta.put(session_id, title, description).await
    }
}
