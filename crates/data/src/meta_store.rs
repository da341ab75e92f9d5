// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::sled_db::{DataError, SledDb};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Titles and descriptions never touch the chain; they live only in this
/// client's local store.
const SESSION_META_KEY: &str = "ciphervote_session_meta";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub title: String,
    pub description: String,
}

/// Local metadata for voting sessions, keyed by session id. The whole map
/// is stored under one key and rewritten on every update, so concurrent
/// writers resolve last-write-wins.
#[derive(Clone)]
pub struct SessionMetaStore {
    db: SledDb,
}

impl SessionMetaStore {
    pub fn new(db: SledDb) -> Self {
        Self { db }
    }

    /// A corrupt or absent map reads as empty rather than failing the
    /// caller; sessions without metadata get placeholders downstream.
    pub async fn all(&self) -> HashMap<String, SessionMeta> {
        match self.db.get::<HashMap<String, SessionMeta>>(SESSION_META_KEY).await {
            Ok(Some(map)) => map,
            Ok(None) => HashMap::new(),
            Err(err) => {
                tracing::warn!("Failed to read session metadata: {err}");
                HashMap::new()
            }
        }
    }

    pub async fn get(&self, session_id: u64) -> Option<SessionMeta> {
        self.all().await.remove(&session_id.to_string())
    }

    pub async fn put(
        &self,
        session_id: u64,
        title: &str,
        description: &str,
    ) -> Result<(), DataError> {
        let mut map = self.all().await;
        map.insert(
            session_id.to_string(),
            SessionMeta {
                title: title.to_string(),
                description: description.to_string(),
            },
        );
        self.db.insert(SESSION_META_KEY, &map).await
    }
}
