// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::{path::Path, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("SledDB error: {0}")]
    SledDb(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON-valued key-value store shared by the metadata and fallback-vote
/// ledgers. Values are read-modify-written whole; last write wins.
#[derive(Clone)]
pub struct SledDb {
    db: Arc<RwLock<Db>>,
}

impl SledDb {
    pub fn new(path: &Path) -> Result<Self, DataError> {
        info!("Opening data store at {:?}", path);
        let db = sled::open(path)?;
        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    pub async fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DataError> {
        let serialized = serde_json::to_vec(value)?;
        self.db.write().await.insert(key.as_bytes(), serialized)?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DataError> {
        if let Some(bytes) = self.db.read().await.get(key.as_bytes())? {
            let value = serde_json::from_slice(&bytes)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn test_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = SledDb::new(dir.path())?;

        assert_eq!(db.get::<Vec<u64>>("missing").await?, None);

        db.insert("k", &vec![1u64, 2, 3]).await?;
        assert_eq!(db.get::<Vec<u64>>("k").await?, Some(vec![1, 2, 3]));

        db.insert("k", &vec![9u64]).await?;
        assert_eq!(db.get::<Vec<u64>>("k").await?, Some(vec![9]));
        Ok(())
    }
}
