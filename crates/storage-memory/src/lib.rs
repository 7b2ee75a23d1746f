// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! An in-memory implementation of the storage contract.
//!
//! Used by the test suites and by single-process deployments that don't need
//! durability. Updates run under the store's write lock, so the updater
//! callback always observes the freshest value and conflict retries never
//! happen; distributed backends get the same observable behavior through
//! re-read-and-retry.

#![deny(missing_docs)]

mod offline_session;
mod refresh_token;

use std::{collections::HashMap, sync::Arc};

use palisade_data_model::{OfflineSession, StoredRefreshToken};
use palisade_storage::{OfflineSessionRepository, RefreshTokenRepository, RepositoryAccess};
use parking_lot::RwLock;

use self::{
    offline_session::MemoryOfflineSessionRepository, refresh_token::MemoryRefreshTokenRepository,
};

#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub(crate) refresh_tokens: HashMap<String, StoredRefreshToken>,

    /// Keyed by (user ID, connector ID).
    pub(crate) offline_sessions: HashMap<(String, String), OfflineSession>,
}

/// An in-memory storage backend.
///
/// Cloning is cheap and every clone shares the same underlying store, which
/// lets tests keep a handle for assertions while the handler owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryAccess for MemoryStorage {
    fn refresh_token<'c>(&'c mut self) -> Box<dyn RefreshTokenRepository + 'c> {
        Box::new(MemoryRefreshTokenRepository {
            inner: Arc::clone(&self.inner),
        })
    }

    fn offline_session<'c>(&'c mut self) -> Box<dyn OfflineSessionRepository + 'c> {
        Box::new(MemoryOfflineSessionRepository {
            inner: Arc::clone(&self.inner),
        })
    }
}

#[cfg(test)]
mod tests {
    use palisade_data_model::RefreshTokenRef;
    use palisade_storage::{RepositoryError, UpdateAbort};

    use super::*;

    fn token(id: &str) -> StoredRefreshToken {
        StoredRefreshToken {
            id: id.to_owned(),
            client_id: "app".to_owned(),
            token: "secret".to_owned(),
            ..StoredRefreshToken::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_token_add_and_lookup() {
        let mut storage = MemoryStorage::new();

        assert!(
            storage
                .refresh_token()
                .lookup("unknown")
                .await
                .unwrap()
                .is_none()
        );

        storage.refresh_token().add(token("t1")).await.unwrap();
        let found = storage.refresh_token().lookup("t1").await.unwrap().unwrap();
        assert_eq!(found.client_id, "app");

        // Creating the same ID twice is refused
        assert!(matches!(
            storage.refresh_token().add(token("t1")).await,
            Err(RepositoryError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_update() {
        let mut storage = MemoryStorage::new();
        storage.refresh_token().add(token("t1")).await.unwrap();

        storage
            .refresh_token()
            .update("t1", &mut |mut old| {
                old.token = "rotated".to_owned();
                Ok(old)
            })
            .await
            .unwrap();

        let found = storage.refresh_token().lookup("t1").await.unwrap().unwrap();
        assert_eq!(found.token, "rotated");

        assert!(matches!(
            storage
                .refresh_token()
                .update("missing", &mut |old| Ok(old))
                .await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_update_abort_leaves_record_alone() {
        let mut storage = MemoryStorage::new();
        storage.refresh_token().add(token("t1")).await.unwrap();

        let res = storage
            .refresh_token()
            .update("t1", &mut |_old| Err(UpdateAbort::ClaimedTwice))
            .await;
        assert!(matches!(
            res,
            Err(RepositoryError::Aborted(UpdateAbort::ClaimedTwice))
        ));

        let found = storage.refresh_token().lookup("t1").await.unwrap().unwrap();
        assert_eq!(found, token("t1"));
    }

    #[tokio::test]
    async fn test_offline_session_round_trip() {
        let mut storage = MemoryStorage::new();

        let mut session = OfflineSession::new("user", "ldap");
        session.refresh.insert(
            "app".to_owned(),
            RefreshTokenRef {
                id: "t1".to_owned(),
                last_used: chrono::DateTime::UNIX_EPOCH,
            },
        );
        storage.offline_session().add(session).await.unwrap();

        assert!(
            storage
                .offline_session()
                .lookup("user", "other-connector")
                .await
                .unwrap()
                .is_none()
        );

        storage
            .offline_session()
            .update("user", "ldap", &mut |mut old| {
                old.connector_data = b"state".to_vec();
                Ok(old)
            })
            .await
            .unwrap();

        let found = storage
            .offline_session()
            .lookup("user", "ldap")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.connector_data, b"state");
        assert_eq!(found.refresh["app"].id, "t1");
    }
}
