// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use async_trait::async_trait;
use palisade_data_model::OfflineSession;
use palisade_storage::{
    OfflineSessionRepository, OfflineSessionUpdater, RepositoryError,
};
use parking_lot::RwLock;

use crate::Inner;

/// An implementation of [`OfflineSessionRepository`] over the in-memory
/// store.
pub(crate) struct MemoryOfflineSessionRepository {
    pub(crate) inner: Arc<RwLock<Inner>>,
}

fn key(user_id: &str, connector_id: &str) -> (String, String) {
    (user_id.to_owned(), connector_id.to_owned())
}

#[async_trait]
impl OfflineSessionRepository for MemoryOfflineSessionRepository {
    #[tracing::instrument(
        name = "memory.offline_session.lookup",
        skip_all,
        fields(user.id = user_id, connector.id = connector_id),
    )]
    async fn lookup(
        &mut self,
        user_id: &str,
        connector_id: &str,
    ) -> Result<Option<OfflineSession>, RepositoryError> {
        let inner = self.inner.read();
        Ok(inner.offline_sessions.get(&key(user_id, connector_id)).cloned())
    }

    #[tracing::instrument(
        name = "memory.offline_session.add",
        skip_all,
        fields(user.id = %session.user_id, connector.id = %session.connector_id),
    )]
    async fn add(&mut self, session: OfflineSession) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write();
        let key = key(&session.user_id, &session.connector_id);
        if inner.offline_sessions.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists);
        }

        inner.offline_sessions.insert(key, session);
        Ok(())
    }

    #[tracing::instrument(
        name = "memory.offline_session.update",
        skip_all,
        fields(user.id = user_id, connector.id = connector_id),
    )]
    async fn update(
        &mut self,
        user_id: &str,
        connector_id: &str,
        updater: OfflineSessionUpdater<'_>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write();
        let key = key(user_id, connector_id);
        let old = inner
            .offline_sessions
            .get(&key)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;

        let new = updater(old)?;
        inner.offline_sessions.insert(key, new);
        Ok(())
    }
}
