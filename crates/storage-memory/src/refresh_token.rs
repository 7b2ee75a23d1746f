// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use async_trait::async_trait;
use palisade_data_model::StoredRefreshToken;
use palisade_storage::{
    RefreshTokenRepository, RefreshTokenUpdater, RepositoryError,
};
use parking_lot::RwLock;

use crate::Inner;

/// An implementation of [`RefreshTokenRepository`] over the in-memory store.
pub(crate) struct MemoryRefreshTokenRepository {
    pub(crate) inner: Arc<RwLock<Inner>>,
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    #[tracing::instrument(
        name = "memory.refresh_token.lookup",
        skip_all,
        fields(refresh_token.id = id),
    )]
    async fn lookup(&mut self, id: &str) -> Result<Option<StoredRefreshToken>, RepositoryError> {
        Ok(self.inner.read().refresh_tokens.get(id).cloned())
    }

    #[tracing::instrument(
        name = "memory.refresh_token.add",
        skip_all,
        fields(refresh_token.id = %token.id),
    )]
    async fn add(&mut self, token: StoredRefreshToken) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write();
        if inner.refresh_tokens.contains_key(&token.id) {
            return Err(RepositoryError::AlreadyExists);
        }

        inner.refresh_tokens.insert(token.id.clone(), token);
        Ok(())
    }

    #[tracing::instrument(
        name = "memory.refresh_token.update",
        skip_all,
        fields(refresh_token.id = id),
    )]
    async fn update(
        &mut self,
        id: &str,
        updater: RefreshTokenUpdater<'_>,
    ) -> Result<(), RepositoryError> {
        // The write lock is held for the whole read-update-write cycle, so
        // the updater sees the freshest value and never needs a retry
        let mut inner = self.inner.write();
        let old = inner
            .refresh_tokens
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;

        let new = updater(old)?;
        inner.refresh_tokens.insert(id.to_owned(), new);
        Ok(())
    }
}
