// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Repository of [`StoredRefreshToken`] records.

use async_trait::async_trait;
use palisade_data_model::StoredRefreshToken;

use crate::{RepositoryError, UpdateAbort};

/// Updater callback invoked by [`RefreshTokenRepository::update`] with the
/// freshest persisted record.
///
/// The callback may be invoked more than once if the backend detects a write
/// conflict; it must not assume the value it saw on a previous invocation.
pub type RefreshTokenUpdater<'a> =
    &'a mut (dyn FnMut(StoredRefreshToken) -> Result<StoredRefreshToken, UpdateAbort> + Send);

/// A [`RefreshTokenRepository`] helps interacting with [`StoredRefreshToken`]
/// records saved in the storage backend.
#[async_trait]
pub trait RefreshTokenRepository: Send {
    /// Lookup a refresh token by its ID
    ///
    /// Returns `None` if no [`StoredRefreshToken`] was found
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the underlying repository fails
    async fn lookup(&mut self, id: &str) -> Result<Option<StoredRefreshToken>, RepositoryError>;

    /// Add a new refresh token to the store
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::AlreadyExists`] if a token with this ID is
    /// already stored, or [`RepositoryError`] if the underlying repository
    /// fails
    async fn add(&mut self, token: StoredRefreshToken) -> Result<(), RepositoryError>;

    /// Atomically update the refresh token with the given ID
    ///
    /// The updater is invoked with the freshest persisted value and either
    /// returns the value to persist or aborts. On write conflict the backend
    /// re-reads and invokes the updater again.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no token with this ID exists,
    /// [`RepositoryError::Aborted`] if the updater aborted, or
    /// [`RepositoryError`] if the underlying repository fails
    async fn update(
        &mut self,
        id: &str,
        updater: RefreshTokenUpdater<'_>,
    ) -> Result<(), RepositoryError>;
}
