// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Repository of [`OfflineSession`] records, keyed by (user, connector).

use async_trait::async_trait;
use palisade_data_model::OfflineSession;

use crate::{RepositoryError, UpdateAbort};

/// Updater callback invoked by [`OfflineSessionRepository::update`] with the
/// freshest persisted record.
pub type OfflineSessionUpdater<'a> =
    &'a mut (dyn FnMut(OfflineSession) -> Result<OfflineSession, UpdateAbort> + Send);

/// An [`OfflineSessionRepository`] helps interacting with [`OfflineSession`]
/// records saved in the storage backend.
#[async_trait]
pub trait OfflineSessionRepository: Send {
    /// Lookup the offline session of a (user, connector) pair
    ///
    /// Returns `None` if no [`OfflineSession`] was found
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the underlying repository fails
    async fn lookup(
        &mut self,
        user_id: &str,
        connector_id: &str,
    ) -> Result<Option<OfflineSession>, RepositoryError>;

    /// Add a new offline session to the store
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::AlreadyExists`] if the (user, connector)
    /// pair already has a session, or [`RepositoryError`] if the underlying
    /// repository fails
    async fn add(&mut self, session: OfflineSession) -> Result<(), RepositoryError>;

    /// Atomically update the offline session of a (user, connector) pair
    ///
    /// Same contract as [`RefreshTokenRepository::update`]: the updater sees
    /// the freshest value and is re-invoked on conflict.
    ///
    /// [`RefreshTokenRepository::update`]: crate::RefreshTokenRepository::update
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the pair has no session,
    /// [`RepositoryError::Aborted`] if the updater aborted, or
    /// [`RepositoryError`] if the underlying repository fails
    async fn update(
        &mut self,
        user_id: &str,
        connector_id: &str,
        updater: OfflineSessionUpdater<'_>,
    ) -> Result<(), RepositoryError>;
}
