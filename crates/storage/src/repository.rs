// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use thiserror::Error;

use crate::{OfflineSessionRepository, RefreshTokenRepository};

/// Reasons an updater callback may refuse the freshest persisted value,
/// aborting a compare-and-update.
///
/// An abort is terminal: the repository stops retrying and surfaces the
/// reason to the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpdateAbort {
    /// A concurrent rotation won and the presented secret is no longer
    /// redeemable.
    #[error("refresh token claimed twice")]
    ClaimedTwice,

    /// The offline session no longer references the refresh token being
    /// redeemed.
    #[error("refresh token invalid")]
    SessionSuperseded,
}

/// Error returned by a storage backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The record targeted by an update does not exist.
    #[error("record not found")]
    NotFound,

    /// The record being created already exists.
    #[error("record already exists")]
    AlreadyExists,

    /// An updater refused the freshest persisted value.
    #[error(transparent)]
    Aborted(#[from] UpdateAbort),

    /// The backend itself failed.
    #[error("storage backend failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl RepositoryError {
    /// Construct a [`RepositoryError::Backend`] out of any error.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }
}

/// Access the various repositories a storage backend implements.
pub trait RepositoryAccess: Send {
    /// Get a [`RefreshTokenRepository`]
    fn refresh_token<'c>(&'c mut self) -> Box<dyn RefreshTokenRepository + 'c>;

    /// Get an [`OfflineSessionRepository`]
    fn offline_session<'c>(&'c mut self) -> Box<dyn OfflineSessionRepository + 'c>;
}
