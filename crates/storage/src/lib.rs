// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Interactions with the storage backend
//!
//! This crate defines the repository traits a storage backend has to
//! implement for the token endpoint to run against it. Repositories are
//! grouped by the record they manage and are reached through the
//! [`RepositoryAccess`] trait, so handlers never care which backend is behind
//! it.
//!
//! Lookups return `Ok(None)` when a record does not exist, because "not
//! found" is usually handled differently from a backend failure. Mutations of
//! existing records go through compare-and-update: the caller hands the
//! repository an updater callback, and the repository invokes it with the
//! freshest persisted value, re-reading and retrying on write conflicts until
//! the updater either returns the next value or aborts with an
//! [`UpdateAbort`]. The refresh-token rotation logic depends on the updater
//! observing the latest state, so backends must not replace this with a
//! plain read-modify-write.
//!
//! This crate also defines a [`Clock`] trait used to abstract the way the
//! current time is retrieved, with a [`SystemClock`] for production use and a
//! [`MockClock`] for tests.
//!
//! [`MockClock`]: crate::clock::MockClock

#![deny(missing_docs)]

pub mod clock;
pub mod offline_session;
pub(crate) mod repository;
pub mod refresh_token;

use rand::{Rng, RngCore, distributions::Alphanumeric};

pub use self::{
    clock::{Clock, SystemClock},
    offline_session::{OfflineSessionRepository, OfflineSessionUpdater},
    refresh_token::{RefreshTokenRepository, RefreshTokenUpdater},
    repository::{RepositoryAccess, RepositoryError, UpdateAbort},
};

/// Mint an unguessable identifier or token secret.
///
/// The output is 30 alphanumeric characters, drawn from the injected random
/// number generator so tests stay deterministic.
pub fn new_secret_id(rng: &mut (impl RngCore + ?Sized)) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(30)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use super::*;

    #[test]
    fn test_new_secret_id() {
        let mut rng = ChaChaRng::seed_from_u64(42);

        let ids: HashSet<String> = (0..100).map(|_| new_secret_id(&mut rng)).collect();
        assert_eq!(ids.len(), 100, "identifiers are unique");
        for id in &ids {
            assert_eq!(id.len(), 30);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
