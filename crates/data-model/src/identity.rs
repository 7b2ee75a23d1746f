// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

/// The identity snapshot persisted alongside a refresh grant.
///
/// This is the last identity a connector reported for the user, and is what
/// token minting falls back to when the upstream cannot be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Stable subject identifier, scoped to the connector.
    pub user_id: String,

    pub username: String,

    pub preferred_username: String,

    pub email: String,

    pub email_verified: bool,

    pub groups: Vec<String>,
}

/// An identity as produced by an upstream connector.
///
/// Unlike [`Claims`], this also carries the connector's opaque state blob,
/// which the connector needs back on the next refresh (upstream refresh
/// tokens, session cookies, and the like).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub preferred_username: String,
    pub email: String,
    pub email_verified: bool,
    pub groups: Vec<String>,

    /// Opaque connector-side state, round-tripped through storage.
    pub connector_data: Vec<u8>,
}

impl Identity {
    /// Seed an identity from a stored claims snapshot and connector state.
    #[must_use]
    pub fn from_claims(claims: Claims, connector_data: Vec<u8>) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            preferred_username: claims.preferred_username,
            email: claims.email,
            email_verified: claims.email_verified,
            groups: claims.groups,
            connector_data,
        }
    }

    /// The claims view of this identity, as handed to token minting.
    #[must_use]
    pub fn claims(&self) -> Claims {
        Claims {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            preferred_username: self.preferred_username.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
            groups: self.groups.clone(),
        }
    }
}
