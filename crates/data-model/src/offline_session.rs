// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a [`StoredRefreshToken`] held by an offline session.
///
/// [`StoredRefreshToken`]: crate::StoredRefreshToken
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRef {
    /// ID of the stored refresh token.
    pub id: String,

    /// Mirror of the token's last successful use.
    pub last_used: DateTime<Utc>,
}

/// Per-(user, connector) record holding live upstream state shared across all
/// of that user's refresh tokens for that connector.
///
/// For every stored refresh token `R`, the session at
/// `(R.claims.user_id, R.connector_id)` must reference `R.id` under
/// `R.client_id`; a token whose session points elsewhere belongs to a
/// superseded session and must be rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineSession {
    /// Subject identifier, scoped to the connector.
    pub user_id: String,

    /// The connector this session tracks upstream state for.
    pub connector_id: String,

    /// One refresh token reference per client.
    pub refresh: HashMap<String, RefreshTokenRef>,

    /// Authoritative connector-side opaque state.
    pub connector_data: Vec<u8>,
}

impl OfflineSession {
    /// Build an empty session for a (user, connector) pair.
    #[must_use]
    pub fn new(user_id: impl Into<String>, connector_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            connector_id: connector_id.into(),
            refresh: HashMap::new(),
            connector_data: Vec::new(),
        }
    }
}
