// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

/// An OAuth 2.0 client known to this installation.
///
/// Client authentication happens before the token endpoint core is reached;
/// handlers receive an already-authenticated [`Client`] record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier
    pub id: String,

    /// Name of the client to be presented to the end-user
    pub name: Option<String>,
}

impl Client {
    /// Build a client record with only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}
