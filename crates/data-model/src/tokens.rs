// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Claims;

/// What the client holds: the opaque `refresh_token` string, decoded.
///
/// The serialized form is two base64url segments joined by a dot. The codec
/// neither authenticates nor encrypts; storage holds the authoritative
/// secret, the handle only names it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshTokenHandle {
    /// Identifier of the stored refresh token this handle redeems.
    pub refresh_id: String,

    /// The secret to compare against the stored record.
    pub token_secret: String,
}

impl RefreshTokenHandle {
    #[must_use]
    pub fn new(refresh_id: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            refresh_id: refresh_id.into(),
            token_secret: token_secret.into(),
        }
    }

    /// Serialize the handle to the opaque string shipped to clients.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}.{}",
            Base64UrlUnpadded::encode_string(self.refresh_id.as_bytes()),
            Base64UrlUnpadded::encode_string(self.token_secret.as_bytes()),
        )
    }

    /// Decode an opaque `refresh_token` string.
    ///
    /// Values that don't parse are treated as a bare refresh token ID with an
    /// empty secret, for backward compatibility with tokens minted before
    /// secrets existed. Such handles still go through the full secret
    /// comparison and will be rejected there.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        if let Some((id, secret)) = raw.split_once('.') {
            let id = Base64UrlUnpadded::decode_vec(id)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            let secret = Base64UrlUnpadded::decode_vec(secret)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());

            if let (Some(refresh_id), Some(token_secret)) = (id, secret) {
                return Self {
                    refresh_id,
                    token_secret,
                };
            }
        }

        Self {
            refresh_id: raw.to_owned(),
            token_secret: String::new(),
        }
    }
}

/// A refresh grant as persisted by the storage backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRefreshToken {
    /// Stable identifier; [`RefreshTokenHandle::refresh_id`] refers to it.
    pub id: String,

    /// The client this token is bound to. Never changes.
    pub client_id: String,

    /// Current secret.
    pub token: String,

    /// Previous secret, populated on rotation. Redeemable only while the
    /// reuse window is open.
    pub obsolete_token: String,

    /// Issuance time of the grant; drives absolute expiry. Never changes.
    pub created_at: DateTime<Utc>,

    /// Last successful use; drives idle expiry and the reuse window.
    pub last_used: DateTime<Utc>,

    /// Last identity snapshot reported by the connector.
    pub claims: Claims,

    /// The upstream connector this grant authenticates against. Never
    /// changes.
    pub connector_id: String,

    /// Legacy location for connector state; migrated to the offline session
    /// and emptied on the next rotation.
    pub connector_data: Vec<u8>,

    /// Scopes from the original authorization.
    pub scopes: Vec<String>,

    /// Nonce from the original authorization, echoed into minted ID tokens.
    pub nonce: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_round_trip() {
        let handle = RefreshTokenHandle::new("cbpzzjnvsdd2h5rvi3rmnuto2", "secret-value");
        let encoded = handle.encode();
        assert_eq!(RefreshTokenHandle::decode(&encoded), handle);
    }

    #[test]
    fn test_handle_round_trip_empty_secret() {
        let handle = RefreshTokenHandle::new("some-id", "");
        assert_eq!(RefreshTokenHandle::decode(&handle.encode()), handle);
    }

    #[test]
    fn test_legacy_bare_id() {
        // Tokens minted by old deployments are a raw ID, not two segments
        let handle = RefreshTokenHandle::decode("cbpzzjnvsdd2h5rvi3rmnuto2");
        assert_eq!(handle.refresh_id, "cbpzzjnvsdd2h5rvi3rmnuto2");
        assert_eq!(handle.token_secret, "");
    }

    #[test]
    fn test_garbage_segments_fall_back_to_legacy() {
        // Contains a dot but the segments aren't valid base64url
        let raw = "not!valid.base#64";
        let handle = RefreshTokenHandle::decode(raw);
        assert_eq!(handle.refresh_id, raw);
        assert_eq!(handle.token_secret, "");
    }
}
