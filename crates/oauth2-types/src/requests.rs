// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Requests and responses of the token endpoint, as defined by
//! [RFC 6749 §6].
//!
//! [RFC 6749 §6]: https://datatracker.ietf.org/doc/html/rfc6749#section-6

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

/// The form body of a `grant_type=refresh_token` token request.
///
/// Dispatch on `grant_type` happens before this type is built; client
/// authentication is resolved by the caller as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenGrant {
    /// The opaque refresh token issued to the client.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Space-separated list of requested scopes. When absent, the scopes of
    /// the original authorization apply.
    #[serde(default)]
    pub scope: Option<String>,
}

/// The JSON body of a successful token response.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// The newly minted access token.
    pub access_token: String,

    /// Always `bearer`.
    pub token_type: String,

    /// The rotated refresh token, when the grant carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// The newly minted ID token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Seconds until the ID token expires.
    #[serde_as(as = "Option<DurationSeconds<i64>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Duration>,
}

impl AccessTokenResponse {
    /// Create a bearer-token response around an access token.
    #[must_use]
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_owned(),
            refresh_token: None,
            id_token: None,
            expires_in: None,
        }
    }

    /// Set the refresh token of this response.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    /// Set the ID token of this response.
    #[must_use]
    pub fn with_id_token(mut self, id_token: String) -> Self {
        self.id_token = Some(id_token);
        self
    }

    /// Set the expiration delay of this response.
    #[must_use]
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serialization() {
        let response = AccessTokenResponse::new("at".to_owned())
            .with_refresh_token("rt".to_owned())
            .with_id_token("idt".to_owned())
            .with_expires_in(Duration::minutes(5));

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "access_token": "at",
                "token_type": "bearer",
                "refresh_token": "rt",
                "id_token": "idt",
                "expires_in": 300,
            })
        );
    }

    #[test]
    fn test_grant_deserialization() {
        let grant: RefreshTokenGrant =
            serde_urlencoded_form("refresh_token=abc&scope=openid%20email");
        assert_eq!(grant.refresh_token.as_deref(), Some("abc"));
        assert_eq!(grant.scope.as_deref(), Some("openid email"));

        let grant: RefreshTokenGrant = serde_urlencoded_form("");
        assert_eq!(grant.refresh_token, None);
        assert_eq!(grant.scope, None);
    }

    fn serde_urlencoded_form(input: &str) -> RefreshTokenGrant {
        // Form bodies and JSON agree on this struct's shape, keeping the
        // test free of an extra dev-dependency
        let mut map = serde_json::Map::new();
        for pair in input.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').unwrap();
            map.insert(
                k.to_owned(),
                serde_json::Value::String(v.replace("%20", " ")),
            );
        }
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }
}
