// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::Duration;
use palisade_data_model::{RefreshTokenPolicy, SiteConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const fn default_rotation_enabled() -> bool {
    true
}

/// Absurdly large values saturate instead of panicking in [`Duration`].
fn seconds(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// Configuration of refresh token lifetimes and rotation
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RefreshTokenConfig {
    /// Rotate the refresh token on every successful refresh. On by default.
    #[serde(default = "default_rotation_enabled")]
    pub rotation_enabled: bool,

    /// Grace window in seconds during which the previous token remains
    /// redeemable after a rotation, so clients that retried a refresh in
    /// flight don't get logged out. Zero (the default) disables reuse.
    #[serde(default)]
    pub reuse_interval: u64,

    /// Hard cap in seconds counted from when the grant was issued.
    /// Zero (the default) means tokens never expire outright.
    #[serde(default)]
    pub absolute_lifetime: u64,

    /// Seconds a token may sit unused before it expires.
    /// Zero (the default) means unused tokens are kept forever.
    #[serde(default)]
    pub valid_if_not_used_for: u64,

    /// Prefix every group in minted tokens with `<connector id>:`, for
    /// installations shared between organizations. Stored claims keep the
    /// bare group names.
    #[serde(default)]
    pub connector_groups_prefix: bool,
}

impl Default for RefreshTokenConfig {
    fn default() -> Self {
        Self {
            rotation_enabled: default_rotation_enabled(),
            reuse_interval: 0,
            absolute_lifetime: 0,
            valid_if_not_used_for: 0,
            connector_groups_prefix: false,
        }
    }
}

impl RefreshTokenConfig {
    /// Returns true if the configuration is the default one
    #[must_use]
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }

    /// Lower this section into the policy consumed by the token endpoint.
    #[must_use]
    pub fn policy(&self) -> RefreshTokenPolicy {
        RefreshTokenPolicy::new(
            self.rotation_enabled,
            seconds(self.reuse_interval),
            seconds(self.absolute_lifetime),
            seconds(self.valid_if_not_used_for),
        )
    }

    /// Build the site configuration consumed by the token endpoint.
    #[must_use]
    pub fn site_config(&self) -> SiteConfig {
        SiteConfig {
            refresh_tokens: self.policy(),
            connector_groups_prefix: self.connector_groups_prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: RefreshTokenConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(config.rotation_enabled);
        assert_eq!(config.reuse_interval, 0);
        assert_eq!(config.absolute_lifetime, 0);
        assert_eq!(config.valid_if_not_used_for, 0);
        assert!(!config.connector_groups_prefix);
        assert!(config.is_default());
    }

    #[test]
    fn test_policy_lowering() {
        let config: RefreshTokenConfig = serde_json::from_value(serde_json::json!({
            "rotation_enabled": true,
            "reuse_interval": 30,
            "absolute_lifetime": 3600,
        }))
        .unwrap();
        let policy = config.policy();

        let issued = chrono::DateTime::UNIX_EPOCH;
        assert!(policy.rotation_enabled());
        assert!(policy.allowed_to_reuse(issued, issued + Duration::seconds(30)));
        assert!(!policy.allowed_to_reuse(issued, issued + Duration::seconds(31)));
        assert!(policy.completely_expired(issued, issued + Duration::seconds(3601)));
        // No idle cap was configured
        assert!(!policy.expired_because_unused(issued, issued + Duration::days(365)));
    }
}
