// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::{DateTime, Duration, Utc};

/// Lifetime and rotation rules for refresh tokens.
///
/// All predicates are pure functions of the stored timestamps and the caller's
/// `now`, so behavior under a mocked clock is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenPolicy {
    rotation_enabled: bool,

    /// Grace window after a rotation during which the previous secret is
    /// still redeemable. Zero disables reuse entirely.
    reuse_interval: Duration,

    /// Hard cap counted from issuance. Zero means unlimited.
    absolute_lifetime: Duration,

    /// Idle cap counted from the last successful use. Zero means unlimited.
    valid_if_not_used_for: Duration,
}

impl Default for RefreshTokenPolicy {
    fn default() -> Self {
        Self {
            rotation_enabled: true,
            reuse_interval: Duration::zero(),
            absolute_lifetime: Duration::zero(),
            valid_if_not_used_for: Duration::zero(),
        }
    }
}

impl RefreshTokenPolicy {
    #[must_use]
    pub fn new(
        rotation_enabled: bool,
        reuse_interval: Duration,
        absolute_lifetime: Duration,
        valid_if_not_used_for: Duration,
    ) -> Self {
        Self {
            rotation_enabled,
            reuse_interval,
            absolute_lifetime,
            valid_if_not_used_for,
        }
    }

    /// Whether every successful refresh replaces the secret.
    #[must_use]
    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    /// Whether a previous secret may still be redeemed at `now`, given the
    /// time of the rotation that obsoleted it.
    #[must_use]
    pub fn allowed_to_reuse(&self, last_used: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        !self.reuse_interval.is_zero() && now - last_used <= self.reuse_interval
    }

    /// Whether the grant has outlived its absolute lifetime.
    #[must_use]
    pub fn completely_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        !self.absolute_lifetime.is_zero() && now - created_at > self.absolute_lifetime
    }

    /// Whether the grant has sat unused for longer than the idle cap.
    #[must_use]
    pub fn expired_because_unused(&self, last_used: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        !self.valid_if_not_used_for.is_zero() && now - last_used > self.valid_if_not_used_for
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 16, 14, 40, 0).unwrap()
    }

    #[test]
    fn test_reuse_window() {
        let policy = RefreshTokenPolicy::new(
            true,
            Duration::seconds(30),
            Duration::zero(),
            Duration::zero(),
        );
        let last_used = instant();

        assert!(policy.allowed_to_reuse(last_used, last_used + Duration::seconds(10)));
        assert!(policy.allowed_to_reuse(last_used, last_used + Duration::seconds(30)));
        assert!(!policy.allowed_to_reuse(last_used, last_used + Duration::seconds(31)));
    }

    #[test]
    fn test_zero_reuse_window_disables_reuse() {
        let policy = RefreshTokenPolicy::default();
        let last_used = instant();

        assert!(!policy.allowed_to_reuse(last_used, last_used));
        assert!(!policy.allowed_to_reuse(last_used, last_used + Duration::seconds(1)));
    }

    #[test]
    fn test_absolute_expiry() {
        let policy = RefreshTokenPolicy::new(
            true,
            Duration::zero(),
            Duration::days(30),
            Duration::zero(),
        );
        let created_at = instant();

        assert!(!policy.completely_expired(created_at, created_at + Duration::days(30)));
        assert!(policy.completely_expired(created_at, created_at + Duration::days(31)));
    }

    #[test]
    fn test_idle_expiry() {
        let policy = RefreshTokenPolicy::new(
            true,
            Duration::zero(),
            Duration::zero(),
            Duration::hours(12),
        );
        let last_used = instant();

        assert!(!policy.expired_because_unused(last_used, last_used + Duration::hours(12)));
        assert!(policy.expired_because_unused(last_used, last_used + Duration::hours(13)));
    }

    #[test]
    fn test_zero_lifetimes_never_expire() {
        let policy = RefreshTokenPolicy::default();
        let then = instant();

        assert!(!policy.completely_expired(then, then + Duration::days(10_000)));
        assert!(!policy.expired_because_unused(then, then + Duration::days(10_000)));
    }
}
