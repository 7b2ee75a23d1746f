// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use crate::RefreshTokenPolicy;

/// Random site configuration we want accessible in various places.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    /// Lifetime and rotation rules for refresh tokens.
    pub refresh_tokens: RefreshTokenPolicy,

    /// Prefix every group in outgoing identities with `<connector id>:`.
    ///
    /// Applied to minted tokens only; stored claims keep the bare group
    /// names.
    pub connector_groups_prefix: bool,
}
