// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

#![allow(clippy::module_name_repetitions)]

pub(crate) mod client;
pub(crate) mod identity;
pub(crate) mod offline_session;
pub(crate) mod policy;
mod site_config;
pub(crate) mod tokens;

pub use self::{
    client::Client,
    identity::{Claims, Identity},
    offline_session::{OfflineSession, RefreshTokenRef},
    policy::RefreshTokenPolicy,
    site_config::SiteConfig,
    tokens::{RefreshTokenHandle, StoredRefreshToken},
};
