// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::{DateTime, Utc};
use palisade_data_model::{Claims, Client};

pub mod refresh;

/// Mints the access and ID tokens returned by the token endpoint.
///
/// Key management and JWT assembly are the minter's business; the token
/// endpoint only sequences the calls and never persists what they return.
pub trait TokenMinter: Send + Sync {
    /// Mint an access token for the given client and claims.
    ///
    /// # Errors
    ///
    /// Returns an error when signing fails; the caller maps this to a server
    /// error without touching stored state.
    fn mint_access_token(
        &self,
        client: &Client,
        claims: &Claims,
        scopes: &[String],
        nonce: &str,
        connector_id: &str,
    ) -> Result<String, anyhow::Error>;

    /// Mint an ID token and return it along with its expiry.
    ///
    /// `code` is the authorization code being exchanged, when there is one;
    /// the refresh flow passes an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error when signing fails; the caller maps this to a server
    /// error without touching stored state.
    #[allow(clippy::too_many_arguments)]
    fn mint_id_token(
        &self,
        client: &Client,
        claims: &Claims,
        scopes: &[String],
        nonce: &str,
        access_token: &str,
        code: &str,
        connector_id: &str,
    ) -> Result<(String, DateTime<Utc>), anyhow::Error>;
}
