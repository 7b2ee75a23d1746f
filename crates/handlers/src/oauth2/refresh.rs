// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! `grant_type=refresh_token` handling for the token endpoint, per
//! [RFC 6749 §6].
//!
//! A refresh request goes through a strict pipeline: decode the opaque
//! handle, validate it against the stored record, reconcile the requested
//! scopes, refresh the identity against the upstream connector, mint the
//! access and ID tokens, and only then rotate the stored secret. A failure at
//! any stage stops the pipeline before anything is persisted, so the client's
//! existing refresh token keeps working.
//!
//! Rotation itself goes through the storage layer's compare-and-update, which
//! is what resolves concurrent redemptions of the same handle: exactly one
//! request promotes the secret, and a losing request either adopts the
//! winner's secret (when the reuse window is still open and it presented the
//! previous secret) or is rejected as a double-use.
//!
//! [RFC 6749 §6]: https://datatracker.ietf.org/doc/html/rfc6749#section-6

use axum::{Json, response::IntoResponse};
use chrono::{DateTime, Utc};
use headers::{CacheControl, HeaderMap, HeaderMapExt, Pragma};
use hyper::StatusCode;
use oauth2_types::{
    errors::{ClientError, ClientErrorCode},
    requests::{AccessTokenResponse, RefreshTokenGrant},
};
use palisade_connectors::ConnectorRegistry;
use palisade_data_model::{
    Client, Identity, OfflineSession, RefreshTokenHandle, RefreshTokenPolicy, SiteConfig,
    StoredRefreshToken,
};
use palisade_storage::{
    Clock, RepositoryAccess, RepositoryError, UpdateAbort, new_secret_id,
};
use rand::RngCore;
use thiserror::Error;
use tracing::{debug, warn};

use super::TokenMinter;
use crate::impl_from_error_for_route;

/// Returned for unknown IDs, cross-client claims and double-use alike, so a
/// probing client can't tell which one it hit.
const INVALID_TOKEN_DESCRIPTION: &str =
    "Refresh token is invalid or has already been claimed by another client.";

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("no refresh token found in request")]
    MissingRefreshToken,

    #[error("refresh token {0:?} not found")]
    RefreshTokenNotFound(String),

    #[error("client {actual:?} tried to claim a refresh token bound to client {expected:?}")]
    ClientMismatch { expected: String, actual: String },

    #[error("refresh token {0:?} claimed twice")]
    ClaimedTwice(String),

    #[error("refresh token {0:?} expired")]
    Expired(String),

    #[error("refresh token {0:?} expired due to inactivity")]
    ExpiredBecauseUnused(String),

    #[error("requested scopes contain unauthorized scope(s) {0:?}")]
    UnauthorizedScopes(Vec<String>),

    #[error("connector {0:?} not found")]
    ConnectorNotFound(String),

    #[error("failed to refresh identity with connector {connector_id:?}")]
    ConnectorRefreshFailed {
        connector_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to mint tokens")]
    MintingFailed(#[source] anyhow::Error),

    #[error("offline session superseded refresh token {0:?}")]
    SessionSuperseded(String),
}

impl_from_error_for_route!(RepositoryError);

impl RouteError {
    fn status_and_error(&self) -> (StatusCode, ClientError) {
        match self {
            Self::Internal(_)
            | Self::ConnectorNotFound(_)
            | Self::ConnectorRefreshFailed { .. }
            | Self::MintingFailed(_)
            | Self::SessionSuperseded(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::from(ClientErrorCode::ServerError),
            ),

            Self::MissingRefreshToken => (
                StatusCode::BAD_REQUEST,
                ClientError::new(
                    ClientErrorCode::InvalidRequest,
                    "No refresh token found in request.",
                ),
            ),

            Self::RefreshTokenNotFound(_) | Self::ClaimedTwice(_) => (
                StatusCode::BAD_REQUEST,
                ClientError::new(ClientErrorCode::InvalidRequest, INVALID_TOKEN_DESCRIPTION),
            ),

            // A token claimed by another client gets the same description as
            // an unknown one, but RFC 6749 §5.2 wants invalid_grant here
            Self::ClientMismatch { .. } => (
                StatusCode::BAD_REQUEST,
                ClientError::new(ClientErrorCode::InvalidGrant, INVALID_TOKEN_DESCRIPTION),
            ),

            Self::Expired(_) | Self::ExpiredBecauseUnused(_) => (
                StatusCode::BAD_REQUEST,
                ClientError::new(ClientErrorCode::InvalidRequest, "Refresh token expired."),
            ),

            Self::UnauthorizedScopes(scopes) => (
                StatusCode::BAD_REQUEST,
                ClientError::from(ClientErrorCode::InvalidRequest).with_description(format!(
                    "Requested scopes contain unauthorized scope(s): {scopes:?}."
                )),
            ),
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = self.status_and_error();
        if status.is_server_error() {
            tracing::error!(error = %self, "refresh token grant failed");
        }

        (status, Json(error)).into_response()
    }
}

/// Serialize a successful token response, with the no-cache headers required
/// by RFC 6749.
#[must_use]
pub fn token_response(response: AccessTokenResponse) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    headers.typed_insert(CacheControl::new().with_no_store());
    headers.typed_insert(Pragma::no_cache());

    (headers, Json(response)).into_response()
}

/// Handle a `grant_type=refresh_token` token request for an
/// already-authenticated client.
///
/// On success the stored refresh token has been rotated and the returned
/// response carries the new handle; on error nothing has been persisted,
/// except when the offline session turned out to be superseded after the
/// rotation already went through (see [`RouteError::SessionSuperseded`]).
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(
    name = "handlers.oauth2.refresh",
    skip_all,
    fields(client.id = %client.id),
)]
pub async fn refresh_token_grant(
    rng: &mut (dyn RngCore + Send),
    clock: &impl Clock,
    grant: &RefreshTokenGrant,
    client: &Client,
    site_config: &SiteConfig,
    repo: &mut impl RepositoryAccess,
    connectors: &ConnectorRegistry,
    minter: &dyn TokenMinter,
) -> Result<AccessTokenResponse, RouteError> {
    let policy = &site_config.refresh_tokens;
    let handle = extract_refresh_token(grant)?;

    let stored = validate_refresh_token(repo, policy, clock.now(), client, &handle).await?;

    let scopes = resolve_scopes(grant.scope.as_deref(), &stored)?;

    let identity =
        refresh_identity(repo, connectors, policy, clock.now(), &handle, &stored, &scopes).await?;

    // The groups prefix applies to minted tokens only; the identity persisted
    // by the rotator below keeps the bare group names
    let mut minted = identity.clone();
    if site_config.connector_groups_prefix {
        minted.groups = minted
            .groups
            .iter()
            .map(|group| format!("{}:{group}", stored.connector_id))
            .collect();
    }
    let claims = minted.claims();

    let access_token = minter
        .mint_access_token(client, &claims, &scopes, &stored.nonce, &stored.connector_id)
        .map_err(RouteError::MintingFailed)?;

    let (id_token, expiry) = minter
        .mint_id_token(
            client,
            &claims,
            &scopes,
            &stored.nonce,
            &access_token,
            "",
            &stored.connector_id,
        )
        .map_err(RouteError::MintingFailed)?;

    let new_handle =
        rotate_refresh_token(rng, clock, policy, repo, &handle, &stored, &identity).await?;

    Ok(AccessTokenResponse::new(access_token)
        .with_id_token(id_token)
        .with_refresh_token(new_handle.encode())
        .with_expires_in(expiry - clock.now()))
}

fn extract_refresh_token(grant: &RefreshTokenGrant) -> Result<RefreshTokenHandle, RouteError> {
    let raw = grant
        .refresh_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or(RouteError::MissingRefreshToken)?;

    Ok(RefreshTokenHandle::decode(raw))
}

/// Check that the presented handle matches a live stored refresh token owned
/// by this client. Read-only; storage is left untouched whatever the outcome.
async fn validate_refresh_token(
    repo: &mut impl RepositoryAccess,
    policy: &RefreshTokenPolicy,
    now: DateTime<Utc>,
    client: &Client,
    handle: &RefreshTokenHandle,
) -> Result<StoredRefreshToken, RouteError> {
    let stored = repo
        .refresh_token()
        .lookup(&handle.refresh_id)
        .await?
        .ok_or_else(|| {
            warn!(
                refresh_token.id = %handle.refresh_id,
                "refresh token not found"
            );
            RouteError::RefreshTokenNotFound(handle.refresh_id.clone())
        })?;

    if stored.client_id != client.id {
        warn!(
            refresh_token.id = %stored.id,
            refresh_token.client_id = %stored.client_id,
            "client tried to claim a refresh token bound to another client"
        );
        return Err(RouteError::ClientMismatch {
            expected: stored.client_id,
            actual: client.id.clone(),
        });
    }

    if stored.token != handle.token_secret {
        // The previous secret is still redeemable for a short while after a
        // rotation, so a client that retried a refresh in flight does not
        // get logged out. Everything else is a double-use.
        let reusable = policy.allowed_to_reuse(stored.last_used, now)
            && stored.obsolete_token == handle.token_secret
            && !stored.obsolete_token.is_empty();

        if !reusable {
            warn!(refresh_token.id = %stored.id, "refresh token claimed twice");
            return Err(RouteError::ClaimedTwice(stored.id));
        }
    }

    if policy.completely_expired(stored.created_at, now) {
        debug!(refresh_token.id = %stored.id, "refresh token expired");
        return Err(RouteError::Expired(stored.id));
    }

    if policy.expired_because_unused(stored.last_used, now) {
        debug!(
            refresh_token.id = %stored.id,
            "refresh token expired due to inactivity"
        );
        return Err(RouteError::ExpiredBecauseUnused(stored.id));
    }

    Ok(stored)
}

/// Narrow the requested scopes against the originally authorized ones.
///
/// A request without a `scope` parameter gets the original scopes, per RFC
/// 6749 §6. Duplicates in the request are preserved as presented.
fn resolve_scopes(
    requested: Option<&str>,
    stored: &StoredRefreshToken,
) -> Result<Vec<String>, RouteError> {
    let Some(scope) = requested.filter(|scope| !scope.is_empty()) else {
        return Ok(stored.scopes.clone());
    };

    let requested: Vec<String> = scope.split_whitespace().map(ToOwned::to_owned).collect();

    let unauthorized: Vec<String> = requested
        .iter()
        .filter(|scope| !stored.scopes.contains(scope))
        .cloned()
        .collect();

    if !unauthorized.is_empty() {
        debug!(
            refresh_token.id = %stored.id,
            ?unauthorized,
            "rejecting request for scopes outside the original authorization"
        );
        return Err(RouteError::UnauthorizedScopes(unauthorized));
    }

    Ok(requested)
}

/// Produce the identity to mint tokens from, consulting the upstream
/// connector when it is able to refresh identities.
async fn refresh_identity(
    repo: &mut impl RepositoryAccess,
    connectors: &ConnectorRegistry,
    policy: &RefreshTokenPolicy,
    now: DateTime<Utc>,
    handle: &RefreshTokenHandle,
    stored: &StoredRefreshToken,
    scopes: &[String],
) -> Result<Identity, RouteError> {
    // Older records stored the connector state on the refresh token itself;
    // it moved to the offline session since. Prefer the record-level value
    // when it is still around: the rotator clears it on the next rotation.
    let connector_data = match repo
        .offline_session()
        .lookup(&stored.claims.user_id, &stored.connector_id)
        .await
    {
        Ok(Some(session)) => {
            if stored.connector_data.is_empty() {
                session.connector_data
            } else {
                stored.connector_data.clone()
            }
        }
        // Tokens from before offline sessions existed don't have one
        Ok(None) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let connector = connectors.get(&stored.connector_id).ok_or_else(|| {
        warn!(
            refresh_token.id = %stored.id,
            connector.id = %stored.connector_id,
            "connector not found"
        );
        RouteError::ConnectorNotFound(stored.connector_id.clone())
    })?;

    let identity = Identity::from_claims(stored.claims.clone(), connector_data);

    // A client retrying with the previous secret already got this identity
    // refreshed by whoever won the rotation; don't bother the upstream again
    if policy.allowed_to_reuse(stored.last_used, now)
        && handle.token_secret == stored.obsolete_token
    {
        return Ok(identity);
    }

    let Some(refresh_connector) = connector.refresh_connector() else {
        return Ok(identity);
    };

    refresh_connector
        .refresh(scopes, identity)
        .await
        .map_err(|source| RouteError::ConnectorRefreshFailed {
            connector_id: stored.connector_id.clone(),
            source,
        })
}

/// Rotate the stored secret and propagate the refreshed identity to the
/// refresh token record and the offline session.
///
/// Both writes go through compare-and-update. The refresh-token updater is
/// where concurrent redemptions are resolved: it sees the freshest record,
/// and a mismatch there means another request rotated first.
async fn rotate_refresh_token(
    rng: &mut (dyn RngCore + Send),
    clock: &impl Clock,
    policy: &RefreshTokenPolicy,
    repo: &mut impl RepositoryAccess,
    handle: &RefreshTokenHandle,
    stored: &StoredRefreshToken,
    identity: &Identity,
) -> Result<RefreshTokenHandle, RouteError> {
    let mut new_secret = if policy.rotation_enabled() {
        new_secret_id(rng)
    } else {
        handle.token_secret.clone()
    };
    let mut last_used = clock.now();

    let mut updater = |mut old: StoredRefreshToken| -> Result<StoredRefreshToken, UpdateAbort> {
        if policy.rotation_enabled() {
            if old.token != handle.token_secret {
                if policy.allowed_to_reuse(old.last_used, clock.now())
                    && old.obsolete_token == handle.token_secret
                {
                    // A concurrent rotation won; adopt its secret and leave
                    // the record alone, so the retrying client ends up with
                    // the same token as the winner
                    new_secret = old.token.clone();
                    last_used = old.last_used;
                    return Ok(old);
                }

                return Err(UpdateAbort::ClaimedTwice);
            }

            old.obsolete_token = old.token;
        }

        old.token = new_secret.clone();
        // The subject identifier is stable: a connector reporting a new
        // user_id does not rebind the stored grant
        old.claims.username = identity.username.clone();
        old.claims.preferred_username = identity.preferred_username.clone();
        old.claims.email = identity.email.clone();
        old.claims.email_verified = identity.email_verified;
        old.claims.groups = identity.groups.clone();
        old.last_used = last_used;

        // Connector state now lives on the offline session
        old.connector_data = Vec::new();
        Ok(old)
    };

    repo.refresh_token()
        .update(&stored.id, &mut updater)
        .await
        .map_err(|e| match e {
            RepositoryError::Aborted(UpdateAbort::ClaimedTwice) => {
                warn!(refresh_token.id = %stored.id, "refresh token claimed twice");
                RouteError::ClaimedTwice(stored.id.clone())
            }
            other => RouteError::Internal(Box::new(other)),
        })?;

    update_offline_session(repo, stored, identity, last_used).await?;

    Ok(RefreshTokenHandle::new(stored.id.clone(), new_secret))
}

/// Propagate the last-used timestamp and the fresh connector state to the
/// user's offline session.
///
/// This runs after the refresh-token update succeeded; the session `id` check
/// catches a session superseded between validation and now. On the
/// reuse-retry path `last_used` is the winning rotation's timestamp, so the
/// session is effectively untouched.
async fn update_offline_session(
    repo: &mut impl RepositoryAccess,
    stored: &StoredRefreshToken,
    identity: &Identity,
    last_used: DateTime<Utc>,
) -> Result<(), RouteError> {
    let mut updater = |mut old: OfflineSession| {
        match old.refresh.get_mut(&stored.client_id) {
            Some(token_ref) if token_ref.id == stored.id => {
                token_ref.last_used = last_used;
                old.connector_data = identity.connector_data.clone();
                Ok(old)
            }
            _ => Err(UpdateAbort::SessionSuperseded),
        }
    };

    repo.offline_session()
        .update(&stored.claims.user_id, &stored.connector_id, &mut updater)
        .await
        .map_err(|e| match e {
            RepositoryError::Aborted(UpdateAbort::SessionSuperseded) => {
                warn!(
                    refresh_token.id = %stored.id,
                    user.id = %stored.claims.user_id,
                    "offline session no longer references this refresh token"
                );
                RouteError::SessionSuperseded(stored.id.clone())
            }
            other => RouteError::Internal(Box::new(other)),
        })
}
