// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Request handlers of the Palisade identity provider.
//!
//! HTTP routing, client authentication and grant-type dispatch live with the
//! server; handlers here receive an already-authenticated
//! [`Client`](palisade_data_model::Client) and the parsed request form.

pub mod oauth2;

/// Implement `From<E>` for the calling module's `RouteError`, converting into
/// its `Internal` variant.
macro_rules! impl_from_error_for_route {
    ($error:ty) => {
        impl From<$error> for self::RouteError {
            fn from(e: $error) -> Self {
                Self::Internal(Box::new(e))
            }
        }
    };
}

pub(crate) use impl_from_error_for_route;
