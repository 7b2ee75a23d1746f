// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! [OAuth 2.0] and [OpenID Connect] types for the parts of the protocol this
//! server speaks.
//!
//! [OAuth 2.0]: https://oauth.net/2/
//! [OpenID Connect]: https://openid.net/connect/

#![deny(missing_docs)]

pub mod errors;
pub mod requests;
