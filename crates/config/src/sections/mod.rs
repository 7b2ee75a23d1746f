// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

mod refresh_tokens;

pub use self::refresh_tokens::RefreshTokenConfig;
