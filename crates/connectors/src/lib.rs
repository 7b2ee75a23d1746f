// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Interface between the server and upstream identity sources (LDAP, OIDC,
//! SAML, ...).
//!
//! Connectors expose their abilities as a capability set: the base
//! [`Connector`] trait is what every upstream implements, and optional
//! capabilities are discovered through accessor methods. The token endpoint
//! only consults [`RefreshConnector`]; connectors without it simply keep
//! serving the identity recorded at authorization time.

mod mock;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use palisade_data_model::Identity;

pub use self::mock::MockConnector;

/// An upstream identity source.
pub trait Connector: Send + Sync {
    /// The refresh capability, if this connector can re-fetch a user's
    /// identity without the user present.
    fn refresh_connector(&self) -> Option<&dyn RefreshConnector> {
        None
    }
}

/// Capability of a [`Connector`] to refresh a previously obtained identity
/// against the upstream.
#[async_trait]
pub trait RefreshConnector: Send + Sync {
    /// Re-fetch the identity from the upstream.
    ///
    /// `identity` is the last known identity, including the connector's own
    /// opaque state from the previous refresh. The returned identity wholly
    /// replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error when the upstream cannot be reached or refuses the
    /// refresh; the caller maps this to a server error.
    async fn refresh(&self, scopes: &[String], identity: Identity) -> Result<Identity, anyhow::Error>;
}

/// Resolves connector IDs to live connectors.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under the given ID, replacing any existing one.
    pub fn insert(&mut self, id: impl Into<String>, connector: Arc<dyn Connector>) {
        self.connectors.insert(id.into(), connector);
    }

    /// Resolve a connector by its ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(id).map(Arc::clone)
    }
}
