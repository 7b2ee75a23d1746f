// Copyright 2024, 2025 The Palisade Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use anyhow::bail;
use async_trait::async_trait;
use palisade_data_model::Identity;
use parking_lot::Mutex;

use crate::{Connector, RefreshConnector};

/// A connector for testing purposes, serving canned identities and recording
/// what it was asked.
#[derive(Default)]
pub struct MockConnector {
    refresh: Option<MockRefresh>,
}

struct MockRefresh {
    /// `Ok` identity to serve, or `Err` message to fail with.
    response: Result<Identity, String>,

    /// Every `(scopes, incoming identity)` pair seen so far.
    requests: Mutex<Vec<(Vec<String>, Identity)>>,
}

impl MockConnector {
    /// A connector without the refresh capability.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose refresh capability serves the given identity.
    #[must_use]
    pub fn with_refresh(identity: Identity) -> Self {
        Self {
            refresh: Some(MockRefresh {
                response: Ok(identity),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A connector whose refresh capability always fails.
    #[must_use]
    pub fn with_failing_refresh(message: impl Into<String>) -> Self {
        Self {
            refresh: Some(MockRefresh {
                response: Err(message.into()),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The `(scopes, incoming identity)` pairs the refresh capability has
    /// seen, in order.
    #[must_use]
    pub fn refresh_requests(&self) -> Vec<(Vec<String>, Identity)> {
        self.refresh
            .as_ref()
            .map(|r| r.requests.lock().clone())
            .unwrap_or_default()
    }
}

impl Connector for MockConnector {
    fn refresh_connector(&self) -> Option<&dyn RefreshConnector> {
        self.refresh.as_ref().map(|r| r as &dyn RefreshConnector)
    }
}

#[async_trait]
impl RefreshConnector for MockRefresh {
    async fn refresh(
        &self,
        scopes: &[String],
        identity: Identity,
    ) -> Result<Identity, anyhow::Error> {
        self.requests.lock().push((scopes.to_vec(), identity));

        match &self.response {
            Ok(identity) => Ok(identity.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capability_discovery() {
        let passive = MockConnector::new();
        assert!(passive.refresh_connector().is_none());

        let refreshing = MockConnector::with_refresh(Identity::default());
        assert!(refreshing.refresh_connector().is_some());
    }

    #[tokio::test]
    async fn test_refresh_records_requests() {
        let served = Identity {
            user_id: "user".to_owned(),
            groups: vec!["admins".to_owned()],
            ..Identity::default()
        };
        let connector = MockConnector::with_refresh(served.clone());

        let incoming = Identity {
            user_id: "user".to_owned(),
            connector_data: b"upstream-state".to_vec(),
            ..Identity::default()
        };
        let scopes = vec!["openid".to_owned()];

        let refreshed = connector
            .refresh_connector()
            .unwrap()
            .refresh(&scopes, incoming.clone())
            .await
            .unwrap();
        assert_eq!(refreshed, served);

        let requests = connector.refresh_requests();
        assert_eq!(requests, vec![(scopes, incoming)]);
    }

    #[tokio::test]
    async fn test_failing_refresh() {
        let connector = MockConnector::with_failing_refresh("upstream is down");
        let res = connector
            .refresh_connector()
            .unwrap()
            .refresh(&[], Identity::default())
            .await;
        assert_eq!(res.unwrap_err().to_string(), "upstream is down");
    }
}
