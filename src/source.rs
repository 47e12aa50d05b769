// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::FetchRequest;
use crate::client::ArticulationClient;
use crate::error::ScrapeError;

/// Anything that can answer a [`FetchRequest`] with a JSON document.
///
/// The HTTP front end is handed one of these at construction time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticulationSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, ScrapeError>;
}

#[async_trait]
impl ArticulationSource for ArticulationClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, ScrapeError> {
        ArticulationClient::fetch(self, request).await
    }
}
