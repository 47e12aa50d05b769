// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Non-blocking fetcher for the ASSIST articulation API.
//!
//! Resolves a [`FetchRequest`] through the [`EndpointCatalog`], issues a single
//! GET and hands back the decoded JSON document. Each call owns its request and
//! response; clones of the client share only the connection pool.

use futures_util::future::join_all;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::catalog::{EndpointCatalog, FetchRequest};
use crate::config::ClientConfig;
use crate::error::ScrapeError;
use crate::model::AgreementQuery;

/// HTTP client wrapper for talking to the articulation API.
#[derive(Clone)]
pub struct ArticulationClient {
    catalog: EndpointCatalog,
    client: Client,
    max_body_bytes: usize,
}

impl ArticulationClient {
    /// Construct a new client using the provided configuration.
    pub fn try_new(config: ClientConfig) -> Result<Self, ScrapeError> {
        let catalog = EndpointCatalog::new(&config.base_url)?;

        let mut builder = Client::builder().user_agent(config.user_agent_header()?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ScrapeError::invalid_parameter(
                "client_config",
                format!("failed to build HTTP client: {e}"),
            )
        })?;

        Ok(Self {
            catalog,
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    /// Fetch one logical operation and decode the body as JSON.
    ///
    /// Parameter validation happens before any I/O. Dropping the returned
    /// future cancels the request and releases its connection.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Value, ScrapeError> {
        let url = self.catalog.resolve(request)?;
        let operation = request.operation();

        tracing::debug!(%operation, %url, "fetching");

        let result = self.get_json(url).await;
        if let Err(error) = &result {
            tracing::warn!(%operation, %error, "fetch failed");
        }

        result
    }

    /// Run every request concurrently; results come back in input order.
    pub async fn fetch_all(&self, requests: &[FetchRequest]) -> Vec<Result<Value, ScrapeError>> {
        join_all(requests.iter().map(|request| self.fetch(request))).await
    }

    /// Run a fetch as its own task. Aborting the handle cancels the request.
    pub fn spawn_fetch(&self, request: FetchRequest) -> JoinHandle<Result<Value, ScrapeError>> {
        let client = self.clone();
        tokio::spawn(async move { client.fetch(&request).await })
    }

    pub async fn institution_agreements(&self, institution_id: u64) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::institution_agreements(institution_id))
            .await
    }

    pub async fn agreement_categories(&self, query: &AgreementQuery) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::agreement_categories(query)).await
    }

    pub async fn agreements(
        &self,
        query: &AgreementQuery,
        category_code: &str,
    ) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::agreements(query, category_code))
            .await
    }

    pub async fn articulation_agreement(&self, key: &str) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::articulation_agreement(key)).await
    }

    async fn get_json(&self, url: Url) -> Result<Value, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        decode(response, self.max_body_bytes).await
    }
}

/// Check the status, then read at most `limit` bytes of body and decode it.
async fn decode(mut response: Response, limit: usize) -> Result<Value, ScrapeError> {
    let status = response.status().as_u16();

    if !response.status().is_success() {
        return Err(ScrapeError::fetch(status));
    }

    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(ScrapeError::body_too_large(status, limit));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(ScrapeError::body_too_large(status, limit));
        }
        body.extend_from_slice(&chunk);
    }

    serde_json::from_slice(&body).map_err(|e| ScrapeError::decode(status, e.to_string()))
}
