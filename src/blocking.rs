// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Blocking counterpart of [`ArticulationClient`](crate::client::ArticulationClient).
//!
//! Same parameters, same results, one request in flight per call. Must not be
//! used from inside an async runtime; wrap calls in `spawn_blocking` there.

use std::io::Read;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;

use crate::catalog::{EndpointCatalog, FetchRequest};
use crate::config::ClientConfig;
use crate::error::ScrapeError;
use crate::model::AgreementQuery;

#[derive(Clone)]
pub struct BlockingArticulationClient {
    catalog: EndpointCatalog,
    client: Client,
    max_body_bytes: usize,
}

impl BlockingArticulationClient {
    pub fn try_new(config: ClientConfig) -> Result<Self, ScrapeError> {
        let catalog = EndpointCatalog::new(&config.base_url)?;

        // The blocking builder applies a 30s timeout unless told otherwise.
        let client = Client::builder()
            .user_agent(config.user_agent_header()?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
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

    pub fn fetch(&self, request: &FetchRequest) -> Result<Value, ScrapeError> {
        let url = self.catalog.resolve(request)?;
        let operation = request.operation();

        tracing::debug!(%operation, %url, "fetching (blocking)");

        let result = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .map_err(ScrapeError::from)
            .and_then(|response| decode(response, self.max_body_bytes));

        if let Err(error) = &result {
            tracing::warn!(%operation, %error, "fetch failed");
        }

        result
    }

    pub fn institution_agreements(&self, institution_id: u64) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::institution_agreements(institution_id))
    }

    pub fn agreement_categories(&self, query: &AgreementQuery) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::agreement_categories(query))
    }

    pub fn agreements(
        &self,
        query: &AgreementQuery,
        category_code: &str,
    ) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::agreements(query, category_code))
    }

    pub fn articulation_agreement(&self, key: &str) -> Result<Value, ScrapeError> {
        self.fetch(&FetchRequest::articulation_agreement(key))
    }
}

fn decode(response: Response, limit: usize) -> Result<Value, ScrapeError> {
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

    // One byte past the limit is enough to tell an oversized body apart.
    let mut body = Vec::new();
    response
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| ScrapeError::Transport {
            timed_out: e.kind() == std::io::ErrorKind::TimedOut,
            message: format!("failed to read response body: {e}"),
        })?;

    if body.len() > limit {
        return Err(ScrapeError::body_too_large(status, limit));
    }

    serde_json::from_slice(&body).map_err(|e| ScrapeError::decode(status, e.to_string()))
}
