// Copyright 2025 Memophor Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP API handlers for the articulation scraper.
//!
//! Thin pass-through routes over an [`ArticulationSource`]:
//!
//! - `GET /` - Greeting
//! - `GET /healthz` - Service health check
//! - `GET /metrics` - Prometheus metrics export
//! - `GET /api/institution_agreements/:institution_id`
//! - `GET /api/agreements_categories`
//! - `GET /api/agreements`
//! - `GET /api/articulation_agreements/*key`
//!
//! Parameter validation is left to the endpoint catalog; its errors come back
//! as `400 Bad Request`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tokio::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::{param, FetchRequest, Operation};
use crate::error::{AppError, ScrapeError};
use crate::metrics::Metrics;
use crate::model::{AgreementsParams, CategoriesParams};
use crate::source::ArticulationSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ArticulationSource>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(source: Arc<dyn ArticulationSource>, metrics: Metrics) -> Self {
        Self { source, metrics }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .route(
            "/api/institution_agreements/:institution_id",
            get(institution_agreements),
        )
        .route("/api/agreements_categories", get(agreements_categories))
        .route("/api/agreements", get(agreements))
        .route("/api/articulation_agreements/*key", get(articulation_agreements))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn hello() -> &'static str {
    "Hello, World!"
}

/// Health check endpoint
pub async fn health() -> Result<Json<Value>, AppError> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "assist-scraper",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state.metrics.export()
}

pub async fn institution_agreements(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let request = FetchRequest::new(Operation::InstitutionAgreements)
        .with(param::INSTITUTION_ID, institution_id);
    forward(&state, request).await
}

pub async fn agreements_categories(
    State(state): State<AppState>,
    Query(params): Query<CategoriesParams>,
) -> Result<Json<Value>, AppError> {
    forward(&state, params.into()).await
}

pub async fn agreements(
    State(state): State<AppState>,
    Query(params): Query<AgreementsParams>,
) -> Result<Json<Value>, AppError> {
    forward(&state, params.into()).await
}

pub async fn articulation_agreements(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, AppError> {
    forward(&state, FetchRequest::articulation_agreement(&key)).await
}

async fn forward(state: &AppState, request: FetchRequest) -> Result<Json<Value>, AppError> {
    let operation = request.operation();
    state.metrics.record_upstream_request(operation);
    let start = Instant::now();

    let result = state.source.fetch(&request).await;

    state
        .metrics
        .record_upstream_latency(operation, start.elapsed().as_secs_f64());

    match result {
        Ok(value) => Ok(Json(value)),
        Err(err) => {
            state.metrics.record_upstream_failure(operation, failure_kind(&err));
            Err(err.into())
        }
    }
}

fn failure_kind(err: &ScrapeError) -> &'static str {
    match err {
        ScrapeError::InvalidParameter { .. } => "invalid_parameter",
        ScrapeError::Fetch { .. } => "fetch",
        ScrapeError::Decode { .. } => "decode",
        ScrapeError::Transport { .. } => "transport",
    }
}
