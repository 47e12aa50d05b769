// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Stateless pass-through fetcher for ASSIST course-articulation data.
//!
//! [`EndpointCatalog`] turns a [`FetchRequest`] into a remote URL;
//! [`ArticulationClient`] (non-blocking) and [`BlockingArticulationClient`]
//! issue the GET and decode the JSON body. The [`api`] module republishes the
//! four operations over HTTP.

pub mod api;
pub mod blocking;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod source;

pub use blocking::BlockingArticulationClient;
pub use catalog::{EndpointCatalog, FetchRequest, Operation};
pub use client::ArticulationClient;
pub use config::{AppConfig, ClientConfig, LogFormat};
pub use error::{AppError, ScrapeError};
pub use model::AgreementQuery;
pub use source::ArticulationSource;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Logs go to stderr.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
