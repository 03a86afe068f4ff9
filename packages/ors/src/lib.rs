#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Isochrone service client.
//!
//! The analysis engine talks to the isochrone service only through the
//! [`IsochroneService`] trait. [`client::OrsClient`] implements it over
//! the `OpenRouteService` v2 HTTP API; tests substitute in-memory fakes.
//!
//! The only failure the engine treats specially is
//! [`ServiceError::RateLimited`] (HTTP 429), which the retry executor
//! waits out. Every other error is reported against the single point that
//! produced it.

pub mod client;
pub mod config;

use isochrone_map_analysis_models::{IsochroneFeature, IsochroneRequest};
use thiserror::Error;

pub use client::OrsClient;
pub use config::ServiceConfig;

/// Errors from an isochrone request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP 429: the upstream request-rate ceiling was hit.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// HTTP 401/403: the API key was rejected.
    #[error("Unauthorized (HTTP {status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected feature collection.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl ServiceError {
    /// Returns `true` for the one failure the retry executor waits out.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Errors from loading service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File read failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A service that computes isochrones.
///
/// One call carries every threshold of the request's range and returns
/// one feature per threshold.
#[async_trait::async_trait]
pub trait IsochroneService: Send + Sync {
    /// Computes isochrones for a single point and profile.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RateLimited`] when the service throttles
    /// the caller, or another [`ServiceError`] for any other failure.
    async fn isochrones(
        &self,
        request: &IsochroneRequest<'_>,
    ) -> Result<Vec<IsochroneFeature>, ServiceError>;
}
