#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the geotag server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the engine types to allow independent evolution of
//! the API contract.

use geotag_tagger_models::{TaggerOptions, TaggerSpec, TaggingRequest};
use serde::{Deserialize, Serialize};

/// Query parameters for the GET tagging endpoint.
///
/// Taggers are passed as a comma separated list without options; the
/// PUT endpoint accepts the full request body with per-tagger options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagQueryParams {
    /// Footprint WKT, optionally prefixed with `SRID=<n>;`.
    pub geometry: Option<String>,
    /// ISO-8601 acquisition date.
    pub timestamp: Option<String>,
    /// Target planet, defaults to earth.
    pub planet: Option<String>,
    /// Comma separated tagger names.
    pub taggers: Option<String>,
    /// Pretty-print the JSON response.
    #[serde(rename = "_pretty", default)]
    pub pretty: bool,
    /// Attach intersected feature geometries as WKT.
    #[serde(rename = "_wkt", default)]
    pub wkt: bool,
}

impl TagQueryParams {
    /// Expands the flat query parameters into an engine request.
    #[must_use]
    pub fn into_request(self) -> TaggingRequest {
        TaggingRequest {
            geometry: self.geometry.unwrap_or_default(),
            timestamp: self.timestamp,
            planet: self.planet.unwrap_or_else(|| "earth".to_string()),
            taggers: self
                .taggers
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(|name| TaggerSpec {
                    name: name.to_string(),
                    options: TaggerOptions::default(),
                })
                .collect(),
        }
    }
}

/// Presentation toggles shared by the GET and PUT endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PresentationParams {
    /// Pretty-print the JSON response.
    #[serde(rename = "_pretty", default)]
    pub pretty: bool,
    /// Attach intersected feature geometries as WKT.
    #[serde(rename = "_wkt", default)]
    pub wkt: bool,
}

/// Error envelope returned with a non-200 status.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Human readable error message.
    #[serde(rename = "ErrorMessage")]
    pub error_message: String,
    /// HTTP status code, duplicated in the body.
    #[serde(rename = "ErrorCode")]
    pub error_code: u16,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiHealth {
    /// Always true when the server responds.
    pub healthy: bool,
    /// Server crate version.
    pub version: String,
}
