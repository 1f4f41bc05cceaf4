#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Footprint tagging engine.
//!
//! Given a polygon footprint in WKT, the engine normalizes it to
//! EPSG:4326, computes its area and universal keywords, then runs the
//! requested taggers (each a spatial overlay against a reference
//! dataset) and merges their sub-trees into a single response
//! envelope. All overlay math is delegated to `PostGIS`; this crate
//! owns the aggregation, ranking, merging and presentation of the
//! results.

pub mod config;
pub mod coverage;
pub mod engine;
pub mod geometry;
pub mod taggers;

pub use config::TagConfig;
pub use engine::TagEngine;

use thiserror::Error;

/// Errors surfaced by the tagging engine.
#[derive(Debug, Error)]
pub enum TagError {
    /// No geometry was provided.
    #[error("Missing mandatory geometry")]
    MissingGeometry,

    /// The footprint failed topology validation; carries the oracle's
    /// diagnostic text.
    #[error("{0}")]
    InvalidGeometry(String),

    /// Reprojection to EPSG:4326 failed.
    #[error("WKT transformation error")]
    GeometryTransform,

    /// Cannot establish a database connection.
    #[error("Database connection error")]
    Connection,

    /// A query exceeded the configured statement timeout.
    #[error("Database query timeout")]
    QueryTimeout,

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(switchy_database::DatabaseError),
}

impl From<switchy_database::DatabaseError> for TagError {
    fn from(err: switchy_database::DatabaseError) -> Self {
        if err.to_string().contains("statement timeout") {
            Self::QueryTimeout
        } else {
            Self::Database(err)
        }
    }
}

impl From<geotag_database::DbError> for TagError {
    fn from(err: geotag_database::DbError) -> Self {
        if err.is_statement_timeout() {
            return Self::QueryTimeout;
        }
        match err {
            geotag_database::DbError::Database(e) => Self::Database(e),
            geotag_database::DbError::Connection { .. } => Self::Connection,
        }
    }
}
