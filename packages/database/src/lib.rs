#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Database connection bootstrap and `PostGIS` SQL helpers.
//!
//! The tagging engine treats the database as a geometry-overlay
//! oracle: every spatial predicate, reprojection and intersection-area
//! computation happens inside `PostGIS` via raw SQL executed through
//! `query_raw_params()`. This crate owns the connection setup and the
//! SQL fragment builders shared by every overlay query.

pub mod db;
pub mod postgis;

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Cannot establish a connection to the database.
    #[error("Database connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },
}

impl DbError {
    /// Returns true when the underlying failure is a statement
    /// timeout (the connection-level `statement_timeout` fired).
    #[must_use]
    pub fn is_statement_timeout(&self) -> bool {
        match self {
            Self::Database(err) => err.to_string().contains("statement timeout"),
            Self::Connection { .. } => false,
        }
    }
}
