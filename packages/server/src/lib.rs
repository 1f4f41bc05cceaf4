#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the geotag semantic tagging service.
//!
//! Exposes the tagging engine over HTTP: `GET /` for query-parameter
//! requests, `PUT /` for JSON bodies with per-tagger options, and
//! `GET /health`. All overlay computation happens in `PostGIS`; the
//! server holds one shared connection with a statement timeout.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use geotag_database::db;
use std::sync::Arc;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Database connection.
    pub db: Arc<dyn Database>,
}

/// Starts the geotag API server.
///
/// Connects to the `PostGIS` database and starts the Actix-Web HTTP
/// server. This is a regular async function; the caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the database connection fails.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env()
        .await
        .expect("Failed to connect to database");

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/", web::get().to(handlers::tag_get))
            .route("/", web::put().to(handlers::tag_put))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
