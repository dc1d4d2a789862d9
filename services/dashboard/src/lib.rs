// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! srgraph dashboard service.
//!
//! Serves the filter page and a small JSON API over a directory of
//! performance-run records. Each request reads the record store afresh.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod telemetry;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use config::DashboardConfig;
pub use error::ApiError;
pub use models::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
