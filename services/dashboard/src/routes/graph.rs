// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chart endpoint.
//!
//! Two request encodings reach the same pipeline:
//!
//! - `POST /api/v1/graph` with a JSON body of value lists
//! - `GET /api/v1/graph?versions=a,b&platforms=..&netconfigs=..&test=..`
//!
//! Each request loads the record store, validates the filters against the
//! loaded metadata and aggregates. Validation failures stop the request
//! before any aggregation work.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use srgraph_core::{aggregate, validate, Checked, GraphRequest, RecordSource, Series};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::{AppState, ChartResponse};

/// Comma-separated query encoding.
#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub versions: String,
    #[serde(default)]
    pub platforms: String,
    #[serde(default)]
    pub netconfigs: String,
    pub test: Option<String>,
}

impl From<GraphQuery> for GraphRequest {
    fn from(query: GraphQuery) -> Self {
        GraphRequest::from_comma_separated(
            &query.versions,
            &query.platforms,
            &query.netconfigs,
            query.test.as_deref(),
        )
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/graph", get(graph_query).post(graph_json))
}

async fn graph_json(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GraphRequest>,
) -> Result<Json<ChartResponse>, ApiError> {
    chart(state, request).await.map(Json)
}

async fn graph_query(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    chart(state, query.into()).await.map(Json)
}

async fn chart(state: Arc<AppState>, request: GraphRequest) -> Result<ChartResponse, ApiError> {
    let source = Arc::clone(&state.source);
    tokio::task::spawn_blocking(move || build_chart(source.as_ref(), &request))
        .await
        .map_err(|e| ApiError::internal(format!("Chart task failed: {}", e)))?
}

/// Load, validate and aggregate for one request.
pub fn build_chart(
    source: &dyn RecordSource,
    request: &GraphRequest,
) -> Result<ChartResponse, ApiError> {
    let set = source.load()?;

    let validated = validate(&set.metadata, request).map_err(|err| {
        warn!(error = %err, "Graph request rejected");
        ApiError::validation(err, Checked::from_request(&set.metadata, request), &set.metadata)
    })?;

    let aggregation = aggregate(&set.records, &validated.selection);

    info!(
        suite = %validated.selection.suite,
        series = aggregation.series.len(),
        dates = aggregation.dates.len(),
        points = aggregation.series.iter().map(Series::present).sum::<usize>(),
        records = set.len(),
        "Chart built"
    );

    Ok(ChartResponse::new(validated, aggregation))
}
