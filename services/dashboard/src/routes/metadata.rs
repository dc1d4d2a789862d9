use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{AppState, MetadataResponse};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/metadata", get(metadata))
}

async fn metadata(State(state): State<Arc<AppState>>) -> Result<Json<MetadataResponse>, ApiError> {
    let source = Arc::clone(&state.source);
    let set = tokio::task::spawn_blocking(move || source.load())
        .await
        .map_err(|e| ApiError::internal(format!("Record load task failed: {}", e)))??;

    debug!(records = set.len(), "Metadata served");

    Ok(Json(MetadataResponse {
        records: set.len(),
        metadata: set.metadata,
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app_with, app_with_source, record, send, MockSource};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use srgraph_core::StoreError;
    use std::io;

    #[tokio::test]
    async fn test_metadata_lists_sorted_options() {
        let app = app_with(vec![
            record("windows", "10", 20230101, 1.0),
            record("linux", "9", 20230101, 2.0),
        ]);

        let (status, body) = send(
            app,
            Request::get("/api/v1/metadata").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["platforms"], json!(["linux", "windows"]));
        assert_eq!(body["versions"], json!(["10", "9"]));
        assert_eq!(body["tests"], json!(["perf"]));
        assert_eq!(body["netconfigs"], json!(["central"]));
        assert_eq!(body["records"], json!(2));
    }

    #[tokio::test]
    async fn test_unavailable_store_is_server_error() {
        let mut source = MockSource::new();
        source.expect_load().returning(|| {
            Err(StoreError::Unavailable {
                path: "data".into(),
                source: io::Error::new(io::ErrorKind::NotFound, "missing"),
            })
        });

        let (status, body) = send(
            app_with_source(source),
            Request::get("/api/v1/metadata").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], json!("STORE_UNAVAILABLE"));
    }
}
