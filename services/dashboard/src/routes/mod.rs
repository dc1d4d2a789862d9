//! HTTP routes.

pub mod graph;
pub mod health;
pub mod index;
pub mod metadata;

use axum::Router;
use std::sync::Arc;

use crate::models::AppState;

/// All dashboard routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(index::routes())
        .merge(health::routes())
        .merge(metadata::routes())
        .merge(graph::routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use mockall::mock;
    use serde_json::Value;
    use srgraph_core::{store, Record, RecordSet, RecordSource};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::models::AppState;

    mock! {
        pub Source {}

        impl RecordSource for Source {
            fn load(&self) -> store::Result<RecordSet>;
        }
    }

    pub(crate) fn record(platform: &str, version: &str, date: u32, value: f64) -> Record {
        Record {
            platform: platform.to_string(),
            version: version.to_string(),
            suite: "perf".to_string(),
            netconfig: "central".to_string(),
            build_date: date,
            value,
        }
    }

    /// Router backed by a source that returns `records` on every load.
    pub(crate) fn app_with(records: Vec<Record>) -> Router {
        let mut source = MockSource::new();
        source
            .expect_load()
            .returning(move || Ok(RecordSet::new(records.clone())));
        app_with_source(source)
    }

    pub(crate) fn app_with_source(source: MockSource) -> Router {
        crate::router(AppState::new(Arc::new(source)))
    }

    pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}
