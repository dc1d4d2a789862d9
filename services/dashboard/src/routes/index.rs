//! The browser page.
//!
//! The page is static; it reads the filter options from
//! `/api/v1/metadata` and draws charts from `/api/v1/graph`.

use axum::{response::Html, routing::get, Router};
use std::sync::Arc;

use crate::models::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::app_with;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_index_serves_page() {
        let response = app_with(vec![])
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/v1/graph"));
    }

    #[tokio::test]
    async fn test_index_plots_full_dates_with_short_labels() {
        let response = app_with(vec![])
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("x: dates,"));
        assert!(html.contains("tickvals: dates, ticktext: chart.x_labels"));
    }
}
