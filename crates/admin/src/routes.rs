use axum::http::{header, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::shared::logger::request_logger;
use crate::state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Category
        .route("/api/category", post(handlers::a001_category::submit))
        .route("/api/category/list", get(handlers::a001_category::list))
        .route("/api/category/options", get(handlers::a001_category::options))
        .route(
            "/api/category/:id",
            get(handlers::a001_category::get_by_id).delete(handlers::a001_category::delete),
        )
        // A002 Product
        .route("/api/product", post(handlers::a002_product::submit))
        .route("/api/product/list", get(handlers::a002_product::list))
        .route("/api/product/image", post(handlers::a002_product::upload_image))
        .route(
            "/api/product/:id",
            get(handlers::a002_product::get_by_id).delete(handlers::a002_product::delete),
        )
        .with_state(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{app, get, send};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health() {
        let (_, app) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let (ds, app) = app();
        let (status, _) = send(&app, get("/api/product/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(ds.call_count(), 0);
    }
}
