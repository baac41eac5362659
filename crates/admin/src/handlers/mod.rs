pub mod a001_category;
pub mod a002_product;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::shared::mutation::Outcome;

/// Параметры запроса страницы списка
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Ответ на отправку формы: 200 с записью, 422 с ошибками полей,
/// иначе статус ошибки сервиса и уведомление с её текстом
pub fn submission_response<E: Serialize>(outcome: Outcome<E>) -> Response {
    match outcome {
        Outcome::Saved {
            entity,
            notice,
            redirect_to,
        } => Json(json!({
            "item": entity,
            "notice": notice,
            "redirect_to": redirect_to,
        }))
        .into_response(),
        Outcome::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response(),
        Outcome::Failed { notice, error } => {
            (error.status_code(), Json(json!({ "notice": notice }))).into_response()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::routes::configure_routes;
    use crate::shared::config::Config;
    use crate::shared::data::memory::MemoryDataService;
    use crate::state::AppState;

    pub fn app() -> (Arc<MemoryDataService>, Router) {
        let ds = Arc::new(
            MemoryDataService::new().with_unique("product_category", "category_name"),
        );
        let config = Config::embedded().expect("embedded config");
        let state = AppState::new(Arc::new(config), ds.clone());
        (ds, configure_routes(state))
    }

    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn delete(uri: &str) -> Request<Body> {
        Request::delete(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
