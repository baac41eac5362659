use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use contracts::domain::a001_category::aggregate::{Category, CategoryId};
use contracts::domain::a001_category::form::CategoryForm;
use contracts::shared::form::{EditMode, FormDraft};
use contracts::shared::notice::Notice;
use contracts::shared::pagination::{PageRequest, PageResult};
use serde::Deserialize;
use serde_json::json;

use super::{submission_response, ListParams};
use crate::shared::error::CatalogError;
use crate::state::AppState;

/// Тело отправки формы категории; `id` есть только при редактировании
#[derive(Debug, Deserialize)]
pub struct CategoryFormRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub category_name: String,
}

/// GET /api/category/list
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResult<Category>>, CatalogError> {
    let request = PageRequest::new(
        params.page.unwrap_or(1),
        params
            .limit
            .unwrap_or(state.config.pagination.category_page_size),
    );
    Ok(Json(state.categories.list_page(request).await?))
}

/// GET /api/category/options
pub async fn options(State(state): State<AppState>) -> Result<Json<Vec<Category>>, CatalogError> {
    let limit = state.config.pagination.picker_limit;
    Ok(Json(state.categories.options(limit).await?))
}

/// GET /api/category/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, CatalogError> {
    Ok(Json(state.categories.get_by_id(CategoryId::new(id)).await?))
}

/// POST /api/category
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<CategoryFormRequest>,
) -> Response {
    let mode = EditMode::from(request.id.map(CategoryId::new));
    let draft = FormDraft::with_mode(mode, CategoryForm::new(request.category_name));
    submission_response(state.categories.submit(draft).await.outcome)
}

/// DELETE /api/category/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, CatalogError> {
    let notice: Notice = state.categories.delete(CategoryId::new(id)).await?;
    Ok(Json(json!({ "notice": notice })))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, delete, get, post_json, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_list() {
        let (_, app) = app();
        for name in ["Garden", "Books"] {
            let (status, _) = send(&app, post_json("/api/category", json!({ "category_name": name }))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            post_json("/api/category", json!({ "category_name": "  Toys " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["category_name"], "Toys");
        assert_eq!(body["notice"]["level"], "success");
        assert_eq!(body["redirect_to"], "/admin/categories");

        let (status, body) = send(&app, get("/api/category/list?page=1&limit=12")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["category_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Books", "Garden", "Toys"]);
        assert_eq!(body["total_count"], 3);
        assert_eq!(body["total_pages"], 1);
    }

    #[tokio::test]
    async fn test_empty_name_is_unprocessable() {
        let (ds, app) = app();
        let (status, body) = send(&app, post_json("/api/category", json!({ "category_name": " " }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["category_name"].is_string());
        assert_eq!(ds.call_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_name_surfaces_backend_message() {
        let (_, app) = app();
        send(&app, post_json("/api/category", json!({ "category_name": "Toys" }))).await;
        let (status, body) = send(&app, post_json("/api/category", json!({ "category_name": "Toys" }))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["notice"]["level"], "error");
        assert!(body["notice"]["message"]
            .as_str()
            .unwrap()
            .starts_with("duplicate key value"));
    }

    #[tokio::test]
    async fn test_edit_get_and_delete() {
        let (_, app) = app();
        let (_, created) = send(&app, post_json("/api/category", json!({ "category_name": "Toys" }))).await;
        let id = created["item"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            post_json("/api/category", json!({ "id": id, "category_name": "Games" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"]["message"], "Категория обновлена");

        let (_, body) = send(&app, get(&format!("/api/category/{}", id))).await;
        assert_eq!(body["category_name"], "Games");

        let (status, _) = send(&app, delete(&format!("/api/category/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, get(&format!("/api/category/{}", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["notice"]["level"], "error");
    }

    #[tokio::test]
    async fn test_options_and_transport_failure() {
        let (ds, app) = app();
        send(&app, post_json("/api/category", json!({ "category_name": "Toys" }))).await;
        let (_, body) = send(&app, get("/api/category/options")).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        ds.fail_next("upstream timeout");
        let (status, body) = send(&app, get("/api/category/list?page=2")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["notice"]["message"], "upstream timeout");
    }
}
