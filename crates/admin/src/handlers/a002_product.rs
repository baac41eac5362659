use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a002_product::aggregate::{Product, ProductId};
use contracts::domain::a002_product::form::{ProductForm, ProductImage};
use contracts::shared::form::{EditMode, FieldErrors, FormDraft};
use contracts::shared::pagination::{PageRequest, PageResult};
use contracts::shared::upload::UploadFile;
use serde::Serialize;
use serde_json::json;

use super::{submission_response, ListParams};
use crate::domain::a002_product::service::ProductService;
use crate::shared::error::CatalogError;
use crate::state::AppState;

/// Поле multipart с файлом изображения
const IMAGE_FIELD: &str = "image";

/// Товар для отображения: запись и публичный адрес изображения
#[derive(Debug, Serialize)]
pub struct ProductItem {
    #[serde(flatten)]
    pub product: Product,
    pub image_src: Option<String>,
}

impl ProductItem {
    fn new(service: &ProductService, product: Product) -> Self {
        let image_src = product
            .image_url
            .as_deref()
            .map(|name| service.public_image_url(name));
        Self { product, image_src }
    }
}

/// GET /api/product/list
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResult<ProductItem>>, CatalogError> {
    let request = PageRequest::new(
        params.page.unwrap_or(1),
        params
            .limit
            .unwrap_or(state.config.pagination.product_page_size),
    );
    let page = state.products.list_page(request).await?;
    Ok(Json(page.map(|p| ProductItem::new(&state.products, p))))
}

/// GET /api/product/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductItem>, CatalogError> {
    let product = state.products.get_by_id(ProductId::new(id)).await?;
    Ok(Json(ProductItem::new(&state.products, product)))
}

/// POST /api/product (multipart: title, description, price, category_id,
/// id при редактировании, image_url сохранённого изображения, файл image)
pub async fn submit(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (id, fields) = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let draft = FormDraft::with_mode(EditMode::from(id), fields);
    submission_response(state.products.submit(draft).await.outcome)
}

/// POST /api/product/image
pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(IMAGE_FIELD) => match read_file(field).await {
                Ok(f) => file = f,
                Err(e) => return e.into_response(),
            },
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return e.into_response(),
        }
    }

    let Some(file) = file else {
        let mut errors = FieldErrors::new();
        errors.insert(IMAGE_FIELD, "Выберите файл изображения");
        return CatalogError::Validation(errors).into_response();
    };
    match state.products.upload_image(file).await {
        Ok(name) => {
            let url = state.products.public_image_url(&name);
            Json(json!({ "name": name, "url": url })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to upload image: {}", e);
            e.into_response()
        }
    }
}

/// DELETE /api/product/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, CatalogError> {
    let notice = state.products.delete(ProductId::new(id)).await?;
    Ok(Json(json!({ "notice": notice })))
}

/// Файл из поля multipart; пустое поле (файл не выбран) -> None
async fn read_file(field: Field<'_>) -> Result<Option<UploadFile>, axum::extract::multipart::MultipartError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;
    if file_name.is_empty() || bytes.is_empty() {
        return Ok(None);
    }
    let file = UploadFile::new(file_name, bytes.to_vec());
    Ok(Some(match content_type {
        Some(ct) => file.with_content_type(ct),
        None => file,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<(Option<ProductId>, ProductForm), Response> {
    let mut id = None;
    let mut fields = ProductForm::default();
    let mut stored = None;
    let mut selected = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            selected = read_file(field).await.map_err(IntoResponse::into_response)?;
            continue;
        }
        let value = field.text().await.map_err(IntoResponse::into_response)?;
        match name.as_str() {
            "id" if value.trim().is_empty() => {}
            "id" => match value.trim().parse::<i64>() {
                Ok(v) => id = Some(ProductId::new(v)),
                Err(_) => {
                    let mut errors = FieldErrors::new();
                    errors.insert("id", "Некорректный идентификатор товара");
                    return Err(CatalogError::Validation(errors).into_response());
                }
            },
            ProductForm::TITLE => fields.title = value,
            ProductForm::DESCRIPTION => fields.description = value,
            ProductForm::PRICE => fields.price = value,
            ProductForm::CATEGORY_ID => fields.category_id = value,
            "image_url" => stored = Some(value).filter(|v| !v.trim().is_empty()),
            other => tracing::debug!("Ignoring multipart field {}", other),
        }
    }

    fields.image = match selected {
        Some(file) => ProductImage::Selected(file),
        None => ProductImage::Stored(stored),
    };
    Ok((id, fields))
}
