use contracts::domain::a002_product::aggregate::{Product, ProductDto, ProductId};
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::pagination::{PageRequest, PageResult};
use contracts::shared::upload::UploadFile;
use serde_json::Value;
use uuid::Uuid;

use crate::shared::data::DataService;
use crate::shared::error::CatalogError;

fn table() -> &'static str {
    Product::collection_name()
}

fn from_row(row: Value) -> Result<Product, CatalogError> {
    Ok(serde_json::from_value(row)?)
}

/// Страница товаров по возрастанию названия и точное общее количество
pub async fn list_page(
    ds: &dyn DataService,
    request: PageRequest,
) -> Result<PageResult<Product>, CatalogError> {
    let (from, to) = request.range();
    let page = ds
        .select_range(table(), Product::order_column(), from, to)
        .await?;
    let items = page
        .rows
        .into_iter()
        .map(from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PageResult::new(items, page.total, request))
}

pub async fn get_by_id(ds: &dyn DataService, id: ProductId) -> Result<Product, CatalogError> {
    from_row(ds.select_by_id(table(), &id.as_string()).await?)
}

pub async fn insert(ds: &dyn DataService, dto: &ProductDto) -> Result<Product, CatalogError> {
    let rows = ds.insert(table(), vec![serde_json::to_value(dto)?]).await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| CatalogError::backend("insert into products returned no rows"))
        .and_then(from_row)
}

pub async fn update(
    ds: &dyn DataService,
    id: ProductId,
    dto: &ProductDto,
) -> Result<Product, CatalogError> {
    let rows = ds
        .update(table(), &id.as_string(), serde_json::to_value(dto)?)
        .await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| CatalogError::not_found(table(), id))
        .and_then(from_row)
}

pub async fn delete(ds: &dyn DataService, id: ProductId) -> Result<bool, CatalogError> {
    ds.delete(table(), &id.as_string()).await?;
    Ok(true)
}

/// Уникальное имя объекта: случайный UUID и расширение исходного файла
pub fn object_name(file: &UploadFile) -> String {
    let id = Uuid::new_v4();
    match file.extension() {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

/// Загрузка изображения; возвращает имя сохранённого объекта
pub async fn upload_image(
    ds: &dyn DataService,
    bucket: &str,
    file: UploadFile,
) -> Result<String, CatalogError> {
    let name = object_name(&file);
    let content_type = file.mime_type().to_string();
    ds.upload(bucket, &name, file.bytes, &content_type).await?;
    tracing::info!("Uploaded image {}/{}", bucket, name);
    Ok(name)
}
