use contracts::domain::a001_category::aggregate::{Category, CategoryDto, CategoryId};
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::pagination::{PageRequest, PageResult};
use serde_json::Value;

use crate::shared::data::DataService;
use crate::shared::error::CatalogError;

fn table() -> &'static str {
    Category::collection_name()
}

fn from_row(row: Value) -> Result<Category, CatalogError> {
    Ok(serde_json::from_value(row)?)
}

/// Страница категорий по возрастанию названия и точное общее количество
pub async fn list_page(
    ds: &dyn DataService,
    request: PageRequest,
) -> Result<PageResult<Category>, CatalogError> {
    let (from, to) = request.range();
    let page = ds
        .select_range(table(), Category::order_column(), from, to)
        .await?;
    let items = page
        .rows
        .into_iter()
        .map(from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PageResult::new(items, page.total, request))
}

pub async fn get_by_id(ds: &dyn DataService, id: CategoryId) -> Result<Category, CatalogError> {
    from_row(ds.select_by_id(table(), &id.as_string()).await?)
}

/// Вставка; возвращает сохранённую запись
pub async fn insert(ds: &dyn DataService, dto: &CategoryDto) -> Result<Category, CatalogError> {
    let rows = ds.insert(table(), vec![serde_json::to_value(dto)?]).await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| CatalogError::backend("insert into product_category returned no rows"))
        .and_then(from_row)
}

/// Обновление; ноль затронутых строк означает, что записи нет
pub async fn update(
    ds: &dyn DataService,
    id: CategoryId,
    dto: &CategoryDto,
) -> Result<Category, CatalogError> {
    let rows = ds
        .update(table(), &id.as_string(), serde_json::to_value(dto)?)
        .await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| CatalogError::not_found(table(), id))
        .and_then(from_row)
}

/// Удаление. Отсутствующая запись не ошибка: решает сервис данных.
pub async fn delete(ds: &dyn DataService, id: CategoryId) -> Result<bool, CatalogError> {
    ds.delete(table(), &id.as_string()).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::memory::MemoryDataService;

    async fn seeded(names: &[&str]) -> MemoryDataService {
        let ds = MemoryDataService::new();
        for name in names {
            insert(&ds, &CategoryDto { category_name: name.to_string() })
                .await
                .unwrap();
        }
        ds
    }

    #[tokio::test]
    async fn test_list_page_twice_is_identical() {
        let ds = seeded(&["Garden", "Books", "Audio", "Toys"]).await;
        let first = list_page(&ds, PageRequest::new(1, 3)).await.unwrap();
        let second = list_page(&ds, PageRequest::new(1, 3)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_count, 4);
        assert_eq!(first.total_pages, 2);
        let names: Vec<_> = first.items.iter().map(|c| c.category_name.as_str()).collect();
        assert_eq!(names, vec!["Audio", "Books", "Garden"]);
    }

    #[tokio::test]
    async fn test_insert_then_update_returns_persisted_rows() {
        let ds = seeded(&[]).await;
        let created = insert(&ds, &CategoryDto { category_name: "Toys".into() })
            .await
            .unwrap();
        assert_eq!(created.category_name, "Toys");

        let updated = update(&ds, created.id, &CategoryDto { category_name: "Games".into() })
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(get_by_id(&ds, created.id).await.unwrap().category_name, "Games");
    }

    #[tokio::test]
    async fn test_update_and_get_of_missing_id_are_not_found() {
        let ds = seeded(&["Books"]).await;
        let dto = CategoryDto { category_name: "X".into() };
        let err = update(&ds, CategoryId(999), &dto).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
        let err = get_by_id(&ds, CategoryId(999)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_carries_service_message() {
        let ds = seeded(&["Books"]).await;
        ds.fail_next("FetchError: network down");
        let err = list_page(&ds, PageRequest::new(1, 10)).await.unwrap_err();
        assert_eq!(err.to_string(), "FetchError: network down");
    }
}
