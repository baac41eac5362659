use async_trait::async_trait;
use contracts::domain::a001_category::aggregate::{Category, CategoryDto, CategoryId};
use contracts::domain::a001_category::form::{CategoryDraft, CategoryForm};
use contracts::domain::common::AggregateRoot;
use contracts::shared::form::EditMode;
use contracts::shared::notice::Notice;
use contracts::shared::pagination::{PageRequest, PageResult};
use std::sync::Arc;

use super::repository;
use crate::shared::cache::{QueryCache, QueryKey};
use crate::shared::data::DataService;
use crate::shared::error::CatalogError;
use crate::shared::mutation::{MutationOrchestrator, MutationTarget, Submission};

/// Маршрут списка категорий в админке
pub const LIST_ROUTE: &str = "/admin/categories";

/// Категории: чтение страниц через кэш, отправка формы, удаление
pub struct CategoryService {
    data: Arc<dyn DataService>,
    cache: QueryCache,
}

impl CategoryService {
    pub fn new(data: Arc<dyn DataService>, cache: QueryCache) -> Self {
        Self { data, cache }
    }

    /// Страница списка категорий
    pub async fn list_page(&self, request: PageRequest) -> Result<PageResult<Category>, CatalogError> {
        let request = request.normalized();
        let key = QueryKey::new(Category::collection_name(), request.page, request.limit);
        self.cache
            .get_or_fetch(key, || repository::list_page(self.data.as_ref(), request))
            .await
    }

    /// Категории для выбора на форме товара (первая страница с большим лимитом)
    pub async fn options(&self, limit: usize) -> Result<Vec<Category>, CatalogError> {
        Ok(self.list_page(PageRequest::new(1, limit)).await?.items)
    }

    pub async fn get_by_id(&self, id: CategoryId) -> Result<Category, CatalogError> {
        repository::get_by_id(self.data.as_ref(), id).await
    }

    /// Отправка формы создания/редактирования
    pub async fn submit(&self, draft: CategoryDraft) -> Submission<Self> {
        MutationOrchestrator::new(self, self.cache.clone())
            .submit(draft)
            .await
    }

    /// Удаление категории; после успеха сбрасываются все страницы категорий
    pub async fn delete(&self, id: CategoryId) -> Result<Notice, CatalogError> {
        repository::delete(self.data.as_ref(), id).await?;
        self.cache.invalidate_tag(Category::collection_name());
        tracing::info!("Category {} deleted", id);
        Ok(Notice::success("Категория удалена"))
    }
}

#[async_trait]
impl MutationTarget for CategoryService {
    type Fields = CategoryForm;
    type Payload = CategoryDto;
    type Id = CategoryId;
    type Entity = Category;

    fn tag(&self) -> &'static str {
        Category::collection_name()
    }

    fn list_route(&self) -> &'static str {
        LIST_ROUTE
    }

    fn success_message(&self, mode: EditMode<CategoryId>) -> String {
        match mode {
            EditMode::Creating => "Категория создана".to_string(),
            EditMode::Editing(_) => "Категория обновлена".to_string(),
        }
    }

    async fn create(&self, payload: CategoryDto, _uploaded: Option<String>) -> Result<Category, CatalogError> {
        repository::insert(self.data.as_ref(), &payload).await
    }

    async fn update(
        &self,
        id: CategoryId,
        payload: CategoryDto,
        _uploaded: Option<String>,
    ) -> Result<Category, CatalogError> {
        repository::update(self.data.as_ref(), id, &payload).await
    }
}
