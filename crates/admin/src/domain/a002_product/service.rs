use async_trait::async_trait;
use contracts::domain::a002_product::aggregate::{Product, ProductDto, ProductId};
use contracts::domain::a002_product::form::{ProductDraft, ProductForm};
use contracts::domain::common::AggregateRoot;
use contracts::shared::form::EditMode;
use contracts::shared::notice::Notice;
use contracts::shared::pagination::{PageRequest, PageResult};
use contracts::shared::upload::UploadFile;
use std::sync::Arc;

use super::repository;
use crate::shared::cache::{QueryCache, QueryKey};
use crate::shared::data::DataService;
use crate::shared::error::CatalogError;
use crate::shared::mutation::{MutationOrchestrator, MutationTarget, Submission};

pub const LIST_ROUTE: &str = "/admin/products";

/// Товары: страницы через кэш, форма с загрузкой изображения, удаление
pub struct ProductService {
    data: Arc<dyn DataService>,
    cache: QueryCache,
    bucket: String,
}

impl ProductService {
    pub fn new(data: Arc<dyn DataService>, cache: QueryCache, bucket: impl Into<String>) -> Self {
        Self {
            data,
            cache,
            bucket: bucket.into(),
        }
    }

    pub async fn list_page(&self, request: PageRequest) -> Result<PageResult<Product>, CatalogError> {
        let request = request.normalized();
        let key = QueryKey::new(Product::collection_name(), request.page, request.limit);
        self.cache
            .get_or_fetch(key, || repository::list_page(self.data.as_ref(), request))
            .await
    }

    pub async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        repository::get_by_id(self.data.as_ref(), id).await
    }

    pub async fn submit(&self, draft: ProductDraft) -> Submission<Self> {
        MutationOrchestrator::new(self, self.cache.clone())
            .submit(draft)
            .await
    }

    pub async fn delete(&self, id: ProductId) -> Result<Notice, CatalogError> {
        repository::delete(self.data.as_ref(), id).await?;
        self.cache.invalidate_tag(Product::collection_name());
        tracing::info!("Product {} deleted", id);
        Ok(Notice::success("Товар удалён"))
    }

    /// Загрузка изображения без записи товара
    pub async fn upload_image(&self, file: UploadFile) -> Result<String, CatalogError> {
        repository::upload_image(self.data.as_ref(), &self.bucket, file).await
    }

    /// Публичный адрес изображения по имени объекта
    pub fn public_image_url(&self, name: &str) -> String {
        self.data.public_url(&self.bucket, name)
    }
}

fn with_uploaded(mut payload: ProductDto, uploaded: Option<String>) -> ProductDto {
    if uploaded.is_some() {
        payload.image_url = uploaded;
    }
    payload
}

#[async_trait]
impl MutationTarget for ProductService {
    type Fields = ProductForm;
    type Payload = ProductDto;
    type Id = ProductId;
    type Entity = Product;

    fn tag(&self) -> &'static str {
        Product::collection_name()
    }

    fn list_route(&self) -> &'static str {
        LIST_ROUTE
    }

    fn success_message(&self, mode: EditMode<ProductId>) -> String {
        match mode {
            EditMode::Creating => "Товар создан".to_string(),
            EditMode::Editing(_) => "Товар обновлён".to_string(),
        }
    }

    fn pending_upload(fields: &ProductForm) -> Option<UploadFile> {
        fields.pending_upload().cloned()
    }

    async fn upload(&self, file: UploadFile) -> Result<String, CatalogError> {
        self.upload_image(file).await
    }

    async fn create(&self, payload: ProductDto, uploaded: Option<String>) -> Result<Product, CatalogError> {
        repository::insert(self.data.as_ref(), &with_uploaded(payload, uploaded)).await
    }

    async fn update(
        &self,
        id: ProductId,
        payload: ProductDto,
        uploaded: Option<String>,
    ) -> Result<Product, CatalogError> {
        repository::update(self.data.as_ref(), id, &with_uploaded(payload, uploaded)).await
    }
}
