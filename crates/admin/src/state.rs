use std::sync::Arc;

use crate::domain::a001_category::service::CategoryService;
use crate::domain::a002_product::service::ProductService;
use crate::shared::cache::QueryCache;
use crate::shared::config::Config;
use crate::shared::data::DataService;

/// Общее состояние обработчиков
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
}

impl AppState {
    /// Сервисы сущностей поверх одного клиента данных и общего кэша страниц
    pub fn new(config: Arc<Config>, data: Arc<dyn DataService>) -> Self {
        let cache = QueryCache::new();
        let categories = CategoryService::new(data.clone(), cache.clone());
        let products = ProductService::new(data, cache, config.data_service.image_bucket.clone());
        Self {
            config,
            categories: Arc::new(categories),
            products: Arc::new(products),
        }
    }
}
