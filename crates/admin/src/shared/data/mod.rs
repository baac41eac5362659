//! Граница с внешним сервисом данных: чтение страниц, запись и хранилище объектов.

pub mod memory;
pub mod postgrest;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::config::{DataServiceConfig, DataServiceKind};
use super::error::CatalogError;

/// Страница строк вместе с точным общим количеством
#[derive(Debug, Clone, PartialEq)]
pub struct RowPage {
    pub rows: Vec<Value>,
    pub total: usize,
}

/// Клиент внешнего сервиса данных.
///
/// Строки передаются как JSON-объекты; типизацию делают репозитории сущностей.
/// Фильтр по идентификатору всегда `id = {id}`.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Строки с включительными смещениями `from..=to`, отсортированные по
    /// `order_by` по возрастанию, и точное количество строк в таблице
    async fn select_range(
        &self,
        table: &str,
        order_by: &str,
        from: usize,
        to: usize,
    ) -> Result<RowPage, CatalogError>;

    /// Ровно одна строка; ноль строк -> `CatalogError::NotFound`
    async fn select_by_id(&self, table: &str, id: &str) -> Result<Value, CatalogError>;

    /// Вставка строк, возвращает сохранённые строки
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, CatalogError>;

    /// Обновление полей строки, возвращает затронутые строки (возможно ни одной)
    async fn update(&self, table: &str, id: &str, fields: Value)
        -> Result<Vec<Value>, CatalogError>;

    /// Удаление по идентификатору. Ноль затронутых строк не считается ошибкой.
    async fn delete(&self, table: &str, id: &str) -> Result<(), CatalogError>;

    /// Загрузка объекта под заданным именем без перезаписи существующего
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), CatalogError>;

    /// Публичный адрес сохранённого объекта
    fn public_url(&self, bucket: &str, name: &str) -> String;
}

/// Создать клиент сервиса данных по конфигурации
pub fn connect(config: &DataServiceConfig) -> anyhow::Result<Arc<dyn DataService>> {
    let service: Arc<dyn DataService> = match config.kind {
        DataServiceKind::Postgrest => {
            tracing::info!("Data service: PostgREST at {}", config.url);
            Arc::new(postgrest::PostgrestClient::new(config)?)
        }
        DataServiceKind::Memory => {
            tracing::warn!("Data service: in-memory store, data is lost on restart");
            Arc::new(memory::MemoryDataService::new())
        }
    };
    Ok(service)
}
