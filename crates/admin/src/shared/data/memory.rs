use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{DataService, RowPage};
use crate::shared::error::CatalogError;

/// Сервис данных в памяти процесса.
///
/// Повторяет контракт внешнего сервиса: целочисленные `id` выдаются при вставке,
/// сортировка строк побайтовая (регистр учитывается), удаление отсутствующей
/// строки не является ошибкой, объект в хранилище не перезаписывается.
/// Используется для локального запуска и в тестах.
#[derive(Default)]
pub struct MemoryDataService {
    tables: Mutex<HashMap<String, Table>>,
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    fault: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

#[derive(Default)]
struct Table {
    rows: Vec<Map<String, Value>>,
    next_id: i64,
    unique: Vec<String>,
}

impl Table {
    fn check_unique(&self, row: &Map<String, Value>, skip_id: Option<&str>) -> Result<(), CatalogError> {
        for column in &self.unique {
            let Some(value) = row.get(column) else { continue };
            let clash = self.rows.iter().any(|existing| {
                skip_id.map_or(true, |id| id_of(existing) != id) && existing.get(column) == Some(value)
            });
            if clash {
                return Err(CatalogError::Backend {
                    message: format!(
                        "duplicate key value violates unique constraint on \"{}\"",
                        column
                    ),
                    code: Some("23505".into()),
                });
            }
        }
        Ok(())
    }
}

fn id_of(row: &Map<String, Value>) -> String {
    match row.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Порядок значений колонки: числа по значению, строки побайтово, null в конце
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.as_bytes().cmp(y.as_bytes()),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn as_object(value: Value) -> Result<Map<String, Value>, CatalogError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CatalogError::backend(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

impl MemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Объявить колонку уникальной (нарушение даёт ошибку сервиса при записи)
    pub fn with_unique(self, table: &str, column: &str) -> Self {
        if let Ok(mut tables) = self.tables.lock() {
            tables
                .entry(table.to_string())
                .or_default()
                .unique
                .push(column.to_string());
        }
        self
    }

    /// Следующий вызов любой операции завершится транспортной ошибкой
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = Some(message.into());
        }
    }

    /// Журнал выполненных операций ("select products", "upload bucket/name", ...)
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Содержимое сохранённого объекта
    pub fn object(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()?
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|t| t.get(table).map_or(0, |t| t.rows.len()))
            .unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), CatalogError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        let fault = self.fault.lock().ok().and_then(|mut f| f.take());
        match fault {
            Some(message) => Err(CatalogError::backend(message)),
            None => Ok(()),
        }
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Table>>, CatalogError> {
        self.tables
            .lock()
            .map_err(|_| CatalogError::backend("memory store poisoned"))
    }
}

#[async_trait]
impl DataService for MemoryDataService {
    async fn select_range(
        &self,
        table: &str,
        order_by: &str,
        from: usize,
        to: usize,
    ) -> Result<RowPage, CatalogError> {
        self.record(format!("select {}", table))?;
        let tables = self.tables()?;
        let Some(t) = tables.get(table) else {
            return Ok(RowPage { rows: vec![], total: 0 });
        };

        let mut rows: Vec<&Map<String, Value>> = t.rows.iter().collect();
        rows.sort_by(|a, b| {
            compare_values(a.get(order_by), b.get(order_by)).then_with(|| {
                compare_values(a.get("id"), b.get("id"))
            })
        });

        let total = rows.len();
        let page = rows
            .into_iter()
            .skip(from)
            .take(to.saturating_sub(from) + 1)
            .map(|r| Value::Object(r.clone()))
            .collect();
        Ok(RowPage { rows: page, total })
    }

    async fn select_by_id(&self, table: &str, id: &str) -> Result<Value, CatalogError> {
        self.record(format!("get {}", table))?;
        let tables = self.tables()?;
        tables
            .get(table)
            .and_then(|t| t.rows.iter().find(|r| id_of(r) == id))
            .map(|r| Value::Object(r.clone()))
            .ok_or_else(|| CatalogError::not_found(table, id))
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, CatalogError> {
        self.record(format!("insert {}", table))?;
        let mut tables = self.tables()?;
        let t = tables.entry(table.to_string()).or_default();

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = as_object(row)?;
            t.check_unique(&row, None)?;
            match row.get("id").and_then(Value::as_i64) {
                Some(id) => t.next_id = t.next_id.max(id),
                None => {
                    t.next_id += 1;
                    row.insert("id".into(), Value::from(t.next_id));
                }
            }
            row.entry("created_at")
                .or_insert_with(|| Value::from(chrono::Utc::now().to_rfc3339()));
            t.rows.push(row.clone());
            inserted.push(Value::Object(row));
        }
        Ok(inserted)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        fields: Value,
    ) -> Result<Vec<Value>, CatalogError> {
        self.record(format!("update {}", table))?;
        let fields = as_object(fields)?;
        let mut tables = self.tables()?;
        let Some(t) = tables.get_mut(table) else {
            return Ok(vec![]);
        };
        t.check_unique(&fields, Some(id))?;

        let mut updated = Vec::new();
        for row in t.rows.iter_mut().filter(|r| id_of(r) == id) {
            for (key, value) in &fields {
                if key != "id" {
                    row.insert(key.clone(), value.clone());
                }
            }
            updated.push(Value::Object(row.clone()));
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), CatalogError> {
        self.record(format!("delete {}", table))?;
        let mut tables = self.tables()?;
        if let Some(t) = tables.get_mut(table) {
            t.rows.retain(|r| id_of(r) != id);
        }
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), CatalogError> {
        self.record(format!("upload {}/{}", bucket, name))
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| CatalogError::Storage("memory store poisoned".into()))?;
        let key = (bucket.to_string(), name.to_string());
        if objects.contains_key(&key) {
            return Err(CatalogError::Storage("The resource already exists".into()));
        }
        objects.insert(key, bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("memory://{}/{}", bucket, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_range_is_ordered_case_sensitive_with_exact_count() {
        let ds = MemoryDataService::new();
        let rows = ["beta", "Alpha", "alpha", "Gamma"]
            .iter()
            .map(|n| json!({ "category_name": n }))
            .collect();
        ds.insert("product_category", rows).await.unwrap();

        let page = ds
            .select_range("product_category", "category_name", 0, 2)
            .await
            .unwrap();
        let names: Vec<&str> = page
            .rows
            .iter()
            .map(|r| r["category_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alpha", "Gamma", "alpha"]);
        assert_eq!(page.total, 4);

        let tail = ds
            .select_range("product_category", "category_name", 3, 5)
            .await
            .unwrap();
        assert_eq!(tail.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_unique_violation_and_missing_delete() {
        let ds = MemoryDataService::new().with_unique("product_category", "category_name");
        ds.insert("product_category", vec![json!({ "category_name": "Toys" })])
            .await
            .unwrap();
        let err = ds
            .insert("product_category", vec![json!({ "category_name": "Toys" })])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Backend { code: Some(ref c), .. } if c == "23505"));

        assert!(ds.delete("product_category", "999").await.is_ok());
        assert_eq!(ds.row_count("product_category"), 1);
    }

    #[tokio::test]
    async fn test_upload_never_overwrites() {
        let ds = MemoryDataService::new();
        ds.upload("b", "x.png", vec![1], "image/png").await.unwrap();
        let err = ds.upload("b", "x.png", vec![2], "image/png").await.unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
        assert_eq!(ds.object("b", "x.png"), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_fault_applies_once() {
        let ds = MemoryDataService::new();
        ds.fail_next("connection reset");
        let err = ds.delete("products", "1").await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert!(ds.delete("products", "1").await.is_ok());
        assert_eq!(ds.calls(), vec!["delete products", "delete products"]);
    }
}
