//! Кэш страниц списков с инвалидацией по тегу.
//!
//! Тег: имя коллекции сущности. Любая успешная запись (создание, изменение,
//! удаление) сбрасывает все страницы своего тега целиком.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::CatalogError;

/// Ключ страницы в кэше
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub tag: &'static str,
    pub page: usize,
    pub limit: usize,
}

impl QueryKey {
    pub fn new(tag: &'static str, page: usize, limit: usize) -> Self {
        Self { tag, page, limit }
    }
}

/// Разрешение на запись результата чтения, выданное до запроса
#[derive(Debug, Clone, Copy)]
pub struct FillTicket {
    key: QueryKey,
    generation: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Arc<dyn Any + Send + Sync>>,
    generations: HashMap<&'static str, u64>,
}

/// Общий кэш страниц; клоны разделяют одно состояние
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<Mutex<CacheState>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.state()
            .entries
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Запомнить поколение тега перед чтением из сервиса данных
    pub fn begin_fill(&self, key: QueryKey) -> FillTicket {
        let generation = self.state().generations.get(key.tag).copied().unwrap_or(0);
        FillTicket { key, generation }
    }

    /// Сохранить прочитанную страницу.
    ///
    /// Если тег был инвалидирован после `begin_fill`, результат мог устареть
    /// и не сохраняется; возвращает `false`.
    pub fn complete_fill<T: Send + Sync + 'static>(&self, ticket: FillTicket, value: T) -> bool {
        let mut state = self.state();
        let current = state.generations.get(ticket.key.tag).copied().unwrap_or(0);
        if current != ticket.generation {
            tracing::debug!("Discarding stale page {:?}", ticket.key);
            return false;
        }
        state.entries.insert(ticket.key, Arc::new(value));
        true
    }

    /// Сбросить все страницы тега. Возвращает число удалённых страниц.
    pub fn invalidate_tag(&self, tag: &'static str) -> usize {
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|key, _| key.tag != tag);
        let removed = before - state.entries.len();
        *state.generations.entry(tag).or_insert(0) += 1;
        tracing::debug!("Invalidated {} cached page(s) of {}", removed, tag);
        removed
    }

    /// Страница из кэша или, при промахе, из `fetch` с сохранением результата
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, CatalogError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        if let Some(hit) = self.get::<T>(&key) {
            tracing::debug!("Cache hit {:?}", key);
            return Ok(hit);
        }
        let ticket = self.begin_fill(key);
        let value = fetch().await?;
        self.complete_fill(ticket, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_get() {
        let cache = QueryCache::new();
        let key = QueryKey::new("products", 1, 12);
        let ticket = cache.begin_fill(key);
        assert!(cache.complete_fill(ticket, vec!["a".to_string()]));
        assert_eq!(cache.get::<Vec<String>>(&key), Some(vec!["a".to_string()]));
        // другой тип под тем же ключом не отдаётся
        assert_eq!(cache.get::<Vec<i32>>(&key), None);
    }

    #[test]
    fn test_invalidate_drops_all_pages_of_tag_only() {
        let cache = QueryCache::new();
        for page in 1..=3 {
            let t = cache.begin_fill(QueryKey::new("products", page, 12));
            cache.complete_fill(t, page);
        }
        let t = cache.begin_fill(QueryKey::new("product_category", 1, 10));
        cache.complete_fill(t, 1usize);

        assert_eq!(cache.invalidate_tag("products"), 3);
        assert_eq!(cache.len(), 1);
        assert!(cache.get::<usize>(&QueryKey::new("product_category", 1, 10)).is_some());
    }

    #[tokio::test]
    async fn test_get_or_fetch_hits_cache_second_time() {
        let cache = QueryCache::new();
        let key = QueryKey::new("products", 1, 12);
        let calls = std::sync::atomic::AtomicUsize::new(0);
        for _ in 0..2 {
            let v: usize = cache
                .get_or_fetch(key, || async {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(v, 7);
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fill_started_before_invalidation_is_discarded() {
        let cache = QueryCache::new();
        let key = QueryKey::new("product_category", 1, 10);
        let ticket = cache.begin_fill(key);
        cache.invalidate_tag("product_category");
        assert!(!cache.complete_fill(ticket, 1usize));
        assert!(cache.is_empty());

        let fresh = cache.begin_fill(key);
        assert!(cache.complete_fill(fresh, 2usize));
        assert_eq!(cache.get::<usize>(&key), Some(2));
    }
}
