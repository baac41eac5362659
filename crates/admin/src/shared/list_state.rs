//! Состояние страницы списка (категории, товары) без привязки к отрисовке.
//!
//! Смена страницы выдаёт номер запроса; ответ применяется только если он
//! пришёл на последний запрос. Предыдущие данные остаются видны, пока
//! грузится новая страница.

use contracts::shared::pagination::{next_page, prev_page, PageRequest, PageResult};
use std::future::Future;
use tokio::sync::Mutex;

use super::error::CatalogError;
use super::sequencer::{RequestSequencer, RequestToken};

/// Что произошло с ответом
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// Ответ на устаревший запрос отброшен
    Stale,
}

#[derive(Debug)]
pub struct ListState<T> {
    page: usize,
    limit: usize,
    data: Option<PageResult<T>>,
    error: Option<String>,
    is_loading: bool,
    sequencer: RequestSequencer,
}

impl<T> ListState<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            data: None,
            error: None,
            is_loading: false,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn data(&self) -> Option<&PageResult<T>> {
        self.data.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.data.as_ref().map_or(&[], |d| d.items.as_slice())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn total_pages(&self) -> usize {
        self.data.as_ref().map_or(1, |d| d.total_pages.max(1))
    }

    /// Начать загрузку страницы
    pub fn request(&mut self, page: usize) -> (RequestToken, PageRequest) {
        self.page = page.max(1);
        self.is_loading = true;
        (
            self.sequencer.next(),
            PageRequest::new(self.page, self.limit),
        )
    }

    pub fn request_prev(&mut self) -> (RequestToken, PageRequest) {
        self.request(prev_page(self.page))
    }

    pub fn request_next(&mut self) -> (RequestToken, PageRequest) {
        self.request(next_page(self.page, self.total_pages()))
    }

    /// Применить ответ, если он пришёл на последний запрос
    pub fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<PageResult<T>, CatalogError>,
    ) -> Applied {
        if !self.sequencer.is_latest(token) {
            tracing::debug!("Dropping stale list response for page {}", self.page);
            return Applied::Stale;
        }
        self.is_loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        Applied::Applied
    }
}

/// Загрузить страницу в разделяемое состояние.
///
/// Блокировка держится только на время `request`/`resolve`, сам запрос идёт
/// без неё, поэтому параллельные переходы по страницам возможны; побеждает
/// последний запрошенный.
pub async fn load_page<T, F, Fut>(state: &Mutex<ListState<T>>, page: usize, fetch: F) -> Applied
where
    F: FnOnce(PageRequest) -> Fut,
    Fut: Future<Output = Result<PageResult<T>, CatalogError>>,
{
    let (token, request) = state.lock().await.request(page);
    let result = fetch(request).await;
    state.lock().await.resolve(token, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    fn page_of(page: usize, items: Vec<&'static str>) -> PageResult<&'static str> {
        PageResult::new(items, 30, PageRequest::new(page, 10))
    }

    #[tokio::test]
    async fn test_latest_request_wins_even_if_it_resolves_first() {
        let state = Arc::new(Mutex::new(ListState::new(10)));
        let (slow_tx, slow_rx) = oneshot::channel();
        let (fast_tx, fast_rx) = oneshot::channel();

        let s = state.clone();
        let slow = tokio::spawn(async move {
            load_page(&s, 2, |_| async move {
                slow_rx.await.map_err(|_| CatalogError::backend("dropped"))
            })
            .await
        });
        // даём первому запросу получить номер раньше второго
        while !state.lock().await.is_loading() {
            tokio::task::yield_now().await;
        }

        let s = state.clone();
        let fast = tokio::spawn(async move {
            load_page(&s, 3, |_| async move {
                fast_rx.await.map_err(|_| CatalogError::backend("dropped"))
            })
            .await
        });
        while state.lock().await.page() != 3 {
            tokio::task::yield_now().await;
        }

        fast_tx.send(page_of(3, vec!["c"])).unwrap();
        assert_eq!(fast.await.unwrap(), Applied::Applied);
        slow_tx.send(page_of(2, vec!["b"])).unwrap();
        assert_eq!(slow.await.unwrap(), Applied::Stale);

        let st = state.lock().await;
        assert_eq!(st.page(), 3);
        assert_eq!(st.items(), &["c"]);
        assert!(!st.is_loading());
    }

    #[test]
    fn test_error_keeps_previous_data() {
        let mut st = ListState::new(10);
        let (t1, _) = st.request(1);
        st.resolve(t1, Ok(page_of(1, vec!["a"])));

        let (t2, req) = st.request_next();
        assert_eq!(req, PageRequest::new(2, 10));
        st.resolve(t2, Err(CatalogError::backend("timeout")));

        assert_eq!(st.error(), Some("timeout"));
        assert_eq!(st.items(), &["a"]);
    }

    #[test]
    fn test_prev_and_next_are_clamped() {
        let mut st: ListState<&str> = ListState::new(10);
        let (_, req) = st.request_prev();
        assert_eq!(req.page, 1);
        // без данных считается одна страница
        let (_, req) = st.request_next();
        assert_eq!(req.page, 1);
    }
}
