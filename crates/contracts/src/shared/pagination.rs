//! Арифметика постраничного вывода.
//!
//! Страницы нумеруются с 1. Диапазон записей для внешнего сервиса данных
//! задаётся включительными смещениями от нуля.

use serde::{Deserialize, Serialize};

/// Размер страницы по умолчанию (списки категорий и товаров)
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Верхняя граница размера страницы, которую принимает API
pub const MAX_PAGE_SIZE: usize = 1000;

/// Диапазон смещений `(from, to)` для страницы `page` размером `limit`.
///
/// `to` включительно, поэтому `to - from + 1 == limit`.
///
/// # Примеры
/// ```
/// use contracts::shared::pagination::range_for;
/// assert_eq!(range_for(1, 12), (0, 11));
/// assert_eq!(range_for(3, 10), (20, 29));
/// ```
pub fn range_for(page: usize, limit: usize) -> (usize, usize) {
    debug_assert!(page >= 1, "pages are 1-based");
    debug_assert!(limit > 0, "limit must be positive");
    let limit = limit.max(1);
    let from = page.max(1).saturating_sub(1).saturating_mul(limit);
    let to = from.saturating_add(limit - 1);
    (from, to)
}

/// Количество страниц для `total` записей, не меньше 1.
pub fn page_count(total: usize, limit: usize) -> usize {
    debug_assert!(limit > 0, "limit must be positive");
    total.div_ceil(limit.max(1)).max(1)
}

/// Кнопка "Назад": не уходит левее первой страницы
pub fn prev_page(page: usize) -> usize {
    page.saturating_sub(1).max(1)
}

/// Кнопка "Вперёд": не уходит правее последней страницы
pub fn next_page(page: usize, total_pages: usize) -> usize {
    (page + 1).min(total_pages.max(1))
}

/// Параметры запроса страницы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Приводит параметры к допустимым: page >= 1, 1 <= limit <= MAX_PAGE_SIZE
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn range(&self) -> (usize, usize) {
        range_for(self.page, self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Результат запроса страницы. Никогда не сохраняется, пересчитывается при каждом чтении.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
    pub limit: usize,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total_count: usize, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            total_pages: page_count(total_count, request.limit),
            page: request.page,
            limit: request.limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            total_pages: self.total_pages,
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(page_count(20, 10), 2);
        assert_eq!(page_count(1, 12), 1);
        assert_eq!(page_count(13, 12), 2);
    }

    #[test]
    fn test_range_for_first_pages() {
        assert_eq!(range_for(1, 10), (0, 9));
        assert_eq!(range_for(2, 10), (10, 19));
        assert_eq!(range_for(1, 1), (0, 0));
    }

    #[test]
    fn test_prev_next_are_clamped() {
        assert_eq!(prev_page(1), 1);
        assert_eq!(prev_page(4), 3);
        assert_eq!(next_page(3, 3), 3);
        assert_eq!(next_page(1, 3), 2);
        // пустой список всё равно показывает одну страницу
        assert_eq!(next_page(1, 0), 1);
    }

    #[test]
    fn test_normalized_request() {
        let req = PageRequest::new(0, 0).normalized();
        assert_eq!(req, PageRequest::new(1, 1));
        let req = PageRequest::new(2, 50_000).normalized();
        assert_eq!(req.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_result_flags() {
        let result = PageResult::new(vec![1, 2], 25, PageRequest::new(2, 10));
        assert_eq!(result.total_pages, 3);
        assert!(result.has_prev());
        assert!(result.has_next());

        let empty: PageResult<i32> = PageResult::new(vec![], 0, PageRequest::new(1, 10));
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_prev());
        assert!(!empty.has_next());
    }

    proptest! {
        #[test]
        fn range_spans_exactly_limit(page in 1usize..100_000, limit in 1usize..10_000) {
            let (from, to) = range_for(page, limit);
            prop_assert_eq!(to - from + 1, limit);
            prop_assert_eq!(from, (page - 1) * limit);
        }

        #[test]
        fn pages_cover_total(total in 0usize..1_000_000, limit in 1usize..10_000) {
            let pages = page_count(total, limit);
            prop_assert!(pages >= 1);
            prop_assert!(pages * limit >= total);
            if total > 0 {
                prop_assert!((pages - 1) * limit < total);
            }
        }
    }
}
