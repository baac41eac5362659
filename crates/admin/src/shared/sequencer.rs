use std::sync::atomic::{AtomicU64, Ordering};

/// Номер запроса, выданный секвенсором
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Выдаёт возрастающие номера запросов и отвечает, какой из них последний.
///
/// Ответ на запрос, который уже не последний, нужно отбросить.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_token_is_latest() {
        let seq = RequestSequencer::new();
        let first = seq.next();
        assert!(seq.is_latest(first));
        let second = seq.next();
        assert!(second > first);
        assert!(!seq.is_latest(first));
        assert!(seq.is_latest(second));
    }
}
