use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Per-target record of the last stop dispatch.
///
/// Entries are never evicted; the registry lives as long as the session.
#[derive(Debug)]
pub struct StopThrottle {
    window: Duration,
    last_dispatch: Mutex<HashMap<String, Instant>>,
}

impl StopThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_dispatch: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Claim a dispatch slot for `target_id`.
    ///
    /// Returns false if a dispatch for the same id was issued less than
    /// `window` ago. Otherwise records now and returns true. Check and
    /// record happen under one lock, so concurrent callers for the same id
    /// get exactly one true.
    pub fn try_acquire(&self, target_id: &str) -> bool {
        let now = Instant::now();
        let mut last_dispatch = self.last_dispatch.lock();
        if let Some(previous) = last_dispatch.get(target_id) {
            if now.duration_since(*previous) < self.window {
                return false;
            }
        }
        last_dispatch.insert(target_id.to_string(), now);
        true
    }

    pub fn last_dispatch(&self, target_id: &str) -> Option<Instant> {
        self.last_dispatch.lock().get(target_id).copied()
    }

    pub fn len(&self) -> usize {
        self.last_dispatch.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_dispatch.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_window_boundaries() {
        let throttle = StopThrottle::new(Duration::from_millis(3000));
        assert!(throttle.try_acquire("ev1"));
        assert!(!throttle.try_acquire("ev1"));

        tokio::time::advance(Duration::from_millis(2999)).await;
        assert!(!throttle.try_acquire("ev1"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(throttle.try_acquire("ev1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_independent() {
        let throttle = StopThrottle::new(Duration::from_millis(3000));
        assert!(throttle.try_acquire("ev1"));
        assert!(throttle.try_acquire("conv1"));
        assert_eq!(throttle.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppressed_call_keeps_original_timestamp() {
        let throttle = StopThrottle::new(Duration::from_millis(3000));
        assert!(throttle.try_acquire("ev1"));
        let first = throttle.last_dispatch("ev1").unwrap();

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(!throttle.try_acquire("ev1"));
        assert_eq!(throttle.last_dispatch("ev1"), Some(first));
    }

    #[test]
    fn test_new_registry_is_empty() {
        let throttle = StopThrottle::new(Duration::from_millis(10));
        assert!(throttle.is_empty());
        assert!(throttle.last_dispatch("ev1").is_none());
        assert_eq!(throttle.window(), Duration::from_millis(10));
    }
}
