use std::collections::HashMap;

/// Cancel-and-reschedule deadline map keyed by a stable identity (selector).
/// Scheduling an already-pending key replaces its payload and restarts its
/// deadline, so at most one flush is pending per key.
#[derive(Debug)]
pub struct DebounceMap<T> {
    window_ms: i64,
    pending: HashMap<String, Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: i64,
}

impl<T> DebounceMap<T> {
    pub fn new(window_ms: i64) -> Self {
        Self { window_ms, pending: HashMap::new() }
    }

    pub fn schedule(&mut self, key: &str, value: T, now_ms: i64) {
        self.pending
            .insert(key.to_string(), Pending { value, deadline: now_ms + self.window_ms });
    }

    /// Remove and return entries whose deadline has passed, ordered by
    /// deadline (key as tie-breaker, for deterministic flush order).
    pub fn take_expired(&mut self, now_ms: i64) -> Vec<(String, T)> {
        let expired_keys: Vec<String> = {
            let mut keys: Vec<(&String, i64)> = self
                .pending
                .iter()
                .filter(|(_, p)| p.deadline <= now_ms)
                .map(|(k, p)| (k, p.deadline))
                .collect();
            keys.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
            keys.into_iter().map(|(k, _)| k.clone()).collect()
        };
        expired_keys
            .into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|p| (key, p.value)))
            .collect()
    }

    pub fn cancel(&mut self, key: &str) -> Option<T> {
        self.pending.remove(key).map(|p| p.value)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
