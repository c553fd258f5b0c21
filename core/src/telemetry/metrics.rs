use serde::Serialize;
use std::sync::Mutex;

/// Counters describing how generation requests were served.
pub struct GenerationMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub remote: usize,
    pub mock: usize,
    pub fallback_attempts: usize,
    pub failures: usize,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_remote(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.remote += 1;
        }
    }

    pub fn record_mock(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.mock += 1;
        }
    }

    pub fn record_fallback(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.fallback_attempts += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failures += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = GenerationMetrics::new();
        metrics.record_mock();
        metrics.record_mock();
        metrics.record_fallback();
        metrics.record_failure();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                remote: 0,
                mock: 2,
                fallback_attempts: 1,
                failures: 1,
            }
        );
    }
}
