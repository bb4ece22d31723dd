use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub timestamp: u64,
    pub name: String,
    pub mode: String,
    pub duration_ms: u64,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

/// An append-only history of resolutions (§4.6, §5). A dedicated lock
/// guards the vector; readers get a cloned, stable snapshot.
#[derive(Debug, Default)]
pub struct Metrics {
    history: Mutex<Vec<MetricEntry>>,
}

impl Metrics {
    pub fn record(&self, entry: MetricEntry) {
        self.history.lock().expect("metrics lock poisoned").push(entry);
    }

    pub fn history(&self) -> Vec<MetricEntry> {
        self.history.lock().expect("metrics lock poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.history.lock().expect("metrics lock poisoned").len()
    }

    pub fn mean_duration_ms(&self) -> f64 {
        let history = self.history.lock().expect("metrics lock poisoned");
        if history.is_empty() {
            return 0.0;
        }
        let total: u64 = history.iter().map(|entry| entry.duration_ms).sum();
        total as f64 / history.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(duration_ms: u64) -> MetricEntry {
        MetricEntry {
            timestamp: 0,
            name: "example.com".to_string(),
            mode: "recursive".to_string(),
            duration_ms,
            status: Status::Success,
        }
    }

    #[test]
    fn count_and_mean_reflect_recorded_history() {
        let metrics = Metrics::default();
        metrics.record(entry(10));
        metrics.record(entry(30));
        assert_eq!(metrics.count(), 2);
        assert_eq!(metrics.mean_duration_ms(), 20.0);
    }
}
