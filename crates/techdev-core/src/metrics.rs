use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Destination for operation timings and counters.
pub trait MetricsSink: Send + Sync {
    fn record(&self, name: &str, value: f64);
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
}

/// In-memory sink keeping at most `capacity` samples per metric, none older
/// than `window`.
pub struct WindowedMetrics {
    capacity: usize,
    window: Duration,
    samples: Mutex<HashMap<String, VecDeque<(DateTime<Utc>, f64)>>>,
}

impl WindowedMetrics {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            window,
            samples: Mutex::new(HashMap::new()),
        }
    }

    pub fn record_at(&self, name: &str, value: f64, now: DateTime<Utc>) {
        let Ok(mut samples) = self.samples.lock() else {
            return;
        };
        let series = samples.entry(name.to_string()).or_default();
        series.push_back((now, value));
        prune(series, now - self.window);
        while series.len() > self.capacity {
            series.pop_front();
        }
    }

    pub fn summary(&self, name: &str) -> Option<MetricSummary> {
        self.summary_at(name, Utc::now())
    }

    pub fn summary_at(&self, name: &str, now: DateTime<Utc>) -> Option<MetricSummary> {
        let mut samples = self.samples.lock().ok()?;
        let series = samples.get_mut(name)?;
        prune(series, now - self.window);
        if series.is_empty() {
            return None;
        }
        let count = series.len();
        let sum: f64 = series.iter().map(|(_, v)| v).sum();
        let max = series.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
        Some(MetricSummary {
            count,
            mean: sum / count as f64,
            max,
        })
    }

    /// Names with at least one sample, sorted.
    pub fn names(&self) -> Vec<String> {
        let Ok(samples) = self.samples.lock() else {
            return Vec::new();
        };
        let mut names: Vec<String> = samples
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(n, _)| n.clone())
            .collect();
        names.sort();
        names
    }
}

fn prune(series: &mut VecDeque<(DateTime<Utc>, f64)>, cutoff: DateTime<Utc>) {
    while series.front().is_some_and(|(t, _)| *t < cutoff) {
        series.pop_front();
    }
}

impl MetricsSink for WindowedMetrics {
    fn record(&self, name: &str, value: f64) {
        self.record_at(name, value, Utc::now());
    }
}
