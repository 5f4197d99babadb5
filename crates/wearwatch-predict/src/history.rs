use chrono::{DateTime, Utc};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_TREND_WINDOW: usize = 50;
/// Fewer samples than this and the slope is unknown.
pub const MIN_TREND_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPoint {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Bounded FIFO of `(value, timestamp)` pairs for one metric.
///
/// Statistics are recomputed on demand over the retained window.
#[derive(Debug, Clone)]
pub struct MetricHistory {
    capacity: usize,
    data: VecDeque<MetricPoint>,
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MetricHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            data: VecDeque::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, value: f64, timestamp: DateTime<Utc>) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(MetricPoint { value, timestamp });
    }

    /// Mean of the last `count` samples, or of every retained sample.
    pub fn average(&self, count: Option<usize>) -> Option<f64> {
        let take = count.unwrap_or(self.data.len()).min(self.data.len());
        if take == 0 {
            return None;
        }
        let sum: f64 = self.data.iter().rev().take(take).map(|p| p.value).sum();
        Some(sum / take as f64)
    }

    /// Least-squares slope of value against sample index over the last `window` samples.
    ///
    /// Returns `None` with fewer than [`MIN_TREND_SAMPLES`] samples in the window.
    pub fn trend_slope(&self, window: usize) -> Option<f64> {
        let n = window.min(self.data.len());
        if n < MIN_TREND_SAMPLES {
            return None;
        }

        let start = self.data.len() - n;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_xy = 0.0;
        let mut sum_x2 = 0.0;

        for (i, point) in self.data.iter().skip(start).enumerate() {
            let x = i as f64;
            let y = point.value;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
        }

        let n = n as f64;
        let denom = n * sum_x2 - sum_x * sum_x;
        if denom.abs() < f64::EPSILON {
            return Some(0.0);
        }
        Some((n * sum_xy - sum_x * sum_y) / denom)
    }

    /// Change per second between the oldest and newest retained samples.
    ///
    /// `None` with fewer than two samples or when no time elapsed between them.
    pub fn rate_of_change(&self) -> Option<f64> {
        let first = self.data.front()?;
        let last = self.data.back()?;
        if self.data.len() < 2 {
            return None;
        }
        let elapsed = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0;
        // Out-of-order timestamps give a meaningless rate.
        if elapsed <= 0.0 {
            return None;
        }
        Some((last.value - first.value) / elapsed)
    }

    pub fn latest(&self) -> Option<MetricPoint> {
        self.data.back().copied()
    }

    pub fn first(&self) -> Option<MetricPoint> {
        self.data.front().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricPoint> {
        self.data.iter()
    }
}
