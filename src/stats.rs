//! Per-function timing statistics.
//!
//! `FunctionStats` is shared by `Arc` between a [`Function`](crate::function::Function)
//! and any long-lived consumer (a report row, an exporter). Updates and resets go
//! through a mutex, so a reader always sees a complete aggregate.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// One timing sample: start and end timestamps in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    pub start: u64,
    pub end: u64,
}

impl Timer {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Elapsed nanoseconds. A timer that ends before it starts counts as zero.
    pub fn elapsed_nanos(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// Point-in-time copy of the aggregates, also the persisted form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub count: u64,
    pub total_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    pub variance_ns: f64,
}

impl StatsSnapshot {
    pub fn std_dev_ns(&self) -> f64 {
        self.variance_ns.sqrt()
    }
}

/// Running statistics over timer durations (Welford's online variance).
#[derive(Clone, Copy, Default)]
struct RunningStat {
    count: u64,
    total: u64,
    min: u64,
    max: u64,
    mean: f64,
    m2: f64,
}

impl RunningStat {
    fn add(&mut self, value: u64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.total = self.total.saturating_add(value);

        let v = value as f64;
        let delta = v - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (v - self.mean);
    }

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            count: self.count,
            total_ns: self.total,
            min_ns: self.min,
            max_ns: self.max,
            mean_ns: self.mean,
            variance_ns: if self.count == 0 {
                0.0
            } else {
                self.m2 / self.count as f64
            },
        }
    }

    fn from_snapshot(s: &StatsSnapshot) -> Self {
        Self {
            count: s.count,
            total: s.total_ns,
            min: s.min_ns,
            max: s.max_ns,
            mean: s.mean_ns,
            m2: s.variance_ns * s.count as f64,
        }
    }
}

/// Thread-safe timing statistics for one function.
#[derive(Default)]
pub struct FunctionStats {
    inner: Mutex<RunningStat>,
}

impl FunctionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        Self {
            inner: Mutex::new(RunningStat::from_snapshot(snapshot)),
        }
    }

    pub fn update(&self, timer: &Timer) {
        self.lock().add(timer.elapsed_nanos());
    }

    /// Zeroes all aggregates in place; holders of the `Arc` see the reset.
    pub fn reset(&self) {
        *self.lock() = RunningStat::default();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().snapshot()
    }

    /// Overwrites the aggregates in place with a persisted snapshot.
    pub fn restore(&self, snapshot: &StatsSnapshot) {
        *self.lock() = RunningStat::from_snapshot(snapshot);
    }

    pub fn count(&self) -> u64 {
        self.lock().count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunningStat> {
        // The aggregate is plain data, a panicked writer cannot leave it unusable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FunctionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FunctionStats").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_stats_are_zeroed() {
        let stats = FunctionStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_update_aggregates() {
        let stats = FunctionStats::new();
        stats.update(&Timer::new(100, 110)); // 10
        stats.update(&Timer::new(200, 230)); // 30
        stats.update(&Timer::new(300, 320)); // 20

        let s = stats.snapshot();
        assert_eq!(s.count, 3);
        assert_eq!(s.total_ns, 60);
        assert_eq!(s.min_ns, 10);
        assert_eq!(s.max_ns, 30);
        assert!((s.mean_ns - 20.0).abs() < 1e-9);
        // population variance of 10, 30, 20
        assert!((s.variance_ns - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_timer_counts_as_zero() {
        let stats = FunctionStats::new();
        stats.update(&Timer::new(50, 10));
        let s = stats.snapshot();
        assert_eq!(s.count, 1);
        assert_eq!(s.max_ns, 0);
    }

    #[test]
    fn test_reset_is_visible_through_shared_handle() {
        let stats = Arc::new(FunctionStats::new());
        let row = Arc::clone(&stats);
        stats.update(&Timer::new(0, 5));
        assert_eq!(row.count(), 1);

        stats.reset();
        assert_eq!(row.count(), 0);
        assert_eq!(row.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_snapshot_restore_keeps_aggregates() {
        let stats = FunctionStats::new();
        for d in [4, 8, 15, 16, 23, 42] {
            stats.update(&Timer::new(0, d));
        }
        let restored = FunctionStats::from_snapshot(&stats.snapshot());
        restored.update(&Timer::new(0, 10));
        stats.update(&Timer::new(0, 10));

        let a = stats.snapshot();
        let b = restored.snapshot();
        assert_eq!(a.count, b.count);
        assert_eq!(a.total_ns, b.total_ns);
        assert!((a.variance_ns - b.variance_ns).abs() < 1e-6);
    }

    #[test]
    fn test_concurrent_updates() {
        let stats = Arc::new(FunctionStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = Arc::clone(&stats);
                thread::spawn(move || {
                    for i in 0..1000 {
                        s.update(&Timer::new(i, i + 2));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("worker thread panicked");
        }
        let s = stats.snapshot();
        assert_eq!(s.count, 4000);
        assert_eq!(s.total_ns, 8000);
    }
}
