//! Fixed-interval dispatch gate.
//!
//! Successive calls to [`FixedIntervalGate::ready`] are released at least
//! `interval` apart. The gate does not adapt to rate-limit responses.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct FixedIntervalGate {
    interval: Duration,
    last_release: Mutex<Option<Instant>>,
}

impl FixedIntervalGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_release: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next release slot and return the release instant.
    /// The first call is released immediately.
    pub async fn ready(&self) -> Instant {
        let mut last = self.last_release.lock().await;
        if let Some(previous) = *last {
            sleep_until(previous + self.interval).await;
        }
        let now = Instant::now();
        *last = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_spacing() {
        let gate = FixedIntervalGate::new(Duration::from_secs(1));
        let mut releases = Vec::new();
        for _ in 0..5 {
            releases.push(gate.ready().await);
        }
        for pair in releases.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_release_is_immediate() {
        let gate = FixedIntervalGate::new(Duration::from_secs(30));
        let start = Instant::now();
        let released = gate.ready().await;
        assert_eq!(released, start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_gate_serializes_callers() {
        let gate = Arc::new(FixedIntervalGate::new(Duration::from_millis(250)));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move { gate.ready().await }));
        }
        let mut releases = Vec::new();
        for handle in handles {
            releases.push(handle.await.unwrap());
        }
        releases.sort();
        for pair in releases.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(250));
        }
    }

    #[tokio::test]
    async fn test_zero_interval_never_waits() {
        let gate = FixedIntervalGate::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..100 {
            gate.ready().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
