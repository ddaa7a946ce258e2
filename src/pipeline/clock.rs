//! Time source for the supervisor

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Mutex;
use std::time::Duration;

/// Wall clock plus sleeping, injectable for tests
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    async fn sleep(&self, duration: Duration);
}

/// Real time via tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only moves when slept on; records every sleep
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(DateTime<Local>, Vec<Duration>)>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            state: Mutex::new((start, Vec::new())),
        }
    }

    /// Every sleep requested so far
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().1.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, (DateTime<Local>, Vec<Duration>)> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.lock().0
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.lock();
        state.0 += chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        state.1.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_manual_clock_advances_on_sleep() {
        let start = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);

        clock.sleep(Duration::from_secs(3600)).await;
        clock.sleep(Duration::from_secs(60)).await;

        assert_eq!(clock.now(), start + chrono::Duration::seconds(3660));
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(3600), Duration::from_secs(60)]
        );
    }
}
