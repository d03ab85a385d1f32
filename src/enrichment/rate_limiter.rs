//! Fixed-interval request pacing.
//!
//! Not a token bucket: consecutive requests are simply kept at least
//! `interval` apart, whatever their outcome.

use std::cell::Cell;
use std::time::{Duration, Instant};

pub struct RateLimiter {
    interval: Duration,
    last_request: Cell<Option<Instant>>,
    requests: Cell<u64>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Cell::new(None),
            requests: Cell::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until a request may be issued, then records it.
    pub fn wait(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
        self.requests.set(self.requests.get() + 1);
    }

    /// Number of requests let through so far.
    pub fn requests_issued(&self) -> u64 {
        self.requests.get()
    }
}
