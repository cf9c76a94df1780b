// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rate limiting for search requests

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Enforces a minimum wall-clock interval between consecutive searches
///
/// This is a strict spacing limiter, not a token bucket: only the single
/// most recent completed search matters. The mutex serializes concurrent
/// callers so the spacing holds even across tasks.
pub struct SearchRateLimiter {
    min_interval: Option<Duration>,
    last_search: Mutex<Option<Instant>>,
}

impl SearchRateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `min_interval` - Minimum spacing between searches, `None` for no limit
    pub fn new(min_interval: Option<Duration>) -> Self {
        Self {
            min_interval,
            last_search: Mutex::new(None),
        }
    }

    /// Wait until the next search may proceed, then record the current time
    ///
    /// The very first call never waits. With no interval configured this is
    /// a no-op.
    pub async fn gate(&self) {
        let Some(min_interval) = self.min_interval else {
            return;
        };

        let mut last_search = self.last_search.lock().await;
        if let Some(last) = *last_search {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                sleep(min_interval - elapsed).await;
            }
        }
        *last_search = Some(Instant::now());
    }

    /// Get the configured minimum interval
    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval
    }
}
