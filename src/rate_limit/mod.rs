//! Fixed-window request admission
//!
//! Per-identity request counting over a fixed time window, used to guard the
//! expensive LLM endpoints. Different endpoints construct differently
//! configured limiters (e.g. 2 requests/30s for generation, 5/60s for
//! analysis) instead of copy-pasting the counting logic.

use crate::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;


/// Per-identity window state. Rotated lazily on the next admission check
/// after expiry, never swept in the background.
#[derive(Debug, Clone)]
struct RateWindow {
    count: u32,
    window_start_ms: u64,
}

/// Fixed-window, per-identity request limiter.
///
/// Admits at most `max_requests` per identity per window. Identities are
/// caller-supplied strings (IP address, user id, email). Attempts are counted
/// even when rejected, so a caller retrying inside a blocked window stays
/// blocked until the window rotates.
///
/// Fixed-window counting can admit up to `2 * max_requests` straddling a
/// window boundary; this is accepted imprecision for abuse deterrence, not
/// hard quota enforcement. State is process-local: across N instances the
/// effective limit is `max_requests * N`. A deployment needing a true global
/// limit must put a shared store behind this interface.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: RwLock<HashMap<String, RateWindow>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` per identity per `window`.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    /// Create a limiter with an injected clock (for deterministic tests).
    #[must_use]
    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_requests,
            window,
            clock,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Whether a request from `identity` is admitted right now.
    ///
    /// Never errors; callers translate `false` into their own "too many
    /// requests" response.
    pub async fn allow(&self, identity: &str) -> bool {
        let now = self.clock.now_ms();
        let window_ms = self.window.as_millis() as u64;

        let mut windows = self.windows.write().await;
        match windows.get_mut(identity) {
            Some(w) if now.saturating_sub(w.window_start_ms) <= window_ms => {
                // Inside an existing window: the attempt is counted whether
                // or not it is admitted.
                w.count = w.count.saturating_add(1);
                if w.count > self.max_requests {
                    debug!(identity, count = w.count, "rate limit exceeded");
                    false
                } else {
                    true
                }
            }
            _ => {
                // Absent or expired: the request opens a fresh window and is
                // always admitted.
                windows.insert(
                    identity.to_string(),
                    RateWindow {
                        count: 1,
                        window_start_ms: now,
                    },
                );
                true
            }
        }
    }

    /// Current attempt count and maximum for `identity`.
    ///
    /// Counts from an expired window read as 0.
    pub async fn usage(&self, identity: &str) -> (u32, u32) {
        let now = self.clock.now_ms();
        let window_ms = self.window.as_millis() as u64;

        let windows = self.windows.read().await;
        let current = match windows.get(identity) {
            Some(w) if now.saturating_sub(w.window_start_ms) <= window_ms => w.count,
            _ => 0,
        };
        (current, self.max_requests)
    }

    /// Drop expired windows, returning how many were removed.
    ///
    /// Purely an allocation-reclaim helper for long-lived processes; the
    /// limiter is correct without ever calling it.
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now_ms();
        let window_ms = self.window.as_millis() as u64;

        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, w| now.saturating_sub(w.window_start_ms) <= window_ms);
        before - windows.len()
    }
}
