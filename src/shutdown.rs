//! Process-wide shutdown coordination.
//! A flag set by the ctrlc handler so `hold` (and anything else that waits) can exit early.
//!
//! Notes:
//! - Relaxed atomics are sufficient for a one-way "stop" flag.
//! - `request()` is safe to call from signal handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

const POLL: Duration = Duration::from_millis(50);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Sleep until `limit` elapses (forever if `None`) or a shutdown is requested.
/// Returns true if woken by a shutdown request.
pub fn wait(limit: Option<Duration>) -> bool {
    let start = Instant::now();
    loop {
        if is_requested() {
            return true;
        }
        if limit.is_some_and(|l| start.elapsed() >= l) {
            return false;
        }
        thread::sleep(POLL);
    }
}

/// Test/utility-only: clear the shutdown flag.
#[cfg(any(test, feature = "test-helpers"))]
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}
