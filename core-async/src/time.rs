//! Time-related abstractions.
//!
//! `timeout` is the only deadline primitive the core uses: the aggregation
//! orchestrator wraps its whole join in it when a query timeout is
//! configured.
//!
//! ```rust
//! use core_async::time::{sleep, timeout, Duration};
//!
//! async fn example() {
//!     let slow = timeout(Duration::from_millis(10), sleep(Duration::from_secs(5))).await;
//!     assert!(slow.is_err());
//! }
//! ```

pub use tokio::time::{error::Elapsed, interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch according to the system clock.
///
/// Returns `0` if the clock is set before the epoch.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
