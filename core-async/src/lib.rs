//! Runtime abstraction layer for the health bridge core.
//!
//! Every `core-*` and `bridge-*` crate goes through this crate instead of
//! naming Tokio directly. The mobile hosts (Android, iOS) and the desktop
//! development shell all run the core on a multi-threaded Tokio runtime, so
//! the modules below are thin re-exports plus a few helpers.
//!
//! # Modules
//!
//! - `task`: spawning work onto the worker pool, `JoinSet` fan-out
//! - `time`: sleep, deadlines, `Duration`/`Instant`
//! - `sync`: channels and locks
//! - `runtime`: `block_on` for synchronous entry points
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{timeout, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     let value = timeout(Duration::from_secs(1), handle).await;
//!     assert!(value.is_ok());
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
