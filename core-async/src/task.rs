//! Task spawning and execution abstractions.
//!
//! Work dispatched from the request-handling task lands on Tokio's worker
//! pool. `JoinSet` is re-exported for fan-out/fan-in: results come back in
//! completion order and dropping the set aborts whatever is still running.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task::{self, JoinSet};
//!
//! async fn example() {
//!     let mut set = JoinSet::new();
//!     set.spawn(async { 1 });
//!     set.spawn(async { 2 });
//!
//!     let mut total = 0;
//!     while let Some(result) = set.join_next().await {
//!         total += result.unwrap();
//!     }
//!     assert_eq!(total, 3);
//!
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle, JoinSet};

/// Spawns a new asynchronous task on the current runtime.
///
/// The spawned task may run on a different worker thread, so both the
/// future and its output must be `Send`.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
