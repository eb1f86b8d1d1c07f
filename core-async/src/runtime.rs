//! Runtime utilities that abstract over the underlying async executor.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Used by the `#[core_async::test]` and `#[core_async::main]` macros and by
/// synchronous host entry points. Panics if a runtime cannot be built, which
/// only happens when the process is out of OS resources.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Builds the multi-threaded worker pool hosts use to run the core.
pub fn worker_pool(worker_threads: usize) -> std::io::Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(worker_threads.max(1))
        .thread_name("health-core-worker")
        .enable_all()
        .build()
}
