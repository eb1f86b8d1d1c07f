//! Synchronization primitives.
//!
//! `mpsc` carries finished bridge replies to the single delivery task,
//! `oneshot` hands a result back to one waiter, and `Mutex`/`RwLock` guard
//! the small amount of shared state in the desktop bridge implementations.

pub use tokio::sync::{
    mpsc, oneshot, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
