//! # Host Bridge Traits
//!
//! Contracts between the health core and the host platform.
//!
//! ## Overview
//!
//! The core does no storage, indexing, or UI work of its own. Everything it
//! needs from the outside world is expressed as a trait here, and each host
//! (Android, iOS, the desktop development shell) ships an implementation.
//!
//! ## Traits
//!
//! - [`HealthDataStore`](health::HealthDataStore) - vendor store: connect, read, aggregate, permission registry
//! - [`PermissionUiHost`](consent::PermissionUiHost) - present the consent prompt
//! - [`SettingsStore`](storage::SettingsStore) - persisted key-value preferences
//! - [`MethodResult`](channel::MethodResult) - reply primitive of the method channel
//! - [`Clock`](time::Clock) - time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - forward structured logs to Logcat/OSLog
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation | Status |
//! |----------|----------------|--------|
//! | Android  | host plugin over the vendor SDK | Shipping |
//! | iOS      | host plugin over HealthKit | Planned |
//! | Desktop  | `bridge-desktop` (in-memory store, SQLite settings) | Development / tests |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Host adapters
//! should map vendor failures onto the closest variant (connection, permission,
//! query) and keep the vendor's message as the payload.
//!
//! ## Thread Safety
//!
//! All traits except [`MethodResult`](channel::MethodResult) require
//! `Send + Sync`; the core shares them across concurrently running fetches.

pub mod channel;
pub mod consent;
pub mod error;
pub mod health;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use channel::{MethodCall, MethodResponse, MethodResult};
pub use consent::PermissionUiHost;
pub use health::{
    AccessType, AggregateColumn, AggregateFunction, AggregateRequest, HealthDataStore,
    PermissionKey, ReadRequest, SortOrder, StoreRecord, StoreValue, TimeGroup, TimeGroupUnit,
};
pub use storage::SettingsStore;
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
