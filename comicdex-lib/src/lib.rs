//! Async service layer for the comic catalog.
//!
//! [`Catalog`] is the entry point: it checks write capabilities, runs storage
//! calls on the blocking pool with cooperative cancellation, assembles comic
//! and category aggregates, and keeps a best-effort cache of comic reads.

pub mod assembler;
pub mod cache;
pub mod cancel;
pub mod error;
pub mod permission;
pub mod service;
pub mod settings;
pub mod store;

pub use cache::{spawn_sweeper, CacheBackend, MemoryCache};
pub use cancel::CancelToken;
pub use error::{CacheError, OpenError, ServiceError};
pub use permission::{write_key, Grants, Permissions};
pub use service::{Catalog, SeedReport, TypeKind};
pub use settings::{load_settings, save_settings, Settings, SettingsError};
pub use store::Store;

pub use comicdex_db::condition::Condition;
