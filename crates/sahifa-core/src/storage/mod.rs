//! Local storage
//!
//! The JSON cache that mirrors the content collections to disk. It is the
//! offline fallback when the data store is unreachable and the persistent
//! store in local mode.

pub mod cache;
pub mod error;

pub use cache::{CacheLoad, CacheStats, LocalCache};
pub use error::{CacheError, CacheResult};
