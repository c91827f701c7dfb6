// SQLite-backed key/value cache for API responses
// Keeps API calls down between runs; entries expire by TTL at read time

pub mod cache;

pub use cache::{CacheEntry, CacheError, CacheManager, Result};
