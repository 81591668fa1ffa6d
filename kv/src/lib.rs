//! KvStore - durable key-value entries for client-side caches
//!
//! A tiny store for advisory state that should survive restarts but is never
//! authoritative: warm-start caches, last-seen snapshots, UI preferences.
//! Values are opaque strings; the `*_json` helpers layer serde on top.
//!
//! # Backends
//!
//! - [`SqliteStore`] - one `kv` table in a SQLite file
//! - [`MemoryStore`] - a `HashMap`, for tests and ephemeral sessions
//!
//! # Example
//!
//! ```ignore
//! use kvstore::{KeyValueStore, SqliteStore};
//!
//! let mut store = SqliteStore::open("cache.db")?;
//! store.set("motoboy.recentDeliveries", "[]")?;
//! assert_eq!(store.get("motoboy.recentDeliveries")?.as_deref(), Some("[]"));
//! ```

mod error;
mod store;

pub use error::{KvError, KvResult};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, get_json, set_json};
