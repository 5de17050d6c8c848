//! Record store adapters for Medgate.
//!
//! Two implementations of the [`RecordStore`] trait from `medgate-core`:
//! - [`SqliteStore`] — sqlx-backed, WAL journaling, pooled connections
//! - [`InMemoryStore`] — RwLock-backed, for tests and demos
//!
//! Plus [`seed::seed_demo`] to populate either with the demo patient set.

pub mod in_memory;
pub mod seed;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use medgate_core::store::RecordStore;
pub use seed::seed_demo;
pub use sqlite::SqliteStore;
