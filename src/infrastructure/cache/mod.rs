pub mod persistent;
pub mod persister;
pub mod query_cache;

pub use persistent::PersistentQueryCache;
pub use persister::KeyValueCachePersister;
pub use query_cache::QueryCache;
