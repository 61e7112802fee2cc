pub mod cache;
pub mod connectivity;
pub mod credentials;
pub mod database;
pub mod http;
pub mod offline;

pub use cache::{KeyValueCachePersister, PersistentQueryCache, QueryCache};
pub use connectivity::{ConnectivityMonitor, ReachabilityProbe};
pub use credentials::StoredCredentials;
pub use database::ConnectionPool;
pub use http::{HttpOperationHandler, LunchApiClient};
pub use offline::SqliteLocalStore;
