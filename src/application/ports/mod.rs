pub mod connectivity;
pub mod credentials;
pub mod local_store;
pub mod query_cache;
pub mod remote_api;

pub use connectivity::ConnectivityStatus;
pub use credentials::CredentialProvider;
pub use local_store::{KeyValueStore, MenuSnapshotStore, OrderStore, SyncQueueStore};
pub use query_cache::QueryCachePersister;
pub use remote_api::{MenuGateway, OrderGateway, SyncOperationHandler};
