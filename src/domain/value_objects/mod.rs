pub mod local_order_id;
pub mod order_status;
pub mod query_key;
pub mod sync_operation_type;
pub mod sync_queue_id;
pub mod temp_id;

pub use local_order_id::LocalOrderId;
pub use order_status::OrderStatus;
pub use query_key::QueryKey;
pub use sync_operation_type::SyncOperationType;
pub use sync_queue_id::SyncQueueId;
pub use temp_id::TempId;
