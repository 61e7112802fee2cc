pub mod entities;
pub mod value_objects;

pub use entities::{CachedMenu, Menu, Order, OrderDraft, OrderItem, SyncQueueEntry};
pub use value_objects::{LocalOrderId, OrderStatus, SyncOperationType, SyncQueueId, TempId};
