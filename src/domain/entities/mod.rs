pub mod menu;
pub mod order;
pub mod query_cache;
pub mod reservation;
pub mod sync_queue_entry;
pub mod sync_report;

pub use menu::{CURRENT_MENU_KEY, BaseEntity, CachedMenu, Menu, ProteinOption, SideOption};
pub use order::{NewOrder, Order, OrderDraft, OrderItem};
pub use query_cache::{CachedQuery, PersistedQueryCache};
pub use reservation::ReservationRequest;
pub use sync_queue_entry::{SyncQueueDraft, SyncQueueEntry};
pub use sync_report::{SkipReason, SyncPass, SyncReport};
