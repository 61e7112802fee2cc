pub mod menu_service;
pub mod order_service;
pub mod sync_manager;
pub mod sync_trigger;

#[cfg(test)]
mod test_support;

pub use menu_service::MenuService;
pub use order_service::OrderService;
pub use sync_manager::SyncManager;
pub use sync_trigger::spawn_sync_on_reconnect;
