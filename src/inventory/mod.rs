//! Vehicle inventory as served by the backend, and how local images follow it.

mod client;
mod models;
mod sync;

pub use client::{InventoryClient, InventoryError};
pub use models::{
    InventoryEvent, InventoryItem, InventoryItemId, InventoryPage, InventoryStatistics,
    NewInventoryItem,
};
pub use sync::{listing, InventorySync, ListedItem};
