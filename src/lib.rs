//! Showroom Console Library
//!
//! Session, authorization and inventory plumbing of the dealership console,
//! exposed for the binary and the end-to-end tests.

pub mod config;
pub mod images;
pub mod inventory;
pub mod local_storage;
pub mod routes;
pub mod showroom;
pub mod user;

// Re-export commonly used types for convenience
pub use images::{ImageAssociationStore, ImageRef};
pub use inventory::{InventoryClient, InventoryItem, InventoryItemId, NewInventoryItem};
pub use local_storage::{InMemoryStorage, LocalStorage, SqliteLocalStorage};
pub use showroom::{Showroom, ShowroomError};
pub use user::{Action, RestAuthenticator, Role, Session, SessionState};
