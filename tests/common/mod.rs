//! Common test infrastructure
//!
//! A fake dealership backend plus helpers wiring the console against it.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{build_showroom, TestServer, ADMIN_PASS, ADMIN_USER};
//!
//! #[tokio::test]
//! async fn test_list_cars() {
//!     let server = TestServer::spawn().await;
//!     let storage = std::sync::Arc::new(showroom_console::InMemoryStorage::new());
//!     let showroom = build_showroom(&server.api_url(), storage);
//!     showroom.session().login(ADMIN_USER, ADMIN_PASS).await.unwrap();
//!     assert!(!showroom.list_cars().await.unwrap().is_empty());
//! }
//! ```

mod constants;
mod fixtures;
mod server;

pub use constants::*;
pub use fixtures::build_showroom;
pub use server::TestServer;

#[allow(unused_imports)]
pub(crate) use fixtures::{test_cars, test_users, FakeUser};
