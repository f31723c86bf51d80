//! Seed data of the fake backend and console wiring for tests.

use super::constants::*;
use showroom_console::images::{ImageAssociationStore, ImageRef};
use showroom_console::inventory::{InventoryClient, InventoryItem, InventoryItemId};
use showroom_console::local_storage::LocalStorage;
use showroom_console::user::{RestAuthenticator, SessionState};
use showroom_console::Showroom;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct FakeUser {
    pub username: &'static str,
    pub password: &'static str,
    pub token: &'static str,
    pub role: Option<&'static str>,
}

pub fn test_users() -> Vec<FakeUser> {
    vec![
        FakeUser {
            username: ADMIN_USER,
            password: ADMIN_PASS,
            token: "token-admin",
            role: Some("admin"),
        },
        FakeUser {
            username: STAFF_USER,
            password: STAFF_PASS,
            token: "token-staff",
            role: Some("staff"),
        },
        FakeUser {
            username: CUSTOMER_USER,
            password: CUSTOMER_PASS,
            token: "token-customer",
            role: Some("customer"),
        },
        FakeUser {
            username: ROLELESS_USER,
            password: ROLELESS_PASS,
            token: "token-roleless",
            role: None,
        },
        FakeUser {
            username: SUPERUSER_USER,
            password: SUPERUSER_PASS,
            token: "token-superuser",
            role: Some("superuser"),
        },
    ]
}

pub fn test_cars() -> Vec<InventoryItem> {
    let seed = [
        ("Toyota", "Corolla", 2021, "18999.00", 4),
        ("Fiat", "Panda", 2019, "7000.00", 1),
        ("BMW", "M3", 2023, "78000.00", 2),
        ("Ford", "Focus", 2018, "9500.00", 0),
        ("Tesla", "Model 3", 2022, "41000.00", 3),
    ];
    seed.into_iter()
        .enumerate()
        .map(|(i, (brand, model, year, price, stock))| InventoryItem {
            id: InventoryItemId(i as u64 + 1),
            brand: brand.to_string(),
            model: model.to_string(),
            year,
            price: price.to_string(),
            stock,
        })
        .collect()
}

/// Wires a console against `api_url` the way the binary does, rehydrating any
/// session found in `storage`.
pub fn build_showroom(api_url: &str, storage: Arc<dyn LocalStorage>) -> Showroom {
    let authenticator = Arc::new(
        RestAuthenticator::new(api_url, REQUEST_TIMEOUT_SEC)
            .expect("Failed to create authenticator"),
    );
    let images = ImageAssociationStore::load(
        storage.clone(),
        ImageRef::parse(DEFAULT_IMAGE).expect("Invalid default image"),
    );
    let session = SessionState::new(storage, authenticator);
    session.rehydrate();
    let inventory =
        InventoryClient::new(api_url, REQUEST_TIMEOUT_SEC).expect("Failed to create client");
    Showroom::new(session, images, inventory)
}
