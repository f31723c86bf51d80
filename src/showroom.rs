//! Gated inventory operations as the console performs them.

use crate::images::{ImageAssociationStore, ImageRef};
use crate::inventory::{
    listing, InventoryClient, InventoryError, InventoryEvent, InventoryItem, InventoryItemId,
    InventoryStatistics, InventorySync, ListedItem, NewInventoryItem,
};
use crate::local_storage::{Saved, StorageError};
use crate::routes::{authorize, RequiredRoles, Route, RouteAccess, RouteDecision};
use crate::user::{Action, Role, Session, SessionState};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ShowroomError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Role {role} is not allowed to {action}")]
    Forbidden { role: Role, action: Action },

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// The screens of the console that talk to the inventory.
///
/// Every operation is checked twice, once by the guard of the route it belongs
/// to and once against the permission table for the action it performs.
/// Mutations return [`Saved`]: the backend change happened, the local image
/// save may not have.
pub struct Showroom {
    session: SessionState,
    images: ImageAssociationStore,
    inventory: InventoryClient,
}

impl Showroom {
    pub fn new(
        session: SessionState,
        images: ImageAssociationStore,
        inventory: InventoryClient,
    ) -> Self {
        Showroom {
            session,
            images,
            inventory,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn images(&self) -> &ImageAssociationStore {
        &self.images
    }

    fn require(&self, route: Route, action: Action) -> Result<Session, ShowroomError> {
        let required = match route.access() {
            RouteAccess::Guarded(required) => required,
            RouteAccess::Public => RequiredRoles::AnyAuthenticated,
        };
        let session = self.session.current();
        match (authorize(session.as_ref(), required), session) {
            (RouteDecision::Allow, Some(session)) if session.is_allowed(action) => Ok(session),
            (RouteDecision::RedirectToLogin, _) | (_, None) => Err(ShowroomError::NotLoggedIn),
            (_, Some(session)) => Err(ShowroomError::Forbidden {
                role: session.role,
                action,
            }),
        }
    }

    pub async fn list_cars(&self) -> Result<Vec<ListedItem>, ShowroomError> {
        let session = self.require(Route::Home, Action::ViewInventory)?;
        let items = self.inventory.list_items(&session.token).await?;
        Ok(listing(&self.images, items))
    }

    pub async fn add_car(
        &mut self,
        item: &NewInventoryItem,
        images: Vec<String>,
    ) -> Result<Saved<InventoryItem>, ShowroomError> {
        let session = self.require(Route::Home, Action::AddItem)?;
        let created = self.inventory.create_item(&session.token, item).await?;
        info!("Created inventory item {}", created.id);
        let persisted = self.follow(InventoryEvent::Created {
            id: created.id,
            images,
        });
        Ok(Saved::new(created, persisted))
    }

    /// Replaces the item on the backend. `images: None` keeps its current images.
    pub async fn edit_car(
        &mut self,
        id: InventoryItemId,
        item: &NewInventoryItem,
        images: Option<Vec<String>>,
    ) -> Result<Saved<InventoryItem>, ShowroomError> {
        let session = self.require(Route::Home, Action::EditItem)?;
        let updated = self.inventory.update_item(&session.token, id, item).await?;
        let persisted = self.follow(InventoryEvent::Updated { id, images });
        Ok(Saved::new(updated, persisted))
    }

    pub async fn delete_car(&mut self, id: InventoryItemId) -> Result<Saved<()>, ShowroomError> {
        let session = self.require(Route::Home, Action::DeleteItem)?;
        match self.inventory.delete_item(&session.token, id).await {
            Ok(()) => {
                let persisted = self.follow(InventoryEvent::Deleted { id });
                Ok(Saved::new((), persisted))
            }
            Err(InventoryError::NotFound(id)) => {
                // already gone on the backend, its images go too
                if let Err(err) = self.follow(InventoryEvent::Deleted { id }) {
                    warn!("Images of vanished item {} not saved: {}", id, err);
                }
                Err(InventoryError::NotFound(id).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn item_images(&self, id: InventoryItemId) -> Result<Vec<ImageRef>, ShowroomError> {
        self.require(Route::Home, Action::ViewInventory)?;
        Ok(self.images.get(id))
    }

    pub fn set_item_images(
        &mut self,
        id: InventoryItemId,
        images: Vec<String>,
    ) -> Result<Saved<Vec<ImageRef>>, ShowroomError> {
        self.require(Route::Home, Action::EditItem)?;
        let persisted = self.follow(InventoryEvent::Updated {
            id,
            images: Some(images),
        });
        Ok(Saved::new(self.images.get(id), persisted))
    }

    pub fn clear_item_images(&mut self, id: InventoryItemId) -> Result<Saved<()>, ShowroomError> {
        self.require(Route::Home, Action::EditItem)?;
        let persisted = self.follow(InventoryEvent::Updated {
            id,
            images: Some(Vec::new()),
        });
        Ok(Saved::new((), persisted))
    }

    pub async fn statistics(&self) -> Result<InventoryStatistics, ShowroomError> {
        let session = self.require(Route::Statistics, Action::ViewStatistics)?;
        Ok(self.inventory.statistics(&session.token).await?)
    }

    /// `None` when the inventory is empty.
    pub async fn average_price(&self) -> Result<Option<f64>, ShowroomError> {
        let session = self.require(Route::PriceAggregate, Action::ViewPriceAggregate)?;
        Ok(self.inventory.average_price(&session.token).await?)
    }

    pub async fn premium_listing(&self) -> Result<Vec<ListedItem>, ShowroomError> {
        let session = self.require(Route::PremiumListing, Action::ViewPremiumListing)?;
        let items = self.inventory.premium_listing(&session.token).await?;
        Ok(listing(&self.images, items))
    }

    pub async fn low_stock(&self) -> Result<Vec<InventoryItem>, ShowroomError> {
        let session = self.require(Route::LowStock, Action::ViewLowStock)?;
        Ok(self.inventory.low_stock(&session.token).await?)
    }

    fn follow(&mut self, event: InventoryEvent) -> Result<(), StorageError> {
        InventorySync::new(&mut self.images).apply(&event)
    }
}
