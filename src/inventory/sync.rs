use super::models::{InventoryEvent, InventoryItem};
use crate::images::{ImageAssociationStore, ImageRef};
use crate::local_storage::StorageError;
use tracing::debug;

/// An inventory item together with the images to show for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedItem {
    pub item: InventoryItem,
    /// Never empty, holds the default image when nothing is associated.
    pub images: Vec<ImageRef>,
}

impl ListedItem {
    pub fn primary_image(&self) -> &ImageRef {
        &self.images[0]
    }
}

/// Keeps the image associations in step with inventory mutations.
pub struct InventorySync<'a> {
    images: &'a mut ImageAssociationStore,
}

impl<'a> InventorySync<'a> {
    pub fn new(images: &'a mut ImageAssociationStore) -> Self {
        InventorySync { images }
    }

    pub fn apply(&mut self, event: &InventoryEvent) -> Result<(), StorageError> {
        debug!("Applying inventory event {:?}", event);
        match event {
            InventoryEvent::Created { id, images } => self.images.set(*id, images),
            InventoryEvent::Updated {
                id,
                images: Some(images),
            } => self.images.set(*id, images),
            InventoryEvent::Updated { images: None, .. } => Ok(()),
            InventoryEvent::Deleted { id } => self.images.remove(*id),
        }
    }
}

/// Pairs every fetched item with its resolved images, in fetch order.
pub fn listing(images: &ImageAssociationStore, items: Vec<InventoryItem>) -> Vec<ListedItem> {
    items
        .into_iter()
        .map(|item| {
            let images = images.get(item.id);
            ListedItem { item, images }
        })
        .collect()
}
