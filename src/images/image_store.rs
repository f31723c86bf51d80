use super::image_refs::{ImageAssociation, ImageRef, ImageRefs};
use crate::inventory::InventoryItemId;
use crate::local_storage::{LocalStorage, StorageError, IMAGE_ASSOCIATIONS_KEY};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Locally curated images of inventory items.
///
/// The whole map is loaded once at construction and rewritten in full after
/// every mutation. Items without an entry show the default image.
pub struct ImageAssociationStore {
    storage: Arc<dyn LocalStorage>,
    associations: BTreeMap<InventoryItemId, ImageRefs>,
    default_image: ImageRef,
}

impl ImageAssociationStore {
    /// Loads the persisted associations. Never fails: unreadable or malformed
    /// content leaves the store empty and the bad record is deleted.
    pub fn load(storage: Arc<dyn LocalStorage>, default_image: ImageRef) -> Self {
        let associations = Self::load_all(storage.as_ref());
        debug!("Loaded images for {} inventory items", associations.len());
        ImageAssociationStore {
            storage,
            associations,
            default_image,
        }
    }

    pub fn load_all(storage: &dyn LocalStorage) -> BTreeMap<InventoryItemId, ImageRefs> {
        let content = match storage.read_text(IMAGE_ASSOCIATIONS_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return BTreeMap::new(),
            Err(err) => {
                warn!("Could not read stored image associations: {}", err);
                Self::discard_record(storage);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<BTreeMap<u64, Vec<String>>>(&content) {
            Ok(raw) => raw
                .into_iter()
                .filter_map(|(id, images)| {
                    ImageRefs::from_raw(images).map(|refs| (InventoryItemId(id), refs))
                })
                .collect(),
            Err(err) => {
                warn!("Discarding malformed image associations: {}", err);
                Self::discard_record(storage);
                BTreeMap::new()
            }
        }
    }

    fn discard_record(storage: &dyn LocalStorage) {
        if let Err(err) = storage.remove_key(IMAGE_ASSOCIATIONS_KEY) {
            warn!("Failed to delete image associations record: {}", err);
        }
    }

    pub fn default_image(&self) -> &ImageRef {
        &self.default_image
    }

    pub fn lookup(&self, id: InventoryItemId) -> ImageAssociation<'_> {
        match self.associations.get(&id) {
            Some(refs) => ImageAssociation::Present(refs),
            None => ImageAssociation::Absent,
        }
    }

    /// The item's images, or just the default image if it has none.
    pub fn get(&self, id: InventoryItemId) -> Vec<ImageRef> {
        match self.lookup(id) {
            ImageAssociation::Present(refs) => refs.as_slice().to_vec(),
            ImageAssociation::Absent => vec![self.default_image.clone()],
        }
    }

    pub fn get_primary(&self, id: InventoryItemId) -> ImageRef {
        match self.lookup(id) {
            ImageAssociation::Present(refs) => refs.primary().clone(),
            ImageAssociation::Absent => self.default_image.clone(),
        }
    }

    /// Replaces the item's images with the non-blank entries of `raw`. If none
    /// remain the association is removed.
    ///
    /// A storage error is returned after the in-memory update has been applied,
    /// the two stay out of sync until the next successful write.
    pub fn set<I, S>(&mut self, id: InventoryItemId, raw: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match ImageRefs::from_raw(raw) {
            Some(refs) => {
                debug!("Associating {} images with item {}", refs.len(), id);
                self.associations.insert(id, refs);
            }
            None => {
                debug!("No images left for item {}, removing association", id);
                self.associations.remove(&id);
            }
        }
        self.persist()
    }

    pub fn remove(&mut self, id: InventoryItemId) -> Result<(), StorageError> {
        if self.associations.remove(&id).is_some() {
            debug!("Removed image association of item {}", id);
        }
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw: BTreeMap<u64, &ImageRefs> = self
            .associations
            .iter()
            .map(|(id, refs)| (id.0, refs))
            .collect();
        let content = serde_json::to_string(&raw).map_err(|err| StorageError::Write {
            key: IMAGE_ASSOCIATIONS_KEY.to_string(),
            reason: err.to_string(),
        })?;
        self.storage.write_text(IMAGE_ASSOCIATIONS_KEY, &content)
    }
}
