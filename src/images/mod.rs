//! Local image associations of inventory items.

mod image_refs;
mod image_store;

pub use image_refs::{ImageAssociation, ImageRef, ImageRefs};
pub use image_store::ImageAssociationStore;
