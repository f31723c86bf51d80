use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// A display image reference, always starting with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageRef(String);

impl ImageRef {
    /// Normalizes `raw` into a reference. Blank input has no reference, `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(ImageRef(trimmed.to_string()))
        } else {
            Some(ImageRef(format!("/{}", trimmed)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ImageRef {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ImageRef {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for ImageRef {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// An ordered, non-empty sequence of image references.
///
/// There is no way to build an empty one, so a stored association always has
/// at least one image to show. No upper bound is enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageRefs(Vec<ImageRef>);

impl ImageRefs {
    /// Drops blank entries and normalizes the rest, preserving order.
    /// Returns `None` when nothing survives.
    pub fn from_raw<I, S>(raw: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let refs: Vec<ImageRef> = raw
            .into_iter()
            .filter_map(|s| ImageRef::parse(s.as_ref()))
            .collect();
        if refs.is_empty() {
            None
        } else {
            Some(ImageRefs(refs))
        }
    }

    pub fn primary(&self) -> &ImageRef {
        // non-empty by construction
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[ImageRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageRef> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ImageRefs {
    type Item = &'a ImageRef;
    type IntoIter = std::slice::Iter<'a, ImageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Lookup result for an inventory item's images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAssociation<'a> {
    Present(&'a ImageRefs),
    /// The item has no curated images, the default image applies.
    Absent,
}

impl<'a> ImageAssociation<'a> {
    pub fn is_present(&self) -> bool {
        matches!(self, ImageAssociation::Present(_))
    }
}
