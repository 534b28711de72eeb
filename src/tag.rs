//! Defines the [`Tag`] type, which represents a [`crate::post::Post`] tag.

use std::hash::{Hash, Hasher};

/// Represents a [`crate::post::Post`] tag. Tags are identified by their slug,
/// so `Mañana`, `mañana` and `MAÑANA` are the same tag. The label keeps the
/// raw form the tag was first seen with.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The normalized identity of the tag. Also the tag page's URL segment.
    pub slug: String,

    /// The human-facing label (first-seen raw form, trimmed).
    pub label: String,
}

impl Tag {
    /// Builds a tag from a raw author-provided string. Returns `None` when the
    /// string has no sluggable content (e.g., `"¡!"`).
    pub fn new(raw: &str) -> Option<Tag> {
        let label = raw.trim();
        let slug = slug::slugify(label);
        match slug.is_empty() {
            true => None,
            false => Some(Tag {
                slug,
                label: label.to_owned(),
            }),
        }
    }

    /// Normalizes a list of raw tag strings: drops empty ones and collapses
    /// duplicates by slug, keeping the first label and the discovery order.
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Vec<Tag> {
        let mut tags: Vec<Tag> = Vec::with_capacity(raw.len());
        for tag in raw.iter().filter_map(|r| Tag::new(r.as_ref())) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `slug`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `slug` field.
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Tag {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new() {
        let tag = Tag::new("  Mañana Feliz ").unwrap();
        assert_eq!(tag.slug, "manana-feliz");
        assert_eq!(tag.label, "Mañana Feliz");
        assert!(Tag::new("¡!").is_none());
    }

    #[test]
    fn test_from_raw_collapses_by_slug() {
        let tags = Tag::from_raw(&["Café", "amor", "cafe", "", "CAFÉ"]);
        let labels: Vec<&str> = tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Café", "amor"]);
    }
}
