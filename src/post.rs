//! Defines the [`Post`] and [`PostId`] types. Posts are built once per build
//! by [`crate::parser::Parser`] and are never mutated afterwards.

use crate::tag::Tag;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// The identity of a post: its category slug and its own slug. Ordering is
/// by category, then slug, which is the canonical corpus order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId {
    pub category: String,
    pub slug: String,
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.slug)
    }
}

/// Represents a blog post.
#[derive(Clone, Debug)]
pub struct Post {
    /// The (category, slug) identity of the post.
    pub id: PostId,

    /// The post's title. Falls back to the slug with dashes as spaces.
    pub title: String,

    /// The meta description. Falls back to the first sentence of the body.
    pub description: String,

    /// The text of the first paragraph, possibly empty.
    pub excerpt: String,

    /// The visible text of the whole post.
    pub body: String,

    /// The post's tags, deduplicated by slug, in discovery order.
    pub tags: Vec<Tag>,

    /// The last-modified time of the post's source file.
    pub lastmod: DateTime<Utc>,

    /// The canonical URL of the post page.
    pub url: Url,

    /// The post's source HTML file.
    pub source_path: PathBuf,
}

impl Post {
    /// The text used for keyword scoring of listing pages: title, excerpt and
    /// description.
    pub fn seo_text(&self) -> String {
        join_nonempty(&[&self.title, &self.excerpt, &self.description])
    }

    /// The text used for similarity ranking: title, body and tag labels.
    pub fn ranking_text(&self) -> String {
        let tags = self
            .tags
            .iter()
            .map(|t| t.label.as_str())
            .collect::<Vec<&str>>()
            .join(" ");
        join_nonempty(&[&self.title, &self.body, &tags])
    }

    /// A short blurb for post listings: the excerpt (or the description when
    /// there is no excerpt), cut to `max_chars` characters with an ellipsis.
    /// Returns `""` when the post has neither.
    pub fn blurb(&self, max_chars: usize) -> String {
        let text = match self.excerpt.trim() {
            "" => self.description.trim(),
            excerpt => excerpt,
        };
        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}…", &text[..cut]),
            None => text.to_owned(),
        }
    }
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}


#[cfg(test)]
mod test {
    use super::fixture::post;

    #[test]
    fn test_blurb() {
        let mut p = post("amor", "a", "A", "", &[]);
        assert_eq!(p.blurb(140), "");
        p.description = "Una descripción".to_owned();
        assert_eq!(p.blurb(140), "Una descripción");
        p.excerpt = "ñandúes al amanecer".to_owned();
        assert_eq!(p.blurb(5), "ñandú…");
        assert_eq!(p.blurb(19), "ñandúes al amanecer");
    }

    #[test]
    fn test_ranking_text() {
        let p = post("amor", "a", "Título", "cuerpo", &["Mañana", "calma"]);
        assert_eq!(p.ranking_text(), "Título cuerpo Mañana calma");
        assert_eq!(p.tags[0].slug, "manana");
    }

    #[test]
    fn test_post_id_ordering() {
        let a = post("amor", "z", "", "", &[]).id;
        let b = post("trabajo", "a", "", "", &[]).id;
        assert!(a < b);
        assert_eq!(a.to_string(), "amor/z");
    }
}
