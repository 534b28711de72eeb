//! The in-memory corpus for one build, and the batch analysis that runs over
//! it before any page is written.
//!
//! [`ContentIndex::build`] puts posts into canonical corpus order (category
//! slug, then post slug) and groups them into categories and tags. Every
//! ranking and shuffle downstream relies on that order for tie-breaks, so
//! output never depends on directory-listing order.

use crate::post::{Post, PostId};
use crate::related::{Related, RelatedIndex, Weights};
use crate::seo::{self, CategorySeo};
use crate::tag::Tag;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A category and the indices of its posts in the corpus.
#[derive(Clone, Debug)]
pub struct Category {
    pub slug: String,

    /// Display name: configured override or the slug with spaces.
    pub name: String,

    /// Member posts, as indices into [`ContentIndex::posts`].
    pub posts: Vec<usize>,
}

/// A tag and the indices of the posts that carry it.
#[derive(Clone, Debug)]
pub struct TagEntry {
    /// The tag, labelled with the first raw form seen in corpus order.
    pub tag: Tag,

    /// Member posts in corpus order, as indices into [`ContentIndex::posts`].
    pub posts: Vec<usize>,
}

/// The corpus: posts, categories and the tag map.
pub struct ContentIndex {
    posts: Vec<Post>,
    categories: Vec<Category>,
    tags: Vec<TagEntry>,
}

impl ContentIndex {
    /// Builds the index. Posts sharing an id supersede each other in the
    /// order given (the last one wins). `declared_categories` adds categories
    /// that exist as folders even if they hold no posts; `name` resolves a
    /// category slug to its display name.
    pub fn build(
        posts: Vec<Post>,
        declared_categories: &[String],
        name: impl Fn(&str) -> String,
    ) -> ContentIndex {
        let mut unique: BTreeMap<PostId, Post> = BTreeMap::new();
        for post in posts {
            if let Some(previous) = unique.insert(post.id.clone(), post) {
                debug!(post = %previous.id, "superseded duplicate post");
            }
        }
        let posts: Vec<Post> = unique.into_values().collect();

        let mut categories: BTreeMap<String, Vec<usize>> = declared_categories
            .iter()
            .map(|slug| (slug.clone(), Vec::new()))
            .collect();
        let mut tags: BTreeMap<String, TagEntry> = BTreeMap::new();
        for (i, post) in posts.iter().enumerate() {
            categories.entry(post.id.category.clone()).or_default().push(i);
            for tag in &post.tags {
                tags.entry(tag.slug.clone())
                    .or_insert_with(|| TagEntry {
                        tag: tag.clone(),
                        posts: Vec::new(),
                    })
                    .posts
                    .push(i);
            }
        }

        ContentIndex {
            categories: categories
                .into_iter()
                .map(|(slug, posts)| Category {
                    name: name(&slug),
                    slug,
                    posts,
                })
                .collect(),
            tags: tags.into_values().collect(),
            posts,
        }
    }

    /// Every post in corpus order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Every category, ordered by slug.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Every tag, ordered by slug.
    pub fn tags(&self) -> &[TagEntry] {
        &self.tags
    }

    /// Resolves corpus indices to posts.
    pub fn resolve(&self, indices: &[usize]) -> Vec<&Post> {
        indices.iter().map(|&i| &self.posts[i]).collect()
    }

    /// The `limit` most recently modified posts. Equal timestamps keep
    /// corpus order.
    pub fn latest(&self, limit: usize) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.lastmod.cmp(&a.lastmod));
        posts.truncate(limit);
        posts
    }

    /// The `limit` tags carrying the most posts. Equal counts are ordered by
    /// tag slug.
    pub fn top_tags(&self, limit: usize) -> Vec<&TagEntry> {
        let mut tags: Vec<&TagEntry> = self.tags.iter().collect();
        tags.sort_by(|a, b| b.posts.len().cmp(&a.posts.len()));
        tags.truncate(limit);
        tags
    }

    /// Runs keyword scoring and related-post ranking over the whole corpus.
    pub fn analyze(&self, weights: Weights, related_limit: usize) -> Analysis<'_> {
        let ranker = RelatedIndex::new(&self.posts, weights);
        let posts: Vec<PostAnalysis> = self
            .posts
            .iter()
            .map(|post| PostAnalysis {
                keywords: seo::post_keywords(post),
                related: ranker.related(post, related_limit),
            })
            .collect();
        let categories: Vec<CategorySeo> = self
            .categories
            .iter()
            .map(|c| seo::category_seo(&c.name, &self.resolve(&c.posts)))
            .collect();

        info!(
            posts = posts.len(),
            categories = categories.len(),
            tags = self.tags.len(),
            "analyzed corpus"
        );
        Analysis { posts, categories }
    }
}

/// What the core produces for a post page.
pub struct PostAnalysis<'a> {
    /// The post's own top keywords.
    pub keywords: Vec<String>,

    /// Related posts, most related first.
    pub related: Vec<Related<'a>>,
}

/// The result of [`ContentIndex::analyze`]. `posts` is parallel to
/// [`ContentIndex::posts`] and `categories` to [`ContentIndex::categories`].
pub struct Analysis<'a> {
    pub posts: Vec<PostAnalysis<'a>>,
    pub categories: Vec<CategorySeo>,
}
