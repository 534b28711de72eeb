//! Related-post ranking. Every candidate is scored against the source post
//! from three signals, strongest first: shared tags, a shared category, and
//! shared vocabulary. The vocabulary signal is kept small so it only breaks
//! ties between candidates the first two signals consider equal.
//!
//! Ranking runs once per post at build time over the whole corpus, so a build
//! is O(posts²). [`RelatedIndex`] tokenizes each post once up front to keep the
//! constant factor down.

use crate::keywords::distinct_tokens;
use crate::post::Post;
use serde::Deserialize;
use std::collections::HashSet;

/// Signal weights for [`RelatedIndex`]. The defaults keep the ratios
/// `tag : category : token` at `5 : 2 : 0.2`, and cap the summed token
/// contribution below a category match.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Added once per tag the two posts share.
    #[serde(rename = "tag_weight")]
    pub tag: f64,

    /// Added when the two posts are in the same category.
    #[serde(rename = "category_weight")]
    pub category: f64,

    /// Added once per sampled source token found in the candidate.
    #[serde(rename = "token_weight")]
    pub token: f64,

    /// Upper bound on the summed token contribution.
    pub token_cap: f64,

    /// Candidates must score strictly above this to be ranked; the rest are
    /// only used to pad short results.
    pub threshold: f64,

    /// How many distinct source tokens are compared against each candidate.
    pub token_sample: usize,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            tag: 5.0,
            category: 2.0,
            token: 0.2,
            token_cap: 1.8,
            threshold: 0.5,
            token_sample: 40,
        }
    }
}

/// One entry of a ranking result.
#[derive(Clone, Copy, Debug)]
pub struct Related<'a> {
    pub post: &'a Post,
    pub score: f64,

    /// True when the post did not clear the threshold and was only added to
    /// fill the requested number of slots.
    pub padded: bool,
}

/// The tokens of a post that ranking looks at.
struct Features {
    /// The first `token_sample` distinct tokens, compared as the source.
    sample: Vec<String>,

    /// Every distinct token, compared as a candidate.
    tokens: HashSet<String>,
}

impl Features {
    fn of(post: &Post, sample_size: usize) -> Features {
        let distinct = distinct_tokens(&post.ranking_text());
        Features {
            sample: distinct.iter().take(sample_size).cloned().collect(),
            tokens: distinct.into_iter().collect(),
        }
    }
}

/// Ranks related posts over a fixed corpus.
pub struct RelatedIndex<'a> {
    corpus: &'a [Post],
    weights: Weights,
    features: Vec<Features>,
}

impl<'a> RelatedIndex<'a> {
    /// Tokenizes every post in `corpus`. The corpus order is the tie-break
    /// order for rankings, so callers should pass it already sorted.
    pub fn new(corpus: &'a [Post], weights: Weights) -> RelatedIndex<'a> {
        RelatedIndex {
            corpus,
            weights,
            features: corpus
                .iter()
                .map(|p| Features::of(p, weights.token_sample))
                .collect(),
        }
    }

    fn score_with(
        &self,
        source: &Post,
        source_features: &Features,
        candidate: &Post,
        candidate_features: &Features,
    ) -> f64 {
        // Tags are deduplicated per post, so this is bounded by the smaller
        // tag set.
        let shared_tags = source
            .tags
            .iter()
            .filter(|t| candidate.tags.contains(t))
            .count();
        let shared_tokens = source_features
            .sample
            .iter()
            .filter(|t| candidate_features.tokens.contains(*t))
            .count();

        let mut score = shared_tags as f64 * self.weights.tag;
        if source.id.category == candidate.id.category {
            score += self.weights.category;
        }
        score + (shared_tokens as f64 * self.weights.token).min(self.weights.token_cap)
    }

    /// Scores `candidate` against `source`. Returns `None` when they are the
    /// same post.
    pub fn score(&self, source: &Post, candidate: &Post) -> Option<f64> {
        if source.id == candidate.id {
            return None;
        }
        Some(self.score_with(
            source,
            &Features::of(source, self.weights.token_sample),
            candidate,
            &Features::of(candidate, self.weights.token_sample),
        ))
    }

    /// Ranks the corpus against `source` and returns up to `limit` entries,
    /// most related first. `source` itself is never included. When fewer
    /// than `limit` posts clear the threshold, the result is padded with the
    /// remaining posts in corpus order.
    pub fn related(&self, source: &Post, limit: usize) -> Vec<Related<'a>> {
        let position = self.corpus.iter().position(|p| p.id == source.id);
        let owned;
        let source_features = match position {
            Some(i) => &self.features[i],
            None => {
                owned = Features::of(source, self.weights.token_sample);
                &owned
            }
        };

        let (mut ranked, rest): (Vec<Related<'a>>, Vec<Related<'a>>) = self
            .corpus
            .iter()
            .zip(&self.features)
            .filter(|(candidate, _)| candidate.id != source.id)
            .map(|(candidate, features)| Related {
                post: candidate,
                score: self.score_with(source, source_features, candidate, features),
                padded: false,
            })
            .partition(|r| r.score > self.weights.threshold);

        // `sort_by` is stable: equal scores keep corpus order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);

        let missing = limit.saturating_sub(ranked.len());
        ranked.extend(rest.into_iter().take(missing).map(|r| Related {
            padded: true,
            ..r
        }));
        ranked
    }
}

/// Convenience wrapper over [`RelatedIndex`] for ranking a single post.
pub fn related_posts<'a>(
    source: &Post,
    corpus: &'a [Post],
    limit: usize,
    weights: Weights,
) -> Vec<&'a Post> {
    RelatedIndex::new(corpus, weights)
        .related(source, limit)
        .into_iter()
        .map(|r| r.post)
        .collect()
}
