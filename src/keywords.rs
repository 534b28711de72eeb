//! TF-IDF-lite keyword scoring. Every call builds its own frequency tables
//! from the documents it is handed, so the scope of a [`ScoreTable`] is
//! exactly that document set (the whole corpus, one category, one post).

use crate::text::tokenize;
use std::collections::{HashMap, HashSet};

/// Token importances for one document set, most important first. Ties keep
/// the order in which tokens were first seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreTable {
    entries: Vec<(String, f64)>,
}

impl ScoreTable {
    /// The aggregate score of `token`, if it occurred at all.
    pub fn score(&self, token: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, s)| *s)
    }

    /// The `limit` highest-ranked tokens.
    pub fn top(&self, limit: usize) -> Vec<String> {
        self.entries
            .iter()
            .take(limit)
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Smoothed inverse document frequency. Finite and positive whenever
/// `df <= n`.
pub fn idf(n: usize, df: usize) -> f64 {
    ((n as f64 + 1.0) / (df as f64 + 0.5)).ln()
}

/// Per-document term frequencies, each paired with the tokens in the order
/// they first appeared in that document.
fn term_frequencies<S: AsRef<str>>(documents: &[S]) -> Vec<Vec<(String, usize)>> {
    documents
        .iter()
        .map(|doc| {
            let mut slots: HashMap<String, usize> = HashMap::new();
            let mut counts: Vec<(String, usize)> = Vec::new();
            for token in tokenize(doc.as_ref()) {
                match slots.get(&token) {
                    Some(&i) => counts[i].1 += 1,
                    None => {
                        slots.insert(token.clone(), counts.len());
                        counts.push((token, 1));
                    }
                }
            }
            counts
        })
        .collect()
}

/// Scores every token across `documents`. A token's score is the sum over
/// documents of `tf * idf`, where `idf = ln((N + 1) / (df + 0.5))` and an
/// empty document set counts as `N = 1`.
pub fn score_table<S: AsRef<str>>(documents: &[S]) -> ScoreTable {
    let n = documents.len().max(1);
    let tfs = term_frequencies(documents);

    let mut df: HashMap<&str, usize> = HashMap::new();
    for counts in &tfs {
        for (token, _) in counts {
            *df.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<(String, f64)> = Vec::new();
    for counts in &tfs {
        for (token, tf) in counts {
            let contribution = *tf as f64 * idf(n, df[token.as_str()]);
            match slots.get(token.as_str()) {
                Some(&i) => entries[i].1 += contribution,
                None => {
                    slots.insert(token.as_str(), entries.len());
                    entries.push((token.clone(), contribution));
                }
            }
        }
    }

    // `sort_by` is stable, so equal scores keep first-seen order.
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    ScoreTable { entries }
}

/// The `limit` most important tokens across `documents`.
pub fn top_keywords<S: AsRef<str>>(documents: &[S], limit: usize) -> Vec<String> {
    score_table(documents).top(limit)
}

/// The distinct tokens of `text`, in first-seen order.
pub fn distinct_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text).filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_term_frequency_scales_score() {
        let heavy = score_table(&["sol sol sol", "sol"]);
        let single_first = score_table(&["sol", "sol"]);
        // Same df and N in both tables; only the first document's tf differs.
        let per_occurrence = idf(2, 2);
        assert!((heavy.score("sol").unwrap() - 4.0 * per_occurrence).abs() < 1e-9);
        assert!((single_first.score("sol").unwrap() - 2.0 * per_occurrence).abs() < 1e-9);
        assert!(heavy.score("sol") > single_first.score("sol"));
    }

    #[test]
    fn test_rare_tokens_outrank_common_ones() {
        let docs = [
            "calma respirar despacio",
            "calma cafe",
            "calma abrazo",
        ];
        let table = score_table(&docs);
        // "calma" is in every document; each rare token appears once.
        assert!(table.score("respirar").unwrap() > table.score("calma").unwrap());
        assert_eq!(table.top(1), vec!["respirar"]);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let top = top_keywords(&["luna mar cielo"], 3);
        assert_eq!(top, vec!["luna", "mar", "cielo"]);
    }

    #[test]
    fn test_limit_is_respected() {
        let docs = ["uno dos tres cuatro cinco seis siete ocho nueve diez"];
        let top = top_keywords(&docs, 5);
        assert_eq!(top.len(), 5);
        assert!(top_keywords(&docs, 0).is_empty());
    }

    #[test]
    fn test_empty_documents() {
        let empty: [&str; 0] = [];
        assert!(score_table(&empty).is_empty());
        assert!(top_keywords(&["", "de la y"], 10).is_empty());
    }

    #[test]
    fn test_tables_are_independent_per_scope() {
        let a = score_table(&["tristeza lluvia"]);
        let b = score_table(&["tristeza lluvia", "tristeza"]);
        let again = score_table(&["tristeza lluvia"]);
        assert_eq!(a, again);
        assert_ne!(a, b);
    }

    #[test]
    fn test_distinct_tokens() {
        assert_eq!(
            distinct_tokens("amor amor y calma, calma"),
            vec!["amor", "calma"]
        );
    }
}
