//! Synthesized SEO text: category descriptions built around the category's
//! top keywords, tag page descriptions, and fallbacks for posts that do not
//! carry a meta description.

use crate::html::sentences;
use crate::keywords::{score_table, top_keywords};
use crate::post::Post;

/// Character budget for `<meta name="description">`.
pub const META_DESCRIPTION_BUDGET: usize = 170;

/// Character budget for descriptions shown on the page itself.
pub const PAGE_DESCRIPTION_BUDGET: usize = 220;

/// Keywords considered when writing a category description.
const DESCRIPTION_KEYWORDS: usize = 10;

/// Keywords named in the closing sentence of a category description.
const NAMED_KEYWORDS: usize = 6;

/// Keywords listed in a category's `<meta name="keywords">`.
const META_KEYWORDS: usize = 8;

/// Keywords listed in a post's `<meta name="keywords">`.
const POST_KEYWORDS: usize = 8;

/// Brand-voice lines. A category uses one of them, picked by its post count.
const FILLERS: &[&str] = &[
    "Acá no venís a “leer frases”. Venís a encontrarte.",
    "Textos cortos, reales, para abrir el día sin maquillaje.",
    "Si estás en una mañana rota, esto te habla como a vos.",
];

/// Everything the category page needs from the keyword scorer.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySeo {
    /// Description shown on the category page.
    pub description: String,

    /// Description for the `<meta>` tag; a shorter cut of the same text.
    pub meta_description: String,

    /// The display name followed by the category's top keywords.
    pub keywords: Vec<String>,
}

/// Builds the SEO text for a category from its posts.
pub fn category_seo(display_name: &str, posts: &[&Post]) -> CategorySeo {
    let documents: Vec<String> = posts.iter().map(|p| p.seo_text()).collect();
    let table = score_table(&documents);
    let raw = category_text(display_name, posts.len(), &table.top(DESCRIPTION_KEYWORDS));

    let mut keywords = vec![display_name.to_owned()];
    keywords.extend(table.top(META_KEYWORDS));

    CategorySeo {
        description: fit_sentences(&raw, PAGE_DESCRIPTION_BUDGET),
        meta_description: fit_sentences(&raw, META_DESCRIPTION_BUDGET),
        keywords,
    }
}

/// The untruncated category description: name, post count, one brand-voice
/// line, and a closing sentence naming the top keywords.
fn category_text(display_name: &str, post_count: usize, keywords: &[String]) -> String {
    let count = match post_count {
        0 => "Todavía está naciendo.".to_owned(),
        n => format!("Ahora mismo hay {} publicaciones.", n),
    };
    let closing = match keywords.is_empty() {
        true => "De a poco se va armando con lo que vas viviendo.".to_owned(),
        false => {
            let named: Vec<&str> = keywords
                .iter()
                .take(NAMED_KEYWORDS)
                .map(String::as_str)
                .collect();
            format!("Se toca mucho: {}.", named.join(", "))
        }
    };
    [
        format!("En esta categoría: {}.", display_name),
        count,
        FILLERS[post_count % FILLERS.len()].to_owned(),
        closing,
    ]
    .join(" ")
}

/// Description for a tag page.
pub fn tag_description(label: &str, post_count: usize) -> String {
    format!(
        "Lecturas que tocan: {}. {} publicaciones, sin humo.",
        label, post_count
    )
}

/// Keywords for a single post page, scored over that post alone.
pub fn post_keywords(post: &Post) -> Vec<String> {
    top_keywords(&[post.ranking_text()], POST_KEYWORDS)
}

/// A description for a post whose source has none: the first sentence of
/// its visible text, within the meta budget.
pub fn fallback_description(body: &str) -> String {
    match sentences(body).first() {
        Some(first) => fit_sentences(first, META_DESCRIPTION_BUDGET),
        None => String::new(),
    }
}

/// Packs whole sentences of `text` into `budget` characters, stopping at the
/// first sentence that would overflow. If even the first sentence is too
/// long, the text is cut at `budget` characters instead.
pub fn fit_sentences(text: &str, budget: usize) -> String {
    let mut out = String::new();
    let mut len = 0;
    for sentence in sentences(text) {
        let extra = sentence.chars().count() + if out.is_empty() { 0 } else { 1 };
        if len + extra > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(sentence);
        len += extra;
    }
    if out.is_empty() {
        let collapsed = text.split_whitespace().collect::<Vec<&str>>().join(" ");
        out = collapsed.chars().take(budget).collect::<String>().trim_end().to_owned();
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture::post;

    #[test]
    fn test_fit_sentences_stops_at_overflow() {
        let text = "Uno dos. Tres cuatro cinco. Seis.";
        assert_eq!(fit_sentences(text, 100), text);
        assert_eq!(fit_sentences(text, 27), "Uno dos. Tres cuatro cinco.");
        // "Seis." would fit after the overflow, but packing stops there.
        assert_eq!(fit_sentences(text, 20), "Uno dos.");
    }

    #[test]
    fn test_fit_sentences_hard_cut() {
        assert_eq!(fit_sentences("Añoranzas infinitas.", 8), "Añoranza");
        assert_eq!(fit_sentences("", 8), "");
    }

    #[test]
    fn test_category_seo_names_keywords() {
        let a = post("amor", "a", "Cartas de amor", "", &[]);
        let b = post("amor", "b", "Amor sin apuro", "", &[]);
        let posts = vec![&a, &b];
        let seo = category_seo("amor", &posts);

        assert!(seo
            .description
            .starts_with("En esta categoría: amor. Ahora mismo hay 2 publicaciones."));
        assert!(seo.description.contains("Se toca mucho: "));
        assert!(seo.description.chars().count() <= PAGE_DESCRIPTION_BUDGET);
        assert!(seo.meta_description.chars().count() <= META_DESCRIPTION_BUDGET);
        assert!(seo.description.starts_with(&seo.meta_description));
        assert_eq!(seo.keywords[0], "amor");
        assert!(seo.keywords.len() <= 1 + META_KEYWORDS);
        assert!(seo.keywords.iter().any(|k| k == "cartas"));
    }

    #[test]
    fn test_empty_category() {
        let seo = category_seo("trabajo", &[]);
        assert_eq!(
            seo.description,
            "En esta categoría: trabajo. Todavía está naciendo. Acá no venís a “leer frases”. Venís a encontrarte. De a poco se va armando con lo que vas viviendo."
        );
        assert_eq!(seo.keywords, vec!["trabajo"]);
    }

    #[test]
    fn test_category_seo_is_repeatable() {
        let a = post("vida", "a", "Lunes de lluvia", "", &[]);
        let b = post("vida", "b", "Martes de sol", "", &[]);
        let posts = vec![&a, &b];
        assert_eq!(category_seo("vida", &posts), category_seo("vida", &posts));
    }

    #[test]
    fn test_fallback_description() {
        assert_eq!(
            fallback_description("Primero el café. Después, el mundo."),
            "Primero el café."
        );
        assert_eq!(fallback_description(""), "");
    }

    #[test]
    fn test_tag_description() {
        assert_eq!(
            tag_description("Mañana", 3),
            "Lecturas que tocan: Mañana. 3 publicaciones, sin humo."
        );
    }
}
