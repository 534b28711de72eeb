//! Pattern-based metadata extraction from hand-authored post HTML. This is
//! deliberately not a DOM parser: posts are small, regular fragments and we
//! only need the title, a couple of `<meta>` values, the first paragraph and
//! the tag hints.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").expect("script pattern"));
static STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").expect("style pattern"));
static ELEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("element pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title>(.*?)</title>").expect("title pattern"));
static BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("body pattern"));
static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("paragraph pattern"));
static DATA_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)data-tags=["']([^"']+)["']"#).expect("data-tags pattern"));
static TAG_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<!--\s*tags:\s*(.*?)-->").expect("tag comment pattern"));

/// Reduces an HTML fragment to its visible text: drops scripts, styles and
/// markup, decodes the handful of entities authors actually use, and
/// collapses whitespace.
pub fn strip_html(html: &str) -> String {
    let text = SCRIPT.replace_all(html, " ");
    let text = STYLE.replace_all(&text, " ");
    let text = ELEMENT.replace_all(&text, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    WHITESPACE.replace_all(&text, " ").trim().to_owned()
}

/// The `content` of `<meta name="{name}" content="...">`, or `""`.
pub fn meta(html: &str, name: &str) -> String {
    let pattern = format!(
        r#"(?i)<meta\s+name=["']{}["']\s+content=["']([^"']+)["']\s*/?>"#,
        regex::escape(name)
    );
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(html)
            .map(|c| c[1].trim().to_owned())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// The text of the `<title>` element, or `""`.
pub fn title(html: &str) -> String {
    TITLE
        .captures(html)
        .map(|c| strip_html(&c[1]))
        .unwrap_or_default()
}

/// The visible text inside `<body>`, or of the whole document when it has
/// no `<body>` element (a bare fragment).
pub fn body_text(html: &str) -> String {
    match BODY.captures(html) {
        Some(c) => strip_html(&c[1]),
        None => strip_html(html),
    }
}

/// The text of the first `<p>` element, or `""`.
pub fn first_paragraph(html: &str) -> String {
    PARAGRAPH
        .captures(html)
        .map(|c| strip_html(&c[1]))
        .unwrap_or_default()
}

/// Raw tag strings, in discovery order: `<meta name="keywords">`, then any
/// `data-tags="..."` attribute, then a `<!-- tags: ... -->` comment. The
/// strings are not normalized or deduplicated here.
pub fn raw_tags(html: &str) -> Vec<String> {
    let mut sources = vec![meta(html, "keywords")];
    if let Some(c) = DATA_TAGS.captures(html) {
        sources.push(c[1].to_owned());
    }
    if let Some(c) = TAG_COMMENT.captures(html) {
        sources.push(c[1].to_owned());
    }
    sources
        .iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Splits prose into sentences. A sentence ends at `.`, `!` or `?` followed
/// by whitespace; the terminator stays with its sentence.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let sentence = text[start..i].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = i;
        }
        prev = Some(c);
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}
