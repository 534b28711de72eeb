//! HTML fragments interpolated into page templates: the category pill bar,
//! post lists, the tag cloud and the related-posts block. All text coming
//! from posts or configuration is escaped on the way in.

use crate::index::{Category, TagEntry};
use crate::post::Post;
use crate::related::Related;
use pulldown_cmark::escape::{escape_href, escape_html, StrWrite};
use std::fmt::{self, Display};
use std::io;

/// Maximum characters of excerpt shown under a post link.
pub const BLURB_CHARS: usize = 140;

/// Maximum tag links shown under a post link.
pub const TAGS_PER_ITEM: usize = 6;

struct Adaptor<'a, T> {
    formatter: &'a mut T,
    result: fmt::Result,
}

impl<T> Adaptor<'_, T> {
    fn handle_result(&mut self, result: fmt::Result) -> io::Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.result = result;
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}

impl<T: fmt::Write> StrWrite for Adaptor<'_, T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let result = self.formatter.write_str(s);
        self.handle_result(result)
    }

    fn write_fmt(&mut self, args: fmt::Arguments) -> io::Result<()> {
        let result = self.formatter.write_fmt(args);
        self.handle_result(result)
    }
}

/// Displays its text escaped for an HTML text node or attribute value.
pub struct Html<'a>(pub &'a str);

impl Display for Html<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_html(&mut adaptor, self.0);
        adaptor.result
    }
}

/// Displays its text escaped for an `href` attribute.
pub struct Href<'a>(pub &'a str);

impl Display for Href<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_href(&mut adaptor, self.0);
        adaptor.result
    }
}

/// Site-relative path of a category page.
pub fn category_path(slug: &str) -> String {
    format!("categories/{}/", slug)
}

/// Site-relative path of a tag page.
pub fn tag_path(slug: &str) -> String {
    format!("tags/{}/", slug)
}

/// One pill link per category.
pub fn category_pills(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| {
            format!(
                r#"<a class="pill" href="/{}">{}</a>"#,
                Href(&category_path(&c.slug)),
                Html(&c.name)
            )
        })
        .collect::<Vec<String>>()
        .join("")
}

/// A post listing with blurbs and tag links. An empty listing tells the
/// author where the first post goes.
pub fn post_list(posts: &[&Post]) -> String {
    if posts.is_empty() {
        return String::from(
            "<p><strong>0 publicaciones</strong><br> Todavía no hay publicaciones. \
             Subí tu primer post en <code>/posts/&lt;categoria&gt;/&lt;post&gt;/index.html</code>.</p>",
        );
    }
    let items: String = posts.iter().map(|post| post_item(post)).collect();
    format!(r#"<ul class="postlist">{}</ul>"#, items)
}

fn post_item(post: &Post) -> String {
    let blurb = match post.blurb(BLURB_CHARS) {
        b if b.is_empty() => String::new(),
        b => format!(r#"<div class="muted">{}</div>"#, Html(&b)),
    };
    let tags = match post.tags.is_empty() {
        true => String::new(),
        false => format!(
            r#"<div class="tags">{}</div>"#,
            post.tags
                .iter()
                .take(TAGS_PER_ITEM)
                .map(|t| format!(
                    r#"<a class="tag" href="/{}">{}</a>"#,
                    Href(&tag_path(&t.slug)),
                    Html(&t.label)
                ))
                .collect::<Vec<String>>()
                .join(" ")
        ),
    };
    format!(
        r#"<li class="postitem"><a href="{}">{}</a>{}{}</li>"#,
        Href(post.url.as_str()),
        Html(&post.title),
        blurb,
        tags
    )
}

/// A tag cloud with post counts.
pub fn tag_cloud(tags: &[&TagEntry]) -> String {
    if tags.is_empty() {
        return String::from("<p>Todavía no hay etiquetas.</p>");
    }
    let links: Vec<String> = tags
        .iter()
        .map(|entry| {
            format!(
                r#"<a class="tag" href="/{}">{} <span class="muted">({})</span></a>"#,
                Href(&tag_path(&entry.tag.slug)),
                Html(&entry.tag.label),
                entry.posts.len()
            )
        })
        .collect();
    format!(r#"<div class="tagcloud">{}</div>"#, links.join(" "))
}

/// The featured-posts block of a category page; empty when there is
/// nothing to feature.
pub fn featured_posts(posts: &[&Post]) -> String {
    match posts.is_empty() {
        true => String::new(),
        false => post_list(posts),
    }
}

/// The block appended to post pages; empty when there are no related posts.
pub fn related_posts(related: &[Related]) -> String {
    if related.is_empty() {
        return String::new();
    }
    let items: String = related
        .iter()
        .map(|r| {
            format!(
                r#"<li class="postitem"><a href="{}">{}</a></li>"#,
                Href(r.post.url.as_str()),
                Html(&r.post.title)
            )
        })
        .collect();
    format!(
        r#"<section class="block related"><h3>Seguí leyendo</h3><ul class="postlist">{}</ul></section>"#,
        items
    )
}

/// A comma-separated keyword list for `<meta name="keywords">`.
pub fn keywords<S: AsRef<str>>(keywords: &[S]) -> String {
    let list = keywords
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<&str>>()
        .join(", ");
    Html(&list).to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture::post;
    use crate::tag::Tag;

    #[test]
    fn test_escaping() {
        assert_eq!(
            Html("<b>\"a\" & b</b>").to_string(),
            "&lt;b&gt;&quot;a&quot; &amp; b&lt;/b&gt;"
        );
        assert_eq!(Href("/tags/a b/").to_string(), "/tags/a%20b/");
    }

    #[test]
    fn test_post_list() {
        let mut p = post("amor", "cartas", "Cartas <3", "", &["Amor", "Mañana"]);
        p.excerpt = "a".repeat(150);
        let html = post_list(&[&p]);
        assert!(html.starts_with(
            r#"<ul class="postlist"><li class="postitem"><a href="https://example.com/posts/amor/cartas/">Cartas &lt;3</a>"#
        ));
        assert!(html.contains(&format!(r#"<div class="muted">{}…</div>"#, "a".repeat(140))));
        assert!(html.contains(r#"<a class="tag" href="/tags/manana/">Mañana</a>"#));
    }

    #[test]
    fn test_post_list_limits_tags() {
        let tags = ["a1", "b2", "c3", "d4", "e5", "f6", "g7"];
        let p = post("c", "s", "T", "", &tags);
        let html = post_list(&[&p]);
        assert!(html.contains("/tags/f6/"));
        assert!(!html.contains("/tags/g7/"));
        assert!(!html.contains("muted"));
    }

    #[test]
    fn test_empty_post_list() {
        assert!(post_list(&[]).contains("0 publicaciones"));
        assert_eq!(featured_posts(&[]), "");
        assert_eq!(related_posts(&[]), "");
    }

    #[test]
    fn test_tag_cloud() {
        let entry = TagEntry {
            tag: Tag::new("Café").unwrap(),
            posts: vec![0, 3],
        };
        assert_eq!(
            tag_cloud(&[&entry]),
            r#"<div class="tagcloud"><a class="tag" href="/tags/cafe/">Café <span class="muted">(2)</span></a></div>"#
        );
        assert_eq!(tag_cloud(&[]), "<p>Todavía no hay etiquetas.</p>");
    }

    #[test]
    fn test_category_pills() {
        let categories = vec![Category {
            slug: "buenos-dias".to_owned(),
            name: "buenos días".to_owned(),
            posts: Vec::new(),
        }];
        assert_eq!(
            category_pills(&categories),
            r#"<a class="pill" href="/categories/buenos-dias/">buenos días</a>"#
        );
    }

    #[test]
    fn test_related_posts() {
        let p = post("c", "s", "Título", "", &[]);
        let html = related_posts(&[Related {
            post: &p,
            score: 1.0,
            padded: false,
        }]);
        assert!(html.contains(r#"<a href="https://example.com/posts/c/s/">Título</a>"#));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(keywords(&["amor", "café & té"]), "amor, café &amp; té");
    }
}
