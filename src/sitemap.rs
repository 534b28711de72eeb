//! `sitemap.xml` and `robots.txt`.

use crate::config::Site;
use crate::fragment::{category_path, tag_path, Html};
use crate::index::ContentIndex;
use crate::post::Post;
use chrono::NaiveDate;
use url::Url;

/// A `<url>` element of the sitemap.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub loc: Url,
    pub lastmod: NaiveDate,
}

/// Lists every page of the site: home, contact, categories, tags, then
/// posts, each group in index order. Aggregate pages take the newest
/// `lastmod` of their posts, or `build_date` when they have none.
pub fn entries(
    site: &Site,
    index: &ContentIndex,
    build_date: NaiveDate,
) -> Result<Vec<Entry>, url::ParseError> {
    let all: Vec<&Post> = index.posts().iter().collect();

    let mut entries = vec![
        Entry {
            loc: site.url.clone(),
            lastmod: newest(&all, build_date),
        },
        Entry {
            loc: site.join("contacto/")?,
            lastmod: build_date,
        },
    ];
    for category in index.categories() {
        entries.push(Entry {
            loc: site.join(&category_path(&category.slug))?,
            lastmod: newest(&index.resolve(&category.posts), build_date),
        });
    }
    for entry in index.tags() {
        entries.push(Entry {
            loc: site.join(&tag_path(&entry.tag.slug))?,
            lastmod: newest(&index.resolve(&entry.posts), build_date),
        });
    }
    for post in index.posts() {
        entries.push(Entry {
            loc: post.url.clone(),
            lastmod: post.lastmod.date_naive(),
        });
    }
    Ok(entries)
}

/// The newest `lastmod` date among `posts`, or `fallback`.
pub fn newest(posts: &[&Post], fallback: NaiveDate) -> NaiveDate {
    posts
        .iter()
        .map(|p| p.lastmod.date_naive())
        .max()
        .unwrap_or(fallback)
}

pub fn render(entries: &[Entry]) -> String {
    let mut lines = vec![
        String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#),
        String::from(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#),
    ];
    for entry in entries {
        lines.push(format!(
            "<url><loc>{}</loc><lastmod>{}</lastmod></url>",
            Html(entry.loc.as_str()),
            entry.lastmod.format("%Y-%m-%d")
        ));
    }
    lines.push(String::from("</urlset>"));
    let mut xml = lines.join("\n");
    xml.push('\n');
    xml
}

pub fn robots(site: &Site) -> Result<String, url::ParseError> {
    Ok(format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        site.join("sitemap.xml")?
    ))
}
