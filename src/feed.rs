//! Support for creating Atom feeds from a list of posts.

use crate::config::Site;
use crate::post::Post;
use atom_syndication::{Category, Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::io::Write;

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub site: &'a Site,

    /// Used as the feed's `updated` time when there are no posts.
    pub build_date: NaiveDate,
}

/// Creates a feed from the most recent `posts` (newest first) and writes the
/// result to a [`std::io::Write`].
pub fn write_feed<W: Write>(config: &FeedConfig, posts: &[&Post], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: &FeedConfig, posts: &[&Post]) -> Result<Feed> {
    let site = config.site;
    let updated: DateTime<Utc> = match posts.iter().map(|p| p.lastmod).max() {
        Some(lastmod) => lastmod,
        None => Utc.from_utc_datetime(&config.build_date.and_hms_opt(0, 0, 0).unwrap_or_default()),
    };

    let mut feed = Feed::default();
    feed.set_title(site.name.clone());
    feed.set_id(site.url.to_string());
    feed.set_updated(updated);
    feed.set_lang(site.lang.clone());
    feed.set_authors(author_to_people(&site.author));
    feed.set_links(vec![
        link(site.url.as_str(), "alternate"),
        link(site.join("feed.atom")?.as_str(), "self"),
    ]);
    feed.set_entries(
        posts
            .iter()
            .map(|post| feed_entry(site, post))
            .collect::<Vec<Entry>>(),
    );
    Ok(feed)
}

fn feed_entry(site: &Site, post: &Post) -> Entry {
    let mut entry = Entry::default();
    entry.set_id(post.url.to_string());
    entry.set_title(post.title.clone());
    let lastmod: DateTime<FixedOffset> = post.lastmod.into();
    entry.set_updated(lastmod);
    entry.set_published(lastmod);
    entry.set_authors(author_to_people(&site.author));
    entry.set_links(vec![link(post.url.as_str(), "alternate")]);
    let summary = post.blurb(crate::fragment::BLURB_CHARS);
    if !summary.is_empty() {
        entry.set_summary(Text::from(summary));
    }
    entry.set_categories(
        post.tags
            .iter()
            .map(|tag| {
                let mut category = Category::default();
                category.set_term(tag.slug.clone());
                category.set_label(Some(tag.label.clone()));
                category
            })
            .collect::<Vec<Category>>(),
    );
    entry
}

fn link(href: &str, rel: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link
}

fn author_to_people(author: &str) -> Vec<Person> {
    match author.trim() {
        "" => Vec::new(),
        name => {
            let mut person = Person::default();
            person.set_name(name);
            vec![person]
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, Atom, and
/// URL issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when the feed's own URL cannot be built.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator when building feed links.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
