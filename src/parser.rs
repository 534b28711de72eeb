//! Defines the [`Parser`] and [`Error`] types, which scan the posts tree into
//! [`Post`]s. The expected layout is `posts/<category>/<slug>/index.html`;
//! any other file inside a post folder is carried along as a static asset.
//!
//! Missing directories and missing metadata are never errors: an absent
//! `posts/` directory is an empty corpus, a post without `<title>` is titled
//! after its slug, and so on. Only failures to list directories that do exist
//! abort the scan.

use std::{
    collections::BTreeMap,
    fmt,
    fs::read_dir,
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

use crate::{html, post::Post, post::PostId, seo, tag::Tag};

/// The name of the authored file inside each post folder.
pub const POST_FILE: &str = "index.html";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `site_url` is the base URL of the site. Post URLs are
    /// `{site_url}/posts/{category}/{slug}/`.
    site_url: &'a Url,
}

/// Everything found in the posts tree.
#[derive(Default)]
pub struct Scan {
    /// Posts in scan order (category folder name, then post folder name).
    pub posts: Vec<Post>,

    /// Every category folder's slug, including folders with no posts.
    pub categories: Vec<String>,

    /// Non-post files found in post folders. When two folders resolve to
    /// the same [`PostId`], only the later folder's files are kept.
    pub assets: Vec<StaticFile>,
}

/// A file to copy: source path, and destination relative to the output
/// directory.
pub type StaticFile = (PathBuf, PathBuf);

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(site_url: &'a Url) -> Parser<'a> {
        Parser { site_url }
    }

    /// Walks `source_directory` and returns every post, category folder and
    /// post asset in it. Folder names are sorted before they are visited so
    /// the scan order never depends on the file system.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Scan> {
        let mut scan = Scan::default();
        let mut assets: BTreeMap<PostId, Vec<StaticFile>> = BTreeMap::new();
        for (category_name, category_dir) in subdirectories(source_directory)? {
            let category = slug::slugify(&category_name);
            if category.is_empty() {
                warn!(folder = %category_dir.display(), "skipping category without a usable slug");
                continue;
            }
            scan.categories.push(category.clone());

            for (post_name, post_dir) in subdirectories(&category_dir)? {
                let source_path = post_dir.join(POST_FILE);
                if !source_path.is_file() {
                    debug!(folder = %post_dir.display(), "skipping folder without {}", POST_FILE);
                    continue;
                }
                let slug = slug::slugify(&post_name);
                if slug.is_empty() {
                    warn!(folder = %post_dir.display(), "skipping post without a usable slug");
                    continue;
                }
                let id = PostId {
                    category: category.clone(),
                    slug,
                };

                let post = match self.parse_post(id, &source_path) {
                    Ok(Some(post)) => post,
                    Ok(None) => continue,
                    Err(e) => {
                        return Err(Error::Annotated(
                            format!("parsing post `{}`", source_path.display()),
                            Box::new(e),
                        ))
                    }
                };
                assets.insert(post.id.clone(), self.collect_assets(&post, &post_dir)?);
                scan.posts.push(post);
            }
        }
        scan.assets = assets.into_values().flatten().collect();
        Ok(scan)
    }

    /// Parses a single post. Returns `Ok(None)` when the file cannot be read,
    /// which is treated like a missing post.
    fn parse_post(&self, id: PostId, source_path: &Path) -> Result<Option<Post>> {
        let bytes = match std::fs::read(source_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %source_path.display(), error = %e, "skipping unreadable post");
                return Ok(None);
            }
        };
        let input = String::from_utf8_lossy(&bytes);
        let lastmod: DateTime<Utc> = std::fs::metadata(source_path)?.modified()?.into();

        let body = html::body_text(&input);
        let title = match html::title(&input) {
            t if t.is_empty() => id.slug.replace('-', " "),
            t => t,
        };
        let description = match html::meta(&input, "description") {
            d if d.is_empty() => seo::fallback_description(&body),
            d => d,
        };
        let url = self
            .site_url
            .join(&format!("posts/{}/{}/", id.category, id.slug))?;

        Ok(Some(Post {
            title,
            description,
            excerpt: html::first_paragraph(&input),
            tags: Tag::from_raw(&html::raw_tags(&input)),
            body,
            lastmod,
            url,
            source_path: source_path.to_owned(),
            id,
        }))
    }

    fn collect_assets(&self, post: &Post, post_dir: &Path) -> Result<Vec<StaticFile>> {
        let mut assets = Vec::new();
        let output_dir = Path::new("posts")
            .join(&post.id.category)
            .join(&post.id.slug);
        for result in WalkDir::new(post_dir).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
            let entry = result?;
            if !entry.file_type().is_file() || entry.path() == post.source_path.as_path() {
                continue;
            }
            // strip_prefix shouldn't fail since `post_dir` is always an
            // ancestor of the entry
            if let Ok(relative) = entry.path().strip_prefix(post_dir) {
                assets.push((entry.path().to_owned(), output_dir.join(relative)));
            }
        }
        Ok(assets)
    }
}

/// Lists the subdirectories of `dir` as `(name, path)` pairs sorted by name.
/// A missing `dir` has no subdirectories.
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(e)),
    };

    let mut dirs = Vec::new();
    for result in entries {
        let entry = result?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => dirs.push((name, entry.path())),
            Err(name) => warn!(name = ?name, "skipping folder with a non-UTF-8 name"),
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error scanning the posts tree.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a problem building post URLs.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible directory walks.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
