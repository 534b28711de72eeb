//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: scanning the posts
//! ([`crate::parser`]), indexing and analyzing them ([`crate::index`]),
//! rendering pages ([`crate::write`]), copying static files, and writing the
//! sitemap, `robots.txt`, `categories.json` and the Atom feed.

use crate::config::{Config, STATIC_DIRECTORIES};
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::index::ContentIndex;
use crate::parser::{Error as ParseError, Parser as PostParser, StaticFile};
use crate::sitemap;
use crate::template::{Error as TemplateError, Templates};
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Counts reported at the end of a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub categories: usize,
    pub tags: usize,
    pub pages: usize,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`PostParser::parse_posts`], [`ContentIndex::analyze`],
/// [`Writer::write_pages`] and [`write_feed`] which do the heavy-lifting.
/// This function also copies static assets into the output directory.
pub fn build_site(config: &Config) -> Result<Summary> {
    check_output_directory(config)?;
    let templates = Templates::load(&config.templates_directory)?;

    // collect all posts
    let scan = PostParser::new(&config.site.url).parse_posts(&config.posts_source_directory)?;
    info!(posts = scan.posts.len(), "scanned posts");

    let index = ContentIndex::build(scan.posts, &scan.categories, |slug| {
        config.category_name(slug)
    });
    let analysis = index.analyze(config.weights, config.related_limit);

    // Blow away the old output directory so stale pages from deleted posts
    // don't survive the rebuild.
    rmdir(&config.output_directory)?;
    std::fs::create_dir_all(&config.output_directory)?;

    let writer = Writer {
        templates: &templates,
        site: &config.site,
        output_directory: &config.output_directory,
        build_date: config.build_date,
        latest_posts: config.latest_posts,
        top_tags: config.top_tags,
        featured_per_category: config.featured_per_category,
    };
    let pages = writer.write_pages(&index, &analysis)?;
    writer.write_categories_json(&index, &analysis)?;

    // copy static directories and post assets
    for name in STATIC_DIRECTORIES {
        copy_dir(
            &config.root_directory.join(name),
            &config.output_directory.join(name),
        )?;
    }
    copy_files(&scan.assets, &config.output_directory)?;

    let entries = sitemap::entries(&config.site, &index, config.build_date)?;
    std::fs::write(
        config.output_directory.join("sitemap.xml"),
        sitemap::render(&entries),
    )?;
    std::fs::write(
        config.output_directory.join("robots.txt"),
        sitemap::robots(&config.site)?,
    )?;

    // create the atom feed
    write_feed(
        &FeedConfig {
            site: &config.site,
            build_date: config.build_date,
        },
        &index.latest(config.latest_posts),
        File::create(config.output_directory.join("feed.atom"))?,
    )?;

    let summary = Summary {
        posts: index.posts().len(),
        categories: index.categories().len(),
        tags: index.tags().len(),
        pages,
    };
    info!(
        pages = summary.pages,
        "Build OK: {} posts | {} categories | {} tags",
        summary.posts,
        summary.categories,
        summary.tags
    );
    Ok(summary)
}

/// Refuses output directories whose removal would take the sources with
/// them: the project root or any directory containing it, and anything
/// inside the posts or templates directories. Paths are compared after
/// resolving `..`, `.` and symlinks, so aliases of the same directory are
/// caught.
fn check_output_directory(config: &Config) -> Result<()> {
    let output = resolve(&config.output_directory)?;
    let root = resolve(&config.root_directory)?;
    let posts = resolve(&config.posts_source_directory)?;
    let templates = resolve(&config.templates_directory)?;
    let unsafe_target = root.starts_with(&output)
        || posts.starts_with(&output)
        || templates.starts_with(&output)
        || output.starts_with(&posts)
        || output.starts_with(&templates);
    match unsafe_target {
        true => Err(Error::UnsafeOutput(config.output_directory.to_owned())),
        false => Ok(()),
    }
}

/// Makes `path` absolute, drops `.` and `..` components, then canonicalizes
/// its nearest existing ancestor. The missing tail is appended unchanged.
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = match path.is_absolute() {
        true => path.to_owned(),
        false => std::env::current_dir()?.join(path),
    };
    let mut normal = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }

    let mut missing = Vec::new();
    let mut existing = normal.as_path();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_owned());
                        existing = parent;
                    }
                    _ => break,
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(normal)
}

/// Recursively copies `src` into `dst`. A missing `src` copies nothing.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        debug!(dir = %src.display(), "no static directory");
        return Ok(());
    }
    for result in WalkDir::new(src).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is the walk root
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copies each `(source, destination)` pair, with destinations relative to
/// `output_directory`.
fn copy_files(files: &[StaticFile], output_directory: &Path) -> Result<()> {
    for (src, relative) in files {
        let target = output_directory.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, &target)?;
    }
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, loading template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned when the output directory contains the project sources.
    UnsafeOutput(PathBuf),

    /// Returned for problems loading template files.
    Template(TemplateError),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned when a sitemap URL cannot be built.
    UrlParse(url::ParseError),

    /// Returned for errors walking static directories.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::UnsafeOutput(path) => write!(
                f,
                "Refusing to clean '{}': it contains the project sources",
                path.display()
            ),
            Error::Template(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::UnsafeOutput(_) => None,
            Error::Template(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
