//! Renders every HTML page of the site and writes it to disk, along with
//! `categories.json`.

use crate::config::Site;
use crate::fragment::{self, category_path, tag_path, Html};
use crate::index::{Analysis, ContentIndex};
use crate::post::Post;
use crate::seo;
use crate::shuffle::{bucket_seed, seeded_shuffle, time_bucket};
use crate::template::{render, render_post, Fields, Placeholder, Templates};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const HOME_TITLE: &str = "Buenos días de verdad";
const HOME_DESCRIPTION: &str = "Textos cortos, reales y humanos para abrir el día. \
    Hecho para leer rápido y sentir que te hablan a vos. Sin humo.";
const HOME_KEYWORDS: &[&str] = &[
    "buenos días",
    "textos",
    "mañana",
    "motivación real",
    "ansiedad",
    "ánimo",
    "esperanza",
];

/// Responsible for templating and writing HTML pages to disk from the
/// [`ContentIndex`] and its [`Analysis`].
pub struct Writer<'a> {
    pub templates: &'a Templates,
    pub site: &'a Site,

    /// Pages are written to `{output_directory}/{page path}/index.html`.
    pub output_directory: &'a Path,

    /// Fixes `{{YEAR}}` and the featured-posts rotation.
    pub build_date: NaiveDate,

    /// Number of posts on the home page.
    pub latest_posts: usize,

    /// Number of tags in the home page's tag cloud.
    pub top_tags: usize,

    /// Number of featured posts on each category page.
    pub featured_per_category: usize,
}

/// An output HTML file. `path` is the site-relative directory of the page
/// (empty for the home page).
#[derive(Debug)]
pub struct Page {
    pub path: String,
    pub html: String,
}

impl Writer<'_> {
    /// Renders and writes every page. Returns the number of pages written.
    pub fn write_pages(&self, index: &ContentIndex, analysis: &Analysis) -> Result<usize> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let pages = self.pages(index, analysis)?;
        for page in &pages {
            let dir = self.output_directory.join(&page.path);
            if seen_dirs.insert(dir.clone()) {
                std::fs::create_dir_all(&dir)?;
            }
            std::fs::write(dir.join("index.html"), &page.html)?;
            debug!(page = %page.path, "wrote page");
        }
        Ok(pages.len())
    }

    /// Renders every page: home, contact, categories, tags, then posts.
    pub fn pages(&self, index: &ContentIndex, analysis: &Analysis) -> Result<Vec<Page>> {
        let pills = fragment::category_pills(index.categories());
        let mut pages = vec![self.home_page(index, &pills), self.contact_page(&pills)?];

        for (category, seo) in index.categories().iter().zip(&analysis.categories) {
            let posts = index.resolve(&category.posts);
            let seed = bucket_seed(&time_bucket(self.build_date), &category.slug);
            let mut featured = seeded_shuffle(posts.iter().copied(), &seed);
            featured.truncate(self.featured_per_category);

            let path = category_path(&category.slug);
            let fields = self
                .common_fields(&pills)
                .with(
                    Placeholder::Title,
                    Html(&format!("{} — {}", category.name, self.site.author)).to_string(),
                )
                .with(Placeholder::Description, Html(&seo.meta_description).to_string())
                .with(Placeholder::Keywords, fragment::keywords(&seo.keywords))
                .with(Placeholder::Canonical, self.canonical(&path)?)
                .with(Placeholder::H1, Html(&category.name.to_uppercase()).to_string())
                .with(
                    Placeholder::CategorySeoDescription,
                    Html(&seo.description).to_string(),
                )
                .with(Placeholder::FeaturedPosts, fragment::featured_posts(&featured))
                .with(Placeholder::PostList, fragment::post_list(&posts));
            pages.push(Page {
                html: render(&self.templates.category, &fields),
                path,
            });
        }

        for entry in index.tags() {
            let posts = index.resolve(&entry.posts);
            let label = &entry.tag.label;
            let path = tag_path(&entry.tag.slug);
            let fields = self
                .common_fields(&pills)
                .with(
                    Placeholder::Title,
                    Html(&format!("{} — etiquetas — {}", label, self.site.author)).to_string(),
                )
                .with(
                    Placeholder::Description,
                    Html(&seo::tag_description(label, posts.len())).to_string(),
                )
                .with(Placeholder::Canonical, self.canonical(&path)?)
                .with(Placeholder::H1, Html(&format!("Etiqueta: {}", label)).to_string())
                .with(Placeholder::PostList, fragment::post_list(&posts));
            pages.push(Page {
                html: render(&self.templates.tag, &fields),
                path,
            });
        }

        for (post, result) in index.posts().iter().zip(&analysis.posts) {
            let fields = self
                .common_fields(&pills)
                .with(Placeholder::Title, Html(&post.title).to_string())
                .with(Placeholder::Description, Html(&post.description).to_string())
                .with(Placeholder::Keywords, fragment::keywords(&result.keywords))
                .with(Placeholder::Canonical, Html(post.url.as_str()).to_string())
                .with(Placeholder::RelatedPosts, fragment::related_posts(&result.related));
            pages.push(Page {
                html: render_post(&read_post(post)?, &fields),
                path: format!("posts/{}/{}/", post.id.category, post.id.slug),
            });
        }

        Ok(pages)
    }

    fn home_page(&self, index: &ContentIndex, pills: &str) -> Page {
        let fields = self
            .common_fields(pills)
            .with(
                Placeholder::Title,
                Html(&format!("{} — {}", HOME_TITLE, self.site.author)).to_string(),
            )
            .with(Placeholder::Description, Html(HOME_DESCRIPTION).to_string())
            .with(Placeholder::Keywords, fragment::keywords(HOME_KEYWORDS))
            .with(Placeholder::Canonical, Html(self.site.url.as_str()).to_string())
            .with(
                Placeholder::LatestPosts,
                fragment::post_list(&index.latest(self.latest_posts)),
            )
            .with(
                Placeholder::TopTags,
                fragment::tag_cloud(&index.top_tags(self.top_tags)),
            );
        Page {
            path: String::new(),
            html: render(&self.templates.index, &fields),
        }
    }

    fn contact_page(&self, pills: &str) -> Result<Page> {
        let author = &self.site.author;
        let fields = self
            .common_fields(pills)
            .with(
                Placeholder::Title,
                Html(&format!("Contacto — {}", author)).to_string(),
            )
            .with(
                Placeholder::Description,
                Html(&format!("Contacto directo con {}", author)).to_string(),
            )
            .with(Placeholder::Canonical, self.canonical("contacto/")?);
        Ok(Page {
            path: String::from("contacto/"),
            html: render(&self.templates.contact, &fields),
        })
    }

    /// Fields shared by every page.
    fn common_fields(&self, pills: &str) -> Fields {
        Fields::new()
            .with(Placeholder::Lang, Html(&self.site.lang).to_string())
            .with(Placeholder::Year, self.build_date.format("%Y").to_string())
            .with(Placeholder::CategoriesPills, pills)
    }

    fn canonical(&self, path: &str) -> Result<String> {
        Ok(Html(self.site.join(path)?.as_str()).to_string())
    }

    /// Writes `categories.json`: one object per category keyed by slug.
    pub fn write_categories_json(
        &self,
        index: &ContentIndex,
        analysis: &Analysis,
    ) -> Result<()> {
        let updated_at = self.build_date.format("%Y-%m-%d").to_string();
        let meta: BTreeMap<&str, CategoryMeta> = index
            .categories()
            .iter()
            .zip(&analysis.categories)
            .map(|(category, seo)| {
                (
                    category.slug.as_str(),
                    CategoryMeta {
                        name: &category.slug,
                        display: &category.name,
                        description: &seo.description,
                        count: category.posts.len(),
                        updated_at: updated_at.clone(),
                    },
                )
            })
            .collect();
        let mut json = serde_json::to_string_pretty(&meta)?;
        json.push('\n');
        std::fs::write(self.output_directory.join("categories.json"), json)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CategoryMeta<'a> {
    name: &'a str,
    display: &'a str,
    description: &'a str,
    count: usize,
    updated_at: String,
}

/// Reads a post's authored HTML again for rendering.
fn read_post(post: &Post) -> Result<String> {
    match std::fs::read(&post.source_path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => Err(Error::ReadPost {
            path: post.source_path.clone(),
            err,
        }),
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's source can no longer be read.
    ReadPost { path: PathBuf, err: io::Error },

    /// Returned when a page URL cannot be built.
    UrlParse(url::ParseError),

    /// Returned when `categories.json` cannot be serialized.
    Json(serde_json::Error),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to
    /// use the `?` operator when building canonical URLs.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`].
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadPost { path, err } => {
                write!(f, "Reading post '{}': {}", path.display(), err)
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadPost { path: _, err } => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
