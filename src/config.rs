//! Loads the build configuration. Everything has a default, so a project
//! with no `alba.yaml` at all still builds; the file only needs the keys
//! that differ.

use crate::related::Weights;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// Name of the optional project file at the project root.
pub const PROJECT_FILE: &str = "alba.yaml";

/// Asset directories copied verbatim from the project root to the output.
pub const STATIC_DIRECTORIES: &[&str] = &["css", "js", "img"];

#[derive(Deserialize)]
#[serde(default)]
struct Project {
    name: String,
    url: String,
    lang: String,
    author: String,
    latest_posts: usize,
    top_tags: usize,
    featured_per_category: usize,
    categories: BTreeMap<String, String>,
    related: Related,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            name: String::from("BUENOSDIA.COM"),
            url: String::from("https://buenosdia.com"),
            lang: String::from("es-AR"),
            author: String::from("buenosdia.com"),
            latest_posts: 15,
            top_tags: 20,
            featured_per_category: 3,
            categories: BTreeMap::new(),
            related: Related::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Related {
    limit: usize,
    #[serde(flatten)]
    weights: Weights,
}

impl Default for Related {
    fn default() -> Self {
        Related {
            limit: 4,
            weights: Weights::default(),
        }
    }
}

/// Site-wide identity used by every page.
#[derive(Clone, Debug)]
pub struct Site {
    pub name: String,

    /// The site's base URL. Always ends in `/` so that relative joins land
    /// beneath it.
    pub url: Url,

    pub lang: String,
    pub author: String,
}

impl Site {
    /// Joins a site-relative path (e.g. `tags/amor/`) onto the base URL.
    pub fn join(&self, path: &str) -> std::result::Result<Url, url::ParseError> {
        self.url.join(path)
    }
}

/// The fully-resolved configuration for one build.
pub struct Config {
    pub site: Site,
    pub root_directory: PathBuf,
    pub posts_source_directory: PathBuf,
    pub templates_directory: PathBuf,
    pub output_directory: PathBuf,

    /// The build date. Fixes the rotation bucket, `{{YEAR}}`, and the
    /// `<lastmod>` of pages that have no posts.
    pub build_date: NaiveDate,

    pub latest_posts: usize,
    pub top_tags: usize,
    pub featured_per_category: usize,
    pub related_limit: usize,
    pub weights: Weights,

    /// Display-name overrides keyed by category slug.
    pub category_names: BTreeMap<String, String>,
}

impl Config {
    /// Loads the configuration for the project rooted at `dir`. When
    /// `alba.yaml` is absent, defaults are used. `site_url` (typically the
    /// `SITE_URL` environment variable) overrides the configured base URL
    /// unless it is blank.
    pub fn from_directory(
        dir: &Path,
        output_directory: Option<&Path>,
        build_date: NaiveDate,
        site_url: Option<&str>,
    ) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        let project = match path.exists() {
            true => serde_yaml::from_reader(open(&path, "project")?)
                .with_context(|| format!("Loading configuration `{}`", path.display()))?,
            false => Project::default(),
        };
        Config::from_project(project, dir, output_directory, build_date, site_url)
    }

    fn from_project(
        project: Project,
        root: &Path,
        output_directory: Option<&Path>,
        build_date: NaiveDate,
        site_url: Option<&str>,
    ) -> Result<Config> {
        // A blank override counts as unset.
        let url = site_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&project.url);
        Ok(Config {
            site: Site {
                name: project.name,
                url: base_url(url)?,
                lang: project.lang,
                author: project.author,
            },
            root_directory: root.to_owned(),
            posts_source_directory: root.join("posts"),
            templates_directory: root.join("templates"),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => root.join("dist"),
            },
            build_date,
            latest_posts: project.latest_posts,
            top_tags: project.top_tags,
            featured_per_category: project.featured_per_category,
            related_limit: project.related.limit,
            weights: project.related.weights,
            category_names: project.categories,
        })
    }

    /// The display name of a category: the configured override, or the slug
    /// with dashes turned into spaces.
    pub fn category_name(&self, slug: &str) -> String {
        match self.category_names.get(slug) {
            Some(name) => name.clone(),
            None => slug.replace('-', " "),
        }
    }
}

/// Parses a base URL, normalizing any number of trailing slashes to one.
pub fn base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(&format!("{}/", trimmed))
        .map_err(|e| anyhow!("Invalid site URL `{}`: {}", raw, e))
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 12).unwrap()
    }

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path(), None, date(), None)?;
        assert_eq!(config.site.url.as_str(), "https://buenosdia.com/");
        assert_eq!(config.output_directory, dir.path().join("dist"));
        assert_eq!(config.related_limit, 4);
        assert_eq!(config.weights, Weights::default());
        assert_eq!(config.category_name("buenos-dias"), "buenos dias");
        Ok(())
    }

    #[test]
    fn test_project_file_overrides() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "name: Otro sitio\n\
             url: https://otro.example/blog//\n\
             categories:\n  amor: Amor y vínculos\n\
             related:\n  limit: 6\n  tag_weight: 10.0\n",
        )?;
        let config = Config::from_directory(dir.path(), None, date(), None)?;
        assert_eq!(config.site.name, "Otro sitio");
        assert_eq!(config.site.url.as_str(), "https://otro.example/blog/");
        assert_eq!(config.category_name("amor"), "Amor y vínculos");
        assert_eq!(config.related_limit, 6);
        assert_eq!(config.weights.tag, 10.0);
        assert_eq!(config.weights.category, Weights::default().category);
        assert_eq!(config.latest_posts, 15);
        Ok(())
    }

    #[test]
    fn test_site_url_override() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::from_directory(
            dir.path(),
            Some(Path::new("/tmp/out")),
            date(),
            Some("http://localhost:8080"),
        )?;
        assert_eq!(config.site.url.as_str(), "http://localhost:8080/");
        assert_eq!(config.site.join("tags/amor/")?.as_str(), "http://localhost:8080/tags/amor/");
        assert_eq!(config.output_directory, PathBuf::from("/tmp/out"));
        Ok(())
    }

    #[test]
    fn test_blank_site_url_is_ignored() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(PROJECT_FILE), "url: https://example.com\n")?;
        for blank in ["", "  "] {
            let config = Config::from_directory(dir.path(), None, date(), Some(blank))?;
            assert_eq!(config.site.url.as_str(), "https://example.com/");
        }
        Ok(())
    }

    #[test]
    fn test_invalid_site_url() {
        assert!(base_url("not a url").is_err());
    }

    #[test]
    fn test_malformed_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(PROJECT_FILE), "related: [1, 2]\n")?;
        assert!(Config::from_directory(dir.path(), None, date(), None).is_err());
        Ok(())
    }
}
