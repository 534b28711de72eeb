//! Placeholder templates. A template is plain HTML with `{{NAME}}` markers;
//! [`render`] substitutes every marker in a single pass. Known names take
//! their value from [`Fields`] (or `""` when unset), unknown names are
//! removed, and substituted values are never scanned again, so a post body
//! that happens to contain `{{TITLE}}` is left alone.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("placeholder pattern"));
static BODY_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</body\s*>").expect("body pattern"));

/// The names a template may refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    Lang,
    Title,
    Description,
    Keywords,
    Canonical,
    CategoriesPills,

    /// Older templates call the pill bar by this name. Renders the same
    /// value as [`Placeholder::CategoriesPills`] unless set explicitly.
    CategoriesBar,

    H1,
    CategorySeoDescription,
    LatestPosts,
    TopTags,
    PostList,
    FeaturedPosts,
    RelatedPosts,
    Year,
}

impl Placeholder {
    pub const ALL: [Placeholder; 15] = [
        Placeholder::Lang,
        Placeholder::Title,
        Placeholder::Description,
        Placeholder::Keywords,
        Placeholder::Canonical,
        Placeholder::CategoriesPills,
        Placeholder::CategoriesBar,
        Placeholder::H1,
        Placeholder::CategorySeoDescription,
        Placeholder::LatestPosts,
        Placeholder::TopTags,
        Placeholder::PostList,
        Placeholder::FeaturedPosts,
        Placeholder::RelatedPosts,
        Placeholder::Year,
    ];

    /// The name as written between the braces.
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Lang => "LANG",
            Placeholder::Title => "TITLE",
            Placeholder::Description => "DESCRIPTION",
            Placeholder::Keywords => "KEYWORDS",
            Placeholder::Canonical => "CANONICAL",
            Placeholder::CategoriesPills => "CATEGORIES_PILLS",
            Placeholder::CategoriesBar => "CATEGORIES_BAR",
            Placeholder::H1 => "H1",
            Placeholder::CategorySeoDescription => "CATEGORY_SEO_DESCRIPTION",
            Placeholder::LatestPosts => "LATEST_POSTS",
            Placeholder::TopTags => "TOP_TAGS",
            Placeholder::PostList => "POST_LIST",
            Placeholder::FeaturedPosts => "FEATURED_POSTS",
            Placeholder::RelatedPosts => "RELATED_POSTS",
            Placeholder::Year => "YEAR",
        }
    }

    pub fn from_name(name: &str) -> Option<Placeholder> {
        Placeholder::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// The marker text, e.g. `{{TITLE}}`.
    pub fn marker(self) -> String {
        format!("{{{{{}}}}}", self.name())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values for one rendering. Values are inserted as-is: callers escape text
/// and build HTML fragments before setting them.
#[derive(Clone, Debug, Default)]
pub struct Fields {
    values: BTreeMap<Placeholder, String>,
}

impl Fields {
    pub fn new() -> Fields {
        Fields::default()
    }

    pub fn set(&mut self, placeholder: Placeholder, value: impl Into<String>) -> &mut Fields {
        self.values.insert(placeholder, value.into());
        self
    }

    /// Builder-style [`Fields::set`].
    pub fn with(mut self, placeholder: Placeholder, value: impl Into<String>) -> Fields {
        self.set(placeholder, value);
        self
    }

    /// The value rendered for `placeholder`, honoring the
    /// `CATEGORIES_BAR` alias.
    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        match (self.values.get(&placeholder), placeholder) {
            (Some(value), _) => Some(value),
            (None, Placeholder::CategoriesBar) => self.get(Placeholder::CategoriesPills),
            (None, _) => None,
        }
    }
}

/// Substitutes every `{{NAME}}` marker in `template`.
pub fn render(template: &str, fields: &Fields) -> String {
    MARKER
        .replace_all(template, |c: &Captures| {
            Placeholder::from_name(&c[1])
                .and_then(|p| fields.get(p))
                .unwrap_or_default()
                .to_owned()
        })
        .into_owned()
}

/// Renders an authored post page. When the page has no `{{RELATED_POSTS}}`
/// marker, one is placed before the last `</body>` (or at the very end when
/// there is no `</body>`) so the related block always appears exactly once.
pub fn render_post(html: &str, fields: &Fields) -> String {
    let marker = Placeholder::RelatedPosts.marker();
    if html.contains(&marker) {
        return render(html, fields);
    }
    let mut page = String::with_capacity(html.len() + marker.len() + 1);
    match BODY_CLOSE.find_iter(html).last() {
        Some(m) => {
            page.push_str(&html[..m.start()]);
            page.push_str(&marker);
            page.push('\n');
            page.push_str(&html[m.start()..]);
        }
        None => {
            page.push_str(html);
            page.push('\n');
            page.push_str(&marker);
        }
    }
    render(&page, fields)
}

/// The page templates for one build.
#[derive(Clone, Debug)]
pub struct Templates {
    pub index: String,
    pub category: String,
    pub tag: String,
    pub contact: String,
}

const DEFAULT_INDEX: &str = include_str!("../theme/index.template.html");
const DEFAULT_CATEGORY: &str = include_str!("../theme/category.template.html");
const DEFAULT_TAG: &str = include_str!("../theme/tag.template.html");
const DEFAULT_CONTACT: &str = include_str!("../theme/contact.template.html");

impl Default for Templates {
    /// The built-in theme.
    fn default() -> Templates {
        Templates {
            index: DEFAULT_INDEX.to_owned(),
            category: DEFAULT_CATEGORY.to_owned(),
            tag: DEFAULT_TAG.to_owned(),
            contact: DEFAULT_CONTACT.to_owned(),
        }
    }
}

impl Templates {
    /// Loads `{name}.template.html` for each page kind from `dir`. A missing
    /// file (or a missing `dir`) falls back to the built-in template; a file
    /// that exists but cannot be read is an error.
    pub fn load(dir: &Path) -> Result<Templates> {
        Ok(Templates {
            index: load_template(dir, "index", DEFAULT_INDEX)?,
            category: load_template(dir, "category", DEFAULT_CATEGORY)?,
            tag: load_template(dir, "tag", DEFAULT_TAG)?,
            contact: load_template(dir, "contact", DEFAULT_CONTACT)?,
        })
    }
}

fn load_template(dir: &Path, name: &str, default: &str) -> Result<String> {
    let path = dir.join(format!("{}.template.html", name));
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(template = name, "using built-in template");
            Ok(default.to_owned())
        }
        Err(err) => Err(Error::OpenTemplateFile { path, err }),
    }
}

/// The result of loading templates.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading templates.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file exists but cannot be read.
    OpenTemplateFile { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for p in Placeholder::ALL {
            assert_eq!(Placeholder::from_name(p.name()), Some(p));
        }
        assert_eq!(Placeholder::from_name("title"), None);
        assert_eq!(Placeholder::Year.marker(), "{{YEAR}}");
    }

    #[test]
    fn test_render_substitutes_and_blanks() {
        let fields = Fields::new()
            .with(Placeholder::Title, "Hola")
            .with(Placeholder::Year, "2024");
        assert_eq!(
            render("<t>{{TITLE}}</t>{{TITLE}} {{YEAR}}{{H1}}{{NOPE}}{{lower}}", &fields),
            "<t>Hola</t>Hola 2024{{lower}}"
        );
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let fields = Fields::new()
            .with(Placeholder::Title, "{{YEAR}}")
            .with(Placeholder::Year, "2024");
        assert_eq!(render("{{TITLE}}/{{YEAR}}", &fields), "{{YEAR}}/2024");
    }

    #[test]
    fn test_categories_bar_alias() {
        let fields = Fields::new().with(Placeholder::CategoriesPills, "pills");
        assert_eq!(render("{{CATEGORIES_BAR}}|{{CATEGORIES_PILLS}}", &fields), "pills|pills");
        let fields = fields.with(Placeholder::CategoriesBar, "bar");
        assert_eq!(render("{{CATEGORIES_BAR}}|{{CATEGORIES_PILLS}}", &fields), "bar|pills");
    }

    #[test]
    fn test_render_post_injects_related_block() {
        let fields = Fields::new().with(Placeholder::RelatedPosts, "<aside>R</aside>");
        assert_eq!(
            render_post("<body><p>x</p></BODY></html>", &fields),
            "<body><p>x</p><aside>R</aside>\n</BODY></html>"
        );
        assert_eq!(render_post("<p>x</p>", &fields), "<p>x</p>\n<aside>R</aside>");
        assert_eq!(
            render_post("<body>{{RELATED_POSTS}}<p>x</p></body>", &fields),
            "<body><aside>R</aside><p>x</p></body>"
        );
    }

    #[test]
    fn test_load_falls_back_to_defaults() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("tag.template.html"), "<h1>{{H1}}</h1>")?;
        let templates = Templates::load(dir.path())?;
        assert_eq!(templates.tag, "<h1>{{H1}}</h1>");
        assert_eq!(templates.index, DEFAULT_INDEX);
        assert!(templates.category.contains("{{FEATURED_POSTS}}"));

        let missing = Templates::load(&dir.path().join("nope"))?;
        assert_eq!(missing.contact, DEFAULT_CONTACT);
        Ok(())
    }

    #[test]
    fn test_load_rejects_unreadable_template(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // A directory where a file is expected cannot be read as one.
        std::fs::create_dir(dir.path().join("index.template.html"))?;
        assert!(Templates::load(dir.path()).is_err());
        Ok(())
    }
}
