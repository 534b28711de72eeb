use alba::build::{build_site, Summary};
use alba::config::Config;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn write(root: &Path, relative: &str, contents: &str) -> Result<()> {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().ok_or("no parent")?)?;
    fs::write(path, contents)?;
    Ok(())
}

fn post_html(title: &str, tags: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<title>{}</title>\n\
         <meta name=\"keywords\" content=\"{}\">\n</head>\n<body>\n<p>{}</p>\n</body>\n</html>\n",
        title, tags, body
    )
}

/// A small project: three posts in `amor`, one in `trabajo`, an empty
/// `vida` category, a stylesheet and a post asset.
fn project(root: &Path) -> Result<()> {
    write(
        root,
        "posts/amor/a/index.html",
        &post_html("Carta de la mañana", "amor, mañana", "Escribo temprano."),
    )?;
    write(
        root,
        "posts/amor/b/index.html",
        &post_html("Lo que queda", "amor, tristeza", "Después de la lluvia."),
    )?;
    write(
        root,
        "posts/amor/c/index.html",
        &post_html("Lunes otra vez", "trabajo", "La oficina abre."),
    )?;
    write(root, "posts/amor/c/foto.jpg", "jpeg")?;
    write(
        root,
        "posts/trabajo/jornada/index.html",
        &post_html("Jornada", "trabajo", "Ocho horas {{YEAR}} después."),
    )?;
    fs::create_dir_all(root.join("posts/vida"))?;
    write(root, "css/site.css", "body { margin: 0 }")?;
    write(root, "alba.yaml", "url: https://example.com\nrelated:\n  limit: 2\n")?;
    Ok(())
}

fn config(root: &Path, output: &Path) -> Result<Config> {
    let date = NaiveDate::from_ymd_opt(2024, 5, 12).ok_or("bad date")?;
    Ok(Config::from_directory(root, Some(output), date, None)?)
}

/// Every file under `dir`, keyed by relative path.
fn snapshot(dir: &Path) -> Result<BTreeMap<PathBuf, Vec<u8>>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.insert(
                entry.path().strip_prefix(dir)?.to_owned(),
                fs::read(entry.path())?,
            );
        }
    }
    Ok(files)
}

#[test]
fn test_build_site() -> Result<()> {
    let root = tempfile::tempdir()?;
    project(root.path())?;
    let out = root.path().join("dist");

    let summary = build_site(&config(root.path(), &out)?)?;
    assert_eq!(
        summary,
        Summary {
            posts: 4,
            categories: 3,
            tags: 4,
            // home, contact, 3 categories, 4 tags, 4 posts
            pages: 13,
        }
    );

    for file in [
        "index.html",
        "contacto/index.html",
        "categories/amor/index.html",
        "categories/vida/index.html",
        "tags/manana/index.html",
        "posts/amor/a/index.html",
        "posts/amor/c/foto.jpg",
        "css/site.css",
        "sitemap.xml",
        "robots.txt",
        "categories.json",
        "feed.atom",
    ] {
        assert!(out.join(file).is_file(), "missing {}", file);
    }

    // A shares a tag with B and only the category with C.
    let a = fs::read_to_string(out.join("posts/amor/a/index.html"))?;
    let b_link = a.find("https://example.com/posts/amor/b/").ok_or("no link to b")?;
    let c_link = a.find("https://example.com/posts/amor/c/").ok_or("no link to c")?;
    assert!(b_link < c_link);
    assert!(!a.contains(r#"<a href="https://example.com/posts/amor/a/">"#));

    // Values are not placeholders, but authored markers still render.
    let jornada = fs::read_to_string(out.join("posts/trabajo/jornada/index.html"))?;
    assert!(jornada.contains("Ocho horas 2024 después."));

    let vida = fs::read_to_string(out.join("categories/vida/index.html"))?;
    assert!(vida.contains("0 publicaciones"));
    assert!(!vida.contains("{{"));

    let robots = fs::read_to_string(out.join("robots.txt"))?;
    assert!(robots.ends_with("Sitemap: https://example.com/sitemap.xml\n"));
    Ok(())
}

#[test]
fn test_build_is_idempotent() -> Result<()> {
    let root = tempfile::tempdir()?;
    project(root.path())?;

    let first = root.path().join("first");
    let second = root.path().join("second");
    build_site(&config(root.path(), &first)?)?;
    build_site(&config(root.path(), &second)?)?;
    assert_eq!(snapshot(&first)?, snapshot(&second)?);

    // Rebuilding in place replaces the previous output.
    fs::write(first.join("stale.html"), "old")?;
    build_site(&config(root.path(), &first)?)?;
    assert!(!first.join("stale.html").exists());
    assert_eq!(snapshot(&first)?, snapshot(&second)?);
    Ok(())
}

#[test]
fn test_build_without_posts() -> Result<()> {
    let root = tempfile::tempdir()?;
    let out = root.path().join("dist");
    let summary = build_site(&config(root.path(), &out)?)?;
    assert_eq!(summary.posts, 0);
    assert_eq!(summary.pages, 2);

    let home = fs::read_to_string(out.join("index.html"))?;
    assert!(home.contains("Todavía no hay etiquetas."));
    let sitemap = fs::read_to_string(out.join("sitemap.xml"))?;
    assert!(sitemap.contains("<lastmod>2024-05-12</lastmod>"));
    Ok(())
}

#[test]
fn test_refuses_to_clean_project_root() -> Result<()> {
    let root = tempfile::tempdir()?;
    project(root.path())?;
    assert!(build_site(&config(root.path(), root.path())?).is_err());
    assert!(root.path().join("posts/amor/a/index.html").is_file());
    Ok(())
}

#[test]
fn test_refuses_aliases_of_project_root() -> Result<()> {
    let root = tempfile::tempdir()?;
    project(root.path())?;
    fs::create_dir_all(root.path().join("dist"))?;
    for output in [
        root.path().join("dist/.."),
        root.path().join("./dist/../."),
        root.path().join("posts/amor/.."),
        root.path().join("templates/nuevo/.."),
    ] {
        assert!(build_site(&config(root.path(), &output)?).is_err());
        assert!(root.path().join("posts/amor/a/index.html").is_file());
        assert!(root.path().join("alba.yaml").is_file());
    }
    Ok(())
}

#[test]
fn test_refuses_output_inside_posts() -> Result<()> {
    let root = tempfile::tempdir()?;
    project(root.path())?;
    let output = root.path().join("posts/amor");
    assert!(build_site(&config(root.path(), &output)?).is_err());
    assert!(root.path().join("posts/amor/c/foto.jpg").is_file());
    Ok(())
}

#[test]
fn test_builds_into_missing_nested_output() -> Result<()> {
    let root = tempfile::tempdir()?;
    project(root.path())?;
    fs::create_dir_all(root.path().join("dist"))?;
    let output = root.path().join("dist/../public/site");
    build_site(&config(root.path(), &output)?)?;
    assert!(root.path().join("public/site/index.html").is_file());
    assert!(root.path().join("posts/amor/a/index.html").is_file());
    Ok(())
}
