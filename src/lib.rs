//! The library code for the `alba` static site generator. A build reads a
//! tree of hand-authored HTML posts and writes a static site around them.
//! The architecture breaks down into three steps:
//!
//! 1. Scanning posts from source files on disk ([`crate::parser`])
//! 2. Indexing and analyzing the corpus ([`crate::index`])
//! 3. Rendering and writing the output files ([`crate::write`])
//!
//! The analysis step is where the interesting work happens. Every post is
//! tokenized ([`crate::text`]), category pages get keyword-driven
//! descriptions from a small TF-IDF scorer ([`crate::keywords`],
//! [`crate::seo`]), every post page gets a related-posts block
//! ([`crate::related`]), and each category features a handful of posts in an
//! order that rotates monthly but never between two builds of the same month
//! ([`crate::shuffle`]).
//!
//! Builds are deterministic: the same sources, configuration and build date
//! always produce byte-identical output.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod fragment;
pub mod html;
pub mod index;
pub mod keywords;
pub mod parser;
pub mod post;
pub mod related;
pub mod seo;
pub mod shuffle;
pub mod sitemap;
pub mod tag;
pub mod template;
pub mod text;
pub mod write;
