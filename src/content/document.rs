//! Document model

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

lazy_static! {
    /// `2016-03-08-azure-event-hub` -> date + slug
    static ref DATED_NAME: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)$").unwrap();
}

/// How a document is listed and routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Dated entry in the chronological listing
    Post,
    /// Standalone page, optionally shown in the menu
    Page,
}

/// A blog post or standalone page
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Source path relative to the source directory, `/`-separated
    pub id: String,

    /// Full source file path
    pub full_source: PathBuf,

    pub kind: DocumentKind,

    /// Layout template to use
    pub layout: String,

    pub title: String,

    /// Short summary used for previews
    pub description: String,

    /// Legacy paths that forward to this document, as written by the author
    pub redirect_from: Vec<String>,

    pub hide_description: bool,

    pub image: Option<String>,

    pub menu: bool,

    pub order: Option<i64>,

    /// Derived from the `YYYY-MM-DD-` filename prefix
    pub publish_date: Option<NaiveDate>,

    pub published: bool,

    /// URL-friendly name (filename without date prefix and extension)
    pub slug: String,

    /// Canonical URL path, including the site root
    pub path: String,

    /// Raw markdown body
    pub body: String,

    /// Custom front-matter fields
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Document {
    /// Create a document with empty metadata; the loader fills in the rest
    pub fn new(id: impl Into<String>, kind: DocumentKind) -> Self {
        let id = id.into();
        let (publish_date, slug) = split_dated_name(file_stem(&id));
        Self {
            full_source: PathBuf::from(&id),
            id,
            kind,
            layout: String::new(),
            title: String::new(),
            description: String::new(),
            redirect_from: Vec::new(),
            hide_description: false,
            image: None,
            menu: false,
            order: None,
            publish_date,
            published: true,
            slug,
            path: String::new(),
            body: String::new(),
            extra: HashMap::new(),
        }
    }

    pub fn is_post(&self) -> bool {
        self.kind == DocumentKind::Post
    }

    /// A page that appears in the site menu
    pub fn is_menu_page(&self) -> bool {
        self.kind == DocumentKind::Page && self.menu
    }

    /// Redirect paths in normalized form, in declaration order
    pub fn redirect_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.redirect_from
            .iter()
            .map(|p| crate::helpers::normalize_path(p))
    }

    /// Get the previous (newer) document in a listing
    pub fn prev<'a>(&self, docs: &[&'a Document]) -> Option<&'a Document> {
        let pos = docs.iter().position(|d| d.id == self.id)?;
        if pos > 0 {
            Some(docs[pos - 1])
        } else {
            None
        }
    }

    /// Get the next (older) document in a listing
    pub fn next<'a>(&self, docs: &[&'a Document]) -> Option<&'a Document> {
        let pos = docs.iter().position(|d| d.id == self.id)?;
        docs.get(pos + 1).copied()
    }
}

/// File name without directories and extension
fn file_stem(id: &str) -> &str {
    let name = id.rsplit('/').next().unwrap_or(id);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// Split `YYYY-MM-DD-slug` into its date and slug; undated names keep the
/// whole stem as slug. An impossible date such as `2015-02-30` is undated.
pub fn split_dated_name(stem: &str) -> (Option<NaiveDate>, String) {
    if let Some(caps) = DATED_NAME.captures(stem) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().unwrap_or(0),
            caps[2].parse().unwrap_or(0),
            caps[3].parse().unwrap_or(0),
        );
        if let Some(date) = date {
            return (Some(date), caps[4].to_string());
        }
    }
    (None, stem.to_string())
}
