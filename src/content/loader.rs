//! Content loader - loads posts and pages from the source directory

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{
    ContentError, ContentStore, Document, DocumentKind, FrontMatter, Layouts, ValidationErrors,
};
use crate::config::SiteConfig;
use crate::helpers::url_for;
use crate::Folio;

/// A non-markdown file copied to the output as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// URL path the file is served at
    pub path: String,
    pub full_source: PathBuf,
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    exclude: Vec<Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Result<Self> {
        let exclude = folio
            .config
            .exclude
            .iter()
            .map(|p| Pattern::new(p).map_err(|e| anyhow!("Invalid exclude pattern {:?}: {}", p, e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { folio, exclude })
    }

    /// Load every document and validate the corpus against `layouts`
    ///
    /// Either the whole store is valid or every problem found is returned;
    /// there is no partially loaded store.
    pub fn load(&self, layouts: Layouts) -> Result<ContentStore, ValidationErrors> {
        let mut documents = Vec::new();
        let mut errors = Vec::new();

        for entry in self.source_files() {
            let (path, id) = entry?;
            if !is_markdown_file(&path) {
                continue;
            }
            match self.load_document(&path, &id) {
                Ok(doc) => documents.push(doc),
                Err(e @ ContentError::Io { .. }) => return Err(e.into()),
                Err(e) => errors.push(e),
            }
        }

        tracing::debug!("Parsed {} documents", documents.len());

        let store = ContentStore::new(documents, layouts);
        if let Err(ValidationErrors(found)) = store.validate_all() {
            errors.extend(found);
        }

        if errors.is_empty() {
            Ok(store)
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Non-markdown files outside `_` directories
    pub fn load_assets(&self) -> Result<Vec<Asset>, ContentError> {
        let mut assets = Vec::new();
        for entry in self.source_files() {
            let (path, id) = entry?;
            if is_markdown_file(&path) || id.split('/').any(|c| c.starts_with('_')) {
                continue;
            }
            assets.push(Asset {
                path: url_for(&self.folio.config, &id),
                full_source: path,
            });
        }
        Ok(assets)
    }

    /// Files under the source directory, sorted, as (full path, id) pairs
    ///
    /// Hidden entries, excluded paths and `_` directories other than the
    /// posts directory are skipped.
    fn source_files(&self) -> impl Iterator<Item = Result<(PathBuf, String), ContentError>> + '_ {
        let source_dir = &self.folio.source_dir;
        let posts_dir = self.folio.config.posts_dir.as_str();

        WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                if name.starts_with('.') {
                    return false;
                }
                if e.file_type().is_dir() && name.starts_with('_') {
                    return e.depth() == 1 && name == posts_dir;
                }
                !self.is_excluded(e)
            })
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let id = document_id(source_dir, entry.path());
                    Some(Ok((entry.into_path(), id)))
                }
                Ok(_) => None,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    Some(Err(ContentError::Io {
                        path,
                        source: e.into(),
                    }))
                }
            })
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let id = document_id(&self.folio.source_dir, entry.path());
        self.exclude.iter().any(|p| p.matches(&id))
    }

    /// Load a single document from a file
    fn load_document(&self, path: &Path, id: &str) -> Result<Document, ContentError> {
        let content = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (fm, body) =
            FrontMatter::parse(&content).map_err(|e| ContentError::schema(id, e.to_string()))?;

        let config = &self.folio.config;
        let layout = fm.layout.unwrap_or_default();
        let kind = if config.is_post_layout(&layout) {
            DocumentKind::Post
        } else {
            DocumentKind::Page
        };

        let mut doc = Document::new(id, kind);
        doc.full_source = path.to_path_buf();
        doc.layout = layout;
        doc.title = fm.title.unwrap_or_default();
        doc.description = fm.description.unwrap_or_default();
        // Legacy paths are site-relative, like every other path. Anything
        // else is kept as written for validation to reject.
        doc.redirect_from = fm
            .redirect_from
            .iter()
            .map(|p| site_path(config, p))
            .collect();
        doc.hide_description = fm.hide_description;
        doc.image = fm.image;
        doc.menu = fm.menu;
        doc.order = fm.order;
        doc.published = fm.published;
        doc.body = body.to_string();
        doc.extra = fm.extra;

        doc.path = match (&fm.permalink, kind, doc.publish_date) {
            (Some(permalink), _, _) => site_path(config, permalink),
            (None, DocumentKind::Post, Some(date)) => self.post_permalink(date, &doc.slug),
            _ => url_for(config, &page_path(id)),
        };

        tracing::debug!("Loaded {} -> {}", doc.id, doc.path);
        Ok(doc)
    }

    /// Generate a post permalink based on the config pattern
    fn post_permalink(&self, date: NaiveDate, slug: &str) -> String {
        let result = self
            .folio
            .config
            .permalink
            .replace(":year", &date.format("%Y").to_string())
            .replace(":month", &date.format("%m").to_string())
            .replace(":day", &date.format("%d").to_string())
            .replace(":i_month", &date.format("%-m").to_string())
            .replace(":i_day", &date.format("%-d").to_string())
            .replace(":title", slug)
            .replace(":slug", slug);

        url_for(&self.folio.config, &result)
    }
}

/// A front-matter path under the site root; blanks and absolute URLs are
/// left as they are
fn site_path(config: &SiteConfig, path: &str) -> String {
    match path.trim() {
        "" => String::new(),
        p if p.contains("://") => p.to_string(),
        p => url_for(config, p),
    }
}

/// `/`-separated path of a file relative to the source directory
fn document_id(source_dir: &Path, path: &Path) -> String {
    path.strip_prefix(source_dir)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Page path from its id; `index` files take their directory's path
fn page_path(id: &str) -> String {
    let without_ext = id
        .strip_suffix(".markdown")
        .or_else(|| id.strip_suffix(".md"))
        .unwrap_or(id);

    if without_ext == "index" {
        String::new()
    } else if let Some(dir) = without_ext.strip_suffix("/index") {
        format!("{}/", dir)
    } else {
        format!("{}/", without_ext)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
