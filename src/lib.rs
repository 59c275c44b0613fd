//! folio: a blog content store and static site generator
//!
//! Posts and pages are Markdown files with front matter. The whole corpus is
//! loaded and validated as one snapshot, rendered into memory with Tera
//! layouts, and only then written to the output directory. Legacy URLs listed
//! in `redirect_from` are published as redirect pages to the canonical path.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// A site on disk
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// User layouts
    pub layout_dir: PathBuf,
}

impl Folio {
    /// Open the site in `base_dir`; a missing config means all defaults
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let layout_dir = base_dir.join(&config.layout_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
            layout_dir,
        })
    }

    /// Path of the configuration file
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Built-in layouts plus the site's own
    pub fn templates(&self) -> Result<templates::TemplateRenderer> {
        templates::TemplateRenderer::load(&self.layout_dir)
    }

    /// Load and validate the content store against the site's layouts
    pub fn load_store(&self) -> Result<content::ContentStore> {
        let templates = self.templates()?;
        let store = content::ContentLoader::new(self)?.load(templates.layouts())?;
        Ok(store)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self).map(|_| ())
    }

    /// Validate the content without writing anything
    pub fn check(&self) -> Result<()> {
        commands::check::run(self).map(|_| ())
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
