//! Site configuration (_config.yml)

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    pub permalink: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub posts_dir: String,
    pub layout_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    pub new_post_name: String,
    pub default_layout: String,
    /// Layouts whose documents are dated posts; everything else is a page
    pub post_layouts: Vec<String>,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Listing
    pub per_page: usize,
    pub feed_limit: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            permalink: ":year/:month/:day/:title/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            posts_dir: "_posts".to_string(),
            layout_dir: "layouts".to_string(),
            exclude: Vec::new(),

            new_post_name: ":year-:month-:day-:title.md".to_string(),
            default_layout: "post".to_string(),
            post_layouts: vec!["post".to_string()],
            highlight: HighlightConfig::default(),

            per_page: 10,
            feed_limit: 20,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;

        // A config holding nothing but comments means "all defaults"
        let is_blank = content
            .lines()
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'));
        if is_blank {
            return Ok(Self::default());
        }

        let config: SiteConfig = serde_yaml::from_str(&content)
            .map_err(|e| anyhow!("Invalid config {:?}: {}", path.as_ref(), e))?;
        config.check()?;
        Ok(config)
    }

    /// Reject values the build cannot work with
    fn check(&self) -> Result<()> {
        if self.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }
        if !self.root.starts_with('/') {
            anyhow::bail!("root must start with '/', got {:?}", self.root);
        }
        self.tz()?;
        Ok(())
    }

    /// Whether a layout marks its documents as dated posts
    pub fn is_post_layout(&self, layout: &str) -> bool {
        self.post_layouts.iter().any(|l| l == layout)
    }

    /// Resolve the configured timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        let name = if self.timezone.trim().is_empty() {
            "UTC"
        } else {
            self.timezone.trim()
        };
        name.parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow!("Unknown timezone {:?}: {}", name, e))
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.posts_dir, "_posts");
        assert_eq!(config.per_page, 10);
        assert!(config.is_post_layout("post"));
        assert!(!config.is_post_layout("about"));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
per_page: 5
post_layouts: [post, note]
highlight:
  line_number: false
github_username: someone
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.per_page, 5);
        assert!(config.is_post_layout("note"));
        assert!(!config.highlight.line_number);
        assert!(config.highlight.enable);
        assert!(config.extra.contains_key("github_username"));
    }

    #[test]
    fn test_load_rejects_bad_timezone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "timezone: Mars/Olympus\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());

        fs::write(&path, "timezone: Europe/Berlin\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_load_blank_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "# nothing yet\n\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "Folio");
    }

    #[test]
    fn test_load_rejects_zero_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "per_page: 0\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }
}
