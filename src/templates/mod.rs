//! Layout templates using the Tera template engine
//!
//! The built-in layouts are embedded in the binary. A site may add layouts,
//! or replace built-in ones, by placing `<name>.html` files in its layout
//! directory.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::content::Layouts;
use crate::helpers::{full_date, html_escape};

/// Layouts shipped with the binary
pub const BUILTIN_LAYOUTS: [&str; 3] = ["post", "page", "about"];

/// Templates the generator uses directly; never valid as a document layout
const STRUCTURAL_TEMPLATES: [&str; 3] = ["base", "index", "redirect"];

/// Template renderer with embedded default layouts
pub struct TemplateRenderer {
    tera: Tera,
    layouts: BTreeSet<String>,
}

impl TemplateRenderer {
    /// Create a renderer with only the built-in templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Output is HTML we build ourselves; paths must not be entity-encoded.
        // Text fields go through the `html` filter instead.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("base.html", include_str!("builtin/base.html")),
            ("index.html", include_str!("builtin/index.html")),
            ("post.html", include_str!("builtin/post.html")),
            ("page.html", include_str!("builtin/page.html")),
            ("about.html", include_str!("builtin/about.html")),
            ("redirect.html", include_str!("builtin/redirect.html")),
        ])?;

        tera.register_filter("html", html_filter);
        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            layouts: BUILTIN_LAYOUTS.iter().map(|l| l.to_string()).collect(),
        })
    }

    /// Create a renderer with the built-ins plus any `*.html` in `layout_dir`
    pub fn load<P: AsRef<Path>>(layout_dir: P) -> Result<Self> {
        let mut renderer = Self::new()?;
        let layout_dir = layout_dir.as_ref();
        if !layout_dir.is_dir() {
            return Ok(renderer);
        }

        let mut files: Vec<_> = fs::read_dir(layout_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().map(|e| e == "html").unwrap_or(false))
            .collect();
        files.sort();

        for path in files {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let name = format!("{}.html", stem);
            renderer
                .tera
                .add_template_file(&path, Some(&name))
                .map_err(|e| anyhow!("Failed to load layout {:?}: {}", path, describe(&e)))?;
            if !STRUCTURAL_TEMPLATES.contains(&stem) {
                renderer.layouts.insert(stem.to_string());
            }
            tracing::debug!("Loaded layout {} from {:?}", name, path);
        }

        Ok(renderer)
    }

    /// Layout names documents may declare
    pub fn layouts(&self) -> Layouts {
        Layouts::new(self.layouts.iter().cloned())
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template_name, context)
            .map_err(|e| anyhow!("Failed to render {}: {}", template_name, describe(&e)))
    }
}

/// Tera hides the useful part of an error in its source chain
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = std::error::Error::source(inner);
    }
    message
}

/// Tera filter: escape text for HTML, leaving `/` alone
fn html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("html", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => " ...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a `YYYY-MM-DD` date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    // "LL" is the long form, e.g. "March 08, 2016"
    if format == "LL" {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            return Ok(tera::Value::String(full_date(date)));
        }
    }

    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub title: String,
    pub path: String,
}

/// A document as seen by a layout
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub id: String,
    pub layout: String,
    pub title: String,
    pub description: String,
    pub hide_description: bool,
    pub image: Option<String>,
    /// `YYYY-MM-DD`, posts only
    pub date: Option<String>,
    pub path: String,
    pub permalink: String,
    /// Rendered HTML body (empty in listings)
    pub content: String,
    pub extra: HashMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub current_url: String,
    pub prev_link: String,
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedirectData {
    /// Legacy path being served
    pub from: String,
    /// Canonical path of the target
    pub to: String,
    /// Absolute URL of the target
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "Notes & Posts".to_string(),
            subtitle: String::new(),
            description: "A blog".to_string(),
            author: "Me".to_string(),
            language: "en".to_string(),
            url: "https://example.com".to_string(),
            root: "/".to_string(),
        }
    }

    #[test]
    fn test_builtin_layouts() {
        let renderer = TemplateRenderer::new().unwrap();
        let layouts = renderer.layouts();
        assert!(layouts.contains("post"));
        assert!(layouts.contains("about"));
        assert!(!layouts.contains("base"));
        assert!(!layouts.contains("redirect"));
    }

    #[test]
    fn test_render_redirect() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert(
            "redirect",
            &RedirectData {
                from: "/post/old".to_string(),
                to: "/2016/03/08/new/".to_string(),
                url: "https://example.com/2016/03/08/new/".to_string(),
            },
        );
        let html = renderer.render("redirect.html", &context).unwrap();
        assert!(html.contains(
            r#"<meta http-equiv="refresh" content="0; url=https://example.com/2016/03/08/new/">"#
        ));
        assert!(html.contains(r#"<link rel="canonical" href="https://example.com/2016/03/08/new/">"#));
    }

    #[test]
    fn test_title_is_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("menu", &Vec::<MenuItem>::new());
        context.insert("current_path", "/");
        context.insert("posts", &Vec::<PageData>::new());
        context.insert(
            "pagination",
            &PaginationData {
                per_page: 10,
                total: 1,
                current: 1,
                current_url: "/".to_string(),
                prev_link: String::new(),
                next_link: String::new(),
            },
        );
        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains("<title>Notes &amp; Posts</title>"));
        assert!(!html.contains("pager"));
    }

    #[test]
    fn test_user_layouts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("talk.html"),
            r#"{% extends "base.html" %}{% block content %}TALK {{ page.title }}{% endblock content %}"#,
        )
        .unwrap();
        fs::write(dir.path().join("base.html"), "CUSTOM BASE {% block content %}{% endblock content %}").unwrap();

        let renderer = TemplateRenderer::load(dir.path()).unwrap();
        let layouts = renderer.layouts();
        assert!(layouts.contains("talk"));
        assert!(layouts.contains("post"));
        assert!(!layouts.contains("base"));

        let mut context = Context::new();
        let mut page = HashMap::new();
        page.insert("title", "Rust");
        context.insert("page", &page);
        let html = renderer.render("talk.html", &context).unwrap();
        assert_eq!(html, "CUSTOM BASE TALK Rust");
    }

    #[test]
    fn test_missing_layout_dir_is_fine() {
        let renderer = TemplateRenderer::load("/definitely/not/here").unwrap();
        assert_eq!(renderer.layouts().iter().count(), BUILTIN_LAYOUTS.len());
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let out = truncate_chars_filter(&tera::Value::from("Hello world"), &args).unwrap();
        assert_eq!(out, tera::Value::from("Hello ..."));
    }

    #[test]
    fn test_date_format_filter() {
        let mut args = HashMap::new();
        args.insert("format".to_string(), tera::Value::from("LL"));
        let out = date_format_filter(&tera::Value::from("2016-03-08"), &args).unwrap();
        assert_eq!(out, tera::Value::from("March 08, 2016"));
    }
}
