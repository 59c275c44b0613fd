//! Create a new post or page

use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::helpers::check_site_path;
use crate::Folio;

/// Create a new post or page dated today
pub fn create(
    folio: &Folio,
    title: &str,
    layout: Option<&str>,
    path: Option<&str>,
) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    create_on(folio, title, layout, path, today)
}

/// Create a new document; posts go to the posts directory named after
/// `new_post_name`, pages get a directory of their own
pub fn create_on(
    folio: &Folio,
    title: &str,
    layout: Option<&str>,
    path: Option<&str>,
    date: NaiveDate,
) -> Result<PathBuf> {
    let config = &folio.config;
    let layout = layout.unwrap_or(&config.default_layout);
    let slug = slug::slugify(title);
    if slug.is_empty() && path.is_none() {
        bail!("Cannot derive a file name from title {:?}", title);
    }

    let file_path = match path {
        Some(p) => {
            if let Err(reason) = check_site_path(p) {
                bail!("Invalid path {:?}: {}", p, reason);
            }
            folio.source_dir.join(format!("{}.md", p.trim_matches('/')))
        }
        None if config.is_post_layout(layout) => {
            let filename = config
                .new_post_name
                .replace(":title", &slug)
                .replace(":year", &date.format("%Y").to_string())
                .replace(":month", &date.format("%m").to_string())
                .replace(":day", &date.format("%d").to_string())
                .replace(":i_month", &date.format("%-m").to_string())
                .replace(":i_day", &date.format("%-d").to_string());
            folio.source_dir.join(&config.posts_dir).join(filename)
        }
        None => folio.source_dir.join(&slug).join("index.md"),
    };

    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = folio
        .base_dir
        .join("scaffolds")
        .join(format!("{}.md", layout));
    let content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
            .replace("{{ title }}", &yaml_string(title))
            .replace("{{ layout }}", layout)
            .replace("{{ date }}", &date.format("%Y-%m-%d").to_string())
    } else {
        default_scaffold(title, layout)
    };

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Front matter for a new document; the description is left for the author
fn default_scaffold(title: &str, layout: &str) -> String {
    format!(
        "---\nlayout: {}\ntitle: {}\ndescription: \"\"\n---\n",
        layout,
        yaml_string(title)
    )
}

/// A title as a double-quoted scalar, valid in YAML whatever it contains
fn yaml_string(value: &str) -> String {
    // JSON strings are valid YAML
    serde_json::Value::String(value.to_string()).to_string()
}
