//! Initialize a new site

use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: Folio
subtitle: ''
description: ''
author: John Doe
language: en
timezone: UTC

# URL
url: http://example.com
root: /
permalink: ':year/:month/:day/:title/'

# Directory
source_dir: source
public_dir: public
posts_dir: _posts
layout_dir: layouts
exclude: []

# Writing
new_post_name: ':year-:month-:day-:title.md'
default_layout: post
post_layouts: [post]
highlight:
  enable: true
  line_number: true
  theme: base16-ocean.dark

# Listing
per_page: 10
feed_limit: 20
"#;

const POST_SCAFFOLD: &str = r#"---
layout: {{ layout }}
title: {{ title }}
description: ""
redirect_from: []
---
"#;

const PAGE_SCAFFOLD: &str = r#"---
layout: {{ layout }}
title: {{ title }}
description: ""
menu: false
---
"#;

const ABOUT_PAGE: &str = r#"---
layout: about
title: About
description: Who writes this blog
menu: true
order: 1
---

Tell your readers who you are.
"#;

const SAMPLE_POST: &str = r#"---
layout: post
title: Hello World
description: The first post on this blog
redirect_from: /hello-world
---

Welcome! This post lives at its dated path, and the old `/hello-world`
address forwards to it.

```bash
$ folio new "My New Post"
$ folio generate
$ folio server
```
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    init_site_on(target_dir, chrono::Local::now().date_naive())
}

fn init_site_on(target_dir: &Path, today: NaiveDate) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("A site already exists in {:?}", target_dir);
    }

    fs::create_dir_all(target_dir.join("source/_posts"))?;
    fs::create_dir_all(target_dir.join("layouts"))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("scaffolds/post.md"), POST_SCAFFOLD)?;
    fs::write(target_dir.join("scaffolds/page.md"), PAGE_SCAFFOLD)?;
    fs::write(target_dir.join("source/about.md"), ABOUT_PAGE)?;

    let post_name = format!("{}-hello-world.md", today.format("%Y-%m-%d"));
    fs::write(target_dir.join("source/_posts").join(post_name), SAMPLE_POST)?;

    tracing::debug!("Scaffolded site in {:?}", target_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::Folio;

    #[test]
    fn test_default_config_matches_defaults() {
        let config: SiteConfig = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.title, defaults.title);
        assert_eq!(config.permalink, defaults.permalink);
        assert_eq!(config.new_post_name, defaults.new_post_name);
        assert_eq!(config.per_page, defaults.per_page);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_init_site_builds() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        init_site_on(dir.path(), today).unwrap();

        assert!(dir.path().join("source/_posts/2024-01-15-hello-world.md").exists());
        assert!(dir.path().join("layouts").is_dir());

        let folio = Folio::new(dir.path()).unwrap();
        let store = folio.load_store().unwrap();
        assert_eq!(store.list_posts().len(), 1);
        assert_eq!(store.list_menu_pages().len(), 1);
        assert_eq!(store.redirects()[0].from, "/hello-world");
    }

    #[test]
    fn test_new_post_from_init_scaffold_with_quoted_title() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        init_site_on(dir.path(), today).unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        let path = crate::commands::new::create_on(
            &folio,
            "Say \"hi\": now",
            None,
            None,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let (fm, _) = crate::content::FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Say \"hi\": now"));
        assert!(fm.redirect_from.is_empty());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "title: Mine\n").unwrap();
        assert!(init_site(dir.path()).is_err());
        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(),
            "title: Mine\n"
        );
    }
}
