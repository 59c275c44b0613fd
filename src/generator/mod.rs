//! Generator module - renders the content store into a site map and writes it
//!
//! Rendering happens entirely in memory. The output directory is only
//! touched once every page, redirect and asset has been produced, so a
//! failing build never leaves a half-written site behind.

use anyhow::{anyhow, bail, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Component, Path};

use tera::Context;

use crate::content::loader::Asset;
use crate::content::{ContentStore, Document, Layouts, MarkdownRenderer};
use crate::helpers::{
    absolutize_urls, date_xml, escape_xml, full_url_for, output_file, start_of_day,
    strip_invalid_xml_chars, url_for,
};
use crate::templates::{
    MenuItem, NavPost, PageData, PaginationData, RedirectData, SiteData, TemplateRenderer,
};
use crate::Folio;

/// Number of recent posts shown on `about` pages
const ABOUT_RECENT_POSTS: usize = 5;

/// Rendered output: URL path -> bytes
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SiteMap {
    routes: BTreeMap<String, Vec<u8>>,
    /// Output file -> URL path that claimed it
    files: HashMap<String, String>,
}

impl SiteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output; two paths served by the same file are a collision
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let path = path.into();
        let file = output_file(&path);
        if let Some(existing) = self.files.get(&file) {
            bail!(
                "Route collision: {} and {} both render to {}",
                existing,
                path,
                file
            );
        }
        self.files.insert(file, path.clone());
        self.routes.insert(path, bytes);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.routes.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.routes.iter().map(|(p, b)| (p.as_str(), b.as_slice()))
    }
}

/// Static site generator using Tera templates
pub struct Generator<'a> {
    folio: &'a Folio,
    templates: &'a TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(folio: &'a Folio, templates: &'a TemplateRenderer) -> Result<Self> {
        let markdown = MarkdownRenderer::with_options(&folio.config.highlight)?;
        Ok(Self {
            folio,
            templates,
            markdown,
        })
    }

    /// Layout names the templates can render
    pub fn layouts(&self) -> Layouts {
        self.templates.layouts()
    }

    /// Render the entire site into memory
    pub fn render(&self, store: &ContentStore, assets: &[Asset]) -> Result<SiteMap> {
        store.validate_all()?;

        let documents = store.list_documents();
        let posts = store.list_posts();
        let site_data = self.build_site_data();
        let menu = self.build_menu(store);

        let mut site = SiteMap::new();

        for doc in &documents {
            let html = self.render_document(doc, &posts, &site_data, &menu)?;
            site.insert(doc.path.clone(), html.into_bytes())?;
            tracing::debug!("Rendered {} -> {}", doc.id, doc.path);
        }

        self.render_index_pages(&mut site, &posts, &site_data, &menu)?;
        self.render_redirects(&mut site, store, &site_data)?;
        self.render_atom_feed(&mut site, &posts)?;

        for asset in assets {
            let bytes = fs::read(&asset.full_source)
                .map_err(|e| anyhow!("Failed to read asset {:?}: {}", asset.full_source, e))?;
            site.insert(asset.path.clone(), bytes)?;
        }

        tracing::info!(
            "Rendered {} documents, {} redirects, {} assets",
            documents.len(),
            store.redirects().len(),
            assets.len()
        );

        Ok(site)
    }

    /// Replace the output directory with the contents of `site`
    ///
    /// Every output file must land inside the output directory; if one
    /// would not, nothing is touched.
    pub fn write(&self, site: &SiteMap) -> Result<()> {
        let public_dir = &self.folio.public_dir;

        let mut outputs = Vec::with_capacity(site.len());
        for (path, bytes) in site.iter() {
            let file = output_file(&self.relative_to_root(path));
            let contained = Path::new(&file)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
            if !contained {
                bail!("Refusing to write {} outside {:?}", path, public_dir);
            }
            outputs.push((public_dir.join(file), bytes));
        }

        if public_dir.exists() {
            fs::remove_dir_all(public_dir)
                .map_err(|e| anyhow!("Failed to clear {:?}: {}", public_dir, e))?;
        }
        fs::create_dir_all(public_dir)?;

        for (output_path, bytes) in outputs {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create dir {:?}: {}", parent, e))?;
            }
            fs::write(&output_path, bytes)
                .map_err(|e| anyhow!("Failed to write {:?}: {}", output_path, e))?;
            tracing::debug!("Wrote {:?}", output_path);
        }

        Ok(())
    }

    /// Output paths are relative to the site root, not the domain root
    fn relative_to_root(&self, path: &str) -> String {
        let root = url_for(&self.folio.config, "");
        match path.strip_prefix(root.as_str()) {
            Some(rest) => format!("/{}", rest),
            None => path.to_string(),
        }
    }

    fn build_site_data(&self) -> SiteData {
        let config = &self.folio.config;
        SiteData {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: url_for(config, ""),
        }
    }

    fn build_menu(&self, store: &ContentStore) -> Vec<MenuItem> {
        store
            .list_menu_pages()
            .into_iter()
            .map(|d| MenuItem {
                title: d.title.clone(),
                path: d.path.clone(),
            })
            .collect()
    }

    fn page_data(&self, doc: &Document, content: String) -> PageData {
        PageData {
            id: doc.id.clone(),
            layout: doc.layout.clone(),
            title: doc.title.clone(),
            description: doc.description.clone(),
            hide_description: doc.hide_description,
            image: doc.image.clone(),
            date: doc.publish_date.map(|d| d.format("%Y-%m-%d").to_string()),
            path: doc.path.clone(),
            permalink: full_url_for(&self.folio.config, &doc.path),
            content,
            extra: doc.extra.clone(),
        }
    }

    fn base_context(&self, site_data: &SiteData, menu: &[MenuItem], current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("menu", menu);
        context.insert("current_path", current_path);
        context
    }

    /// Render one document with the template named after its layout
    fn render_document(
        &self,
        doc: &Document,
        posts: &[&Document],
        site_data: &SiteData,
        menu: &[MenuItem],
    ) -> Result<String> {
        let content = self.markdown.render(&doc.body);

        let mut context = self.base_context(site_data, menu, &doc.path);
        context.insert("page", &self.page_data(doc, content));

        let nav = |d: &Document| NavPost {
            title: d.title.clone(),
            path: d.path.clone(),
        };
        let (newer, older) = if doc.is_post() {
            (doc.prev(posts).map(nav), doc.next(posts).map(nav))
        } else {
            (None, None)
        };
        context.insert("newer_post", &newer);
        context.insert("older_post", &older);

        let recent: Vec<PageData> = posts
            .iter()
            .take(ABOUT_RECENT_POSTS)
            .map(|p| self.page_data(p, String::new()))
            .collect();
        context.insert("recent_posts", &recent);

        let template = format!("{}.html", doc.layout);
        self.templates
            .render(&template, &context)
            .map_err(|e| anyhow!("{}: {}", doc.id, e))
    }

    /// Render index pages with pagination
    fn render_index_pages(
        &self,
        site: &mut SiteMap,
        posts: &[&Document],
        site_data: &SiteData,
        menu: &[MenuItem],
    ) -> Result<()> {
        let config = &self.folio.config;
        let per_page = config.per_page.max(1);
        let total_pages = posts.len().div_ceil(per_page).max(1);
        let page_url = |n: usize| {
            if n == 1 {
                url_for(config, "")
            } else {
                url_for(config, &format!("page/{}/", n))
            }
        };

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(posts.len());
            let page_posts: Vec<PageData> = posts[start..end]
                .iter()
                .map(|p| self.page_data(p, String::new()))
                .collect();

            let pagination = PaginationData {
                per_page,
                total: total_pages,
                current: page_num,
                current_url: page_url(page_num),
                prev_link: if page_num > 1 {
                    page_url(page_num - 1)
                } else {
                    String::new()
                },
                next_link: if page_num < total_pages {
                    page_url(page_num + 1)
                } else {
                    String::new()
                },
            };

            let mut context = self.base_context(site_data, menu, &pagination.current_url);
            context.insert("posts", &page_posts);
            context.insert("pagination", &pagination);

            let html = self.templates.render("index.html", &context)?;
            site.insert(pagination.current_url.clone(), html.into_bytes())?;
        }

        Ok(())
    }

    /// One forwarding page per legacy path
    fn render_redirects(
        &self,
        site: &mut SiteMap,
        store: &ContentStore,
        site_data: &SiteData,
    ) -> Result<()> {
        for redirect in store.redirects() {
            let data = RedirectData {
                url: full_url_for(&self.folio.config, &redirect.to),
                from: redirect.from.clone(),
                to: redirect.to.clone(),
            };
            let mut context = Context::new();
            context.insert("site", site_data);
            context.insert("redirect", &data);

            let html = self.templates.render("redirect.html", &context)?;
            site.insert(redirect.from.clone(), html.into_bytes())
                .map_err(|e| anyhow!("{}: {}", redirect.id, e))?;
            tracing::debug!("Redirect {} -> {}", redirect.from, redirect.to);
        }
        Ok(())
    }

    /// Generate the Atom feed
    fn render_atom_feed(&self, site: &mut SiteMap, posts: &[&Document]) -> Result<()> {
        let config = &self.folio.config;
        let tz = config.tz()?;
        let home = full_url_for(config, &url_for(config, ""));
        let feed_path = url_for(config, "atom.xml");
        let base_url = config.url.trim_end_matches('/');

        // Newest post date, so identical content yields an identical feed
        let updated = posts
            .first()
            .and_then(|p| p.publish_date)
            .map(|d| date_xml(&start_of_day(d, tz)))
            .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string());

        let mut feed = String::new();
        feed.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        feed.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        if !config.subtitle.is_empty() {
            feed.push_str(&format!(
                "  <subtitle>{}</subtitle>\n",
                escape_xml(&config.subtitle)
            ));
        }
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, &feed_path)
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", home));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", home));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for post in posts.iter().take(config.feed_limit) {
            let url = full_url_for(config, &post.path);
            let published = post
                .publish_date
                .map(|d| date_xml(&start_of_day(d, tz)))
                .unwrap_or_else(|| updated.clone());

            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", url));
            feed.push_str(&format!("    <id>{}</id>\n", url));
            feed.push_str(&format!("    <published>{}</published>\n", published));
            feed.push_str(&format!("    <updated>{}</updated>\n", published));
            feed.push_str(&format!(
                "    <summary>{}</summary>\n",
                escape_xml(&post.description)
            ));
            let content = absolutize_urls(&self.markdown.render(&post.body), base_url);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                strip_invalid_xml_chars(&content).replace("]]>", "]]]]><![CDATA[>")
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        site.insert(feed_path, feed.into_bytes())
    }
}
