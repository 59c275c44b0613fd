//! List site content

use anyhow::{bail, Result};

use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    for line in lines(folio, content_type)? {
        println!("{}", line);
    }
    Ok(())
}

/// The listing for `content_type`, one entry per line after a heading
pub fn lines(folio: &Folio, content_type: &str) -> Result<Vec<String>> {
    // Layouts need no content, so a broken corpus can still list them
    if matches!(content_type, "layout" | "layouts") {
        let layouts = folio.templates()?.layouts();
        let names: Vec<&str> = layouts.iter().collect();
        let mut out = vec![format!("Layouts ({}):", names.len())];
        out.extend(names.iter().map(|l| format!("  {}", l)));
        return Ok(out);
    }

    let store = folio.load_store()?;
    let mut out = Vec::new();

    match content_type {
        "post" | "posts" => {
            let posts = store.list_posts();
            out.push(format!("Posts ({}):", posts.len()));
            for post in posts {
                let date = post
                    .publish_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                out.push(format!("  {} - {} [{}]", date, post.title, post.id));
            }
        }
        "page" | "pages" => {
            let pages: Vec<_> = store
                .list_documents()
                .into_iter()
                .filter(|d| !d.is_post())
                .collect();
            out.push(format!("Pages ({}):", pages.len()));
            for page in pages {
                out.push(format!("  {} {} [{}]", page.path, page.title, page.id));
            }
        }
        "menu" => {
            let pages = store.list_menu_pages();
            out.push(format!("Menu ({}):", pages.len()));
            for page in pages {
                let order = page.order.map(|o| o.to_string()).unwrap_or_else(|| "-".into());
                out.push(format!("  {} {} -> {}", order, page.title, page.path));
            }
        }
        "redirect" | "redirects" => {
            let redirects = store.redirects();
            out.push(format!("Redirects ({}):", redirects.len()));
            for r in redirects {
                out.push(format!("  {} -> {} [{}]", r.from, r.to, r.id));
            }
        }
        _ => {
            bail!(
                "Unknown type: {}. Available: post, page, menu, redirect, layout",
                content_type
            );
        }
    }

    Ok(out)
}
