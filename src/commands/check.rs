//! Validate content without generating

use anyhow::Result;

use crate::content::{ContentLoader, ContentStore};
use crate::Folio;

/// Load and validate every document
///
/// On failure the returned error is a [`ValidationErrors`] listing every
/// problem found, so all of them can be fixed in one pass.
///
/// [`ValidationErrors`]: crate::content::ValidationErrors
pub fn run(folio: &Folio) -> Result<ContentStore> {
    let templates = folio.templates()?;
    let store = ContentLoader::new(folio)?.load(templates.layouts())?;

    let redirects = store.redirects();
    println!(
        "{} documents OK ({} posts, {} redirects)",
        store.len(),
        store.list_posts().len(),
        redirects.len()
    );
    Ok(store)
}
