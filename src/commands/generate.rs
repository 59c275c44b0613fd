//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebouncedEvent};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::ContentLoader;
use crate::generator::{Generator, SiteMap};
use crate::Folio;

/// Render the whole site into memory without touching the output directory
pub fn build(folio: &Folio) -> Result<SiteMap> {
    let templates = folio.templates()?;
    render(folio, &Generator::new(folio, &templates)?)
}

/// Generate the static site, replacing the output directory
pub fn run(folio: &Folio) -> Result<SiteMap> {
    let start = Instant::now();

    let templates = folio.templates()?;
    let generator = Generator::new(folio, &templates)?;
    let site = render(folio, &generator)?;
    generator.write(&site)?;

    tracing::info!(
        "Generated {} files in {:.2}s",
        site.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(site)
}

fn render(folio: &Folio, generator: &Generator) -> Result<SiteMap> {
    let loader = ContentLoader::new(folio)?;
    let store = loader.load(generator.layouts())?;
    let assets = loader.load_assets()?;

    tracing::info!(
        "Loaded {} posts and {} documents in total",
        store.list_posts().len(),
        store.len()
    );

    generator.render(&store, &assets)
}

/// Watch the site for changes and regenerate, calling `on_rebuilt` after
/// every successful build. Blocks until the watcher goes away.
pub fn watch<F: FnMut()>(folio: &Folio, mut on_rebuilt: F) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&folio.source_dir, &folio.layout_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }
    let config_path = folio.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) => {
                let changed: Vec<&DebouncedEvent> =
                    events.iter().filter(|e| is_relevant(&e.path)).collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // The config may have changed too, so reopen the site
                match Folio::new(&folio.base_dir).and_then(|f| run(&f)) {
                    Ok(_) => on_rebuilt(),
                    Err(e) => tracing::error!("Generation failed: {:#}", e),
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Editor droppings and VCS metadata never trigger a rebuild
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}
