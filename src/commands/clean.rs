//! Clean the public directory

use anyhow::{anyhow, Result};
use std::fs;

use crate::Folio;

/// Remove the generated output
pub fn run(folio: &Folio) -> Result<()> {
    if folio.public_dir.exists() {
        fs::remove_dir_all(&folio.public_dir)
            .map_err(|e| anyhow!("Failed to delete {:?}: {}", folio.public_dir, e))?;
        tracing::info!("Deleted: {:?}", folio.public_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", folio.public_dir);
    }
    Ok(())
}
