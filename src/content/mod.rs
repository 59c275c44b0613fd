//! Content module - loads, validates and orders the blog's documents

mod document;
mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod store;

pub use document::{Document, DocumentKind};
pub use error::{ContentError, ValidationErrors};
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use store::{ContentStore, Layouts, Redirect};
