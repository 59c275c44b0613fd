//! Content errors
//!
//! Every error names the offending document by its id (the source path
//! relative to the source directory) so the author knows which file to fix.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single problem with the content store
#[derive(Error, Debug)]
pub enum ContentError {
    /// Malformed or missing front matter, or a field the renderer cannot use
    #[error("{id}: {message}")]
    Schema { id: String, message: String },

    /// Two documents claim the same legacy path
    #[error("{id}: redirect path {path} is already claimed by {claimed_by}")]
    DuplicateRedirect {
        id: String,
        path: String,
        claimed_by: String,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub fn schema(id: impl Into<String>, message: impl Into<String>) -> Self {
        ContentError::Schema {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Id of the document the error refers to, if any
    pub fn document_id(&self) -> Option<&str> {
        match self {
            ContentError::Schema { id, .. } | ContentError::DuplicateRedirect { id, .. } => {
                Some(id)
            }
            ContentError::Io { .. } => None,
        }
    }
}

/// All errors found in one pass over the corpus
#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ContentError>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} content error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ContentError> for ValidationErrors {
    fn from(error: ContentError) -> Self {
        ValidationErrors(vec![error])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_document() {
        let err = ContentError::schema("_posts/2016-03-08-hub.md", "unknown layout `poost`");
        assert_eq!(
            err.to_string(),
            "_posts/2016-03-08-hub.md: unknown layout `poost`"
        );
        assert_eq!(err.document_id(), Some("_posts/2016-03-08-hub.md"));

        let err = ContentError::DuplicateRedirect {
            id: "b.md".to_string(),
            path: "/old".to_string(),
            claimed_by: "a.md".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "b.md: redirect path /old is already claimed by a.md"
        );
    }

    #[test]
    fn test_validation_errors_lists_each_error() {
        let errors = ValidationErrors(vec![
            ContentError::schema("a.md", "missing `title`"),
            ContentError::schema("b.md", "missing `description`"),
        ]);
        let text = errors.to_string();
        assert!(text.starts_with("2 content error(s)"));
        assert!(text.contains("\n  a.md: missing `title`"));
        assert!(text.contains("\n  b.md: missing `description`"));
    }
}
