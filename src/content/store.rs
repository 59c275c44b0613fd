//! Content store - the validated, ordered collection of documents

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::{ContentError, Document, ValidationErrors};
use crate::helpers::{check_site_path, normalize_path};

/// Layout names the renderer has templates for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layouts {
    names: BTreeSet<String>,
}

impl Layouts {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, layout: &str) -> bool {
        self.names.contains(layout)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// A legacy path forwarding to a document's canonical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Normalized legacy path
    pub from: String,
    /// Canonical path of the target document
    pub to: String,
    /// Id of the target document
    pub id: String,
}

/// The authoritative collection of documents for one build
///
/// The store never changes after construction: every listing is a pure
/// function of the documents it was built from.
#[derive(Debug, Clone)]
pub struct ContentStore {
    /// All loaded documents, published or not, ordered by id
    documents: Vec<Document>,
    layouts: Layouts,
}

impl ContentStore {
    pub fn new(mut documents: Vec<Document>, layouts: Layouts) -> Self {
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Self { documents, layouts }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    /// Every loaded document, including unpublished ones, by id
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents
            .binary_search_by(|d| d.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.documents[i])
    }

    fn published(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.published)
    }

    /// All published documents: posts newest first, then menu pages by
    /// `order`, then the remaining pages by id
    pub fn list_documents(&self) -> Vec<&Document> {
        let mut docs = self.list_posts();
        docs.extend(self.list_menu_pages());
        docs.extend(
            self.published()
                .filter(|d| !d.is_post() && !d.is_menu_page()),
        );
        docs
    }

    /// Published posts, newest first; same-day posts by id
    pub fn list_posts(&self) -> Vec<&Document> {
        let mut posts: Vec<&Document> = self.published().filter(|d| d.is_post()).collect();
        posts.sort_by(|a, b| {
            Reverse(a.publish_date)
                .cmp(&Reverse(b.publish_date))
                .then_with(|| a.id.cmp(&b.id))
        });
        posts
    }

    /// Published menu pages by `order`; pages without one come last
    pub fn list_menu_pages(&self) -> Vec<&Document> {
        let mut pages: Vec<&Document> =
            self.published().filter(|d| d.is_menu_page()).collect();
        pages.sort_by_key(|d| (d.order.is_none(), d.order, d.id.clone()));
        pages
    }

    /// The redirect table, ordered by legacy path
    pub fn redirects(&self) -> Vec<Redirect> {
        let mut redirects: Vec<Redirect> = self
            .published()
            .flat_map(|doc| {
                doc.redirect_paths().map(move |from| Redirect {
                    from,
                    to: doc.path.clone(),
                    id: doc.id.clone(),
                })
            })
            .collect();
        redirects.sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.id.cmp(&b.id)));
        redirects.dedup_by(|a, b| a.from == b.from);
        redirects
    }

    /// Validate one document against the layouts and the rest of the corpus,
    /// returning the first problem found
    pub fn validate(&self, doc: &Document) -> Result<(), ContentError> {
        if let Some(error) = self.schema_errors(doc).into_iter().next() {
            return Err(error);
        }
        if !doc.published {
            return Ok(());
        }

        let mut seen = HashSet::new();
        for path in doc.redirect_paths() {
            if !seen.insert(path.clone()) || path == normalize_path(&doc.path) {
                return Err(duplicate(doc, path, &doc.id));
            }
            let claimant = self
                .published()
                .filter(|other| other.id != doc.id)
                .find(|other| {
                    normalize_path(&other.path) == path
                        || other.redirect_paths().any(|p| p == path)
                });
            if let Some(other) = claimant {
                return Err(duplicate(doc, path, &other.id));
            }
        }
        Ok(())
    }

    /// Validate the whole corpus, collecting every problem
    ///
    /// Each redirect collision is reported once, against the claimant that
    /// comes first: canonical paths, then redirects in id order.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        for doc in &self.documents {
            errors.extend(self.schema_errors(doc));
        }

        let mut claims: HashMap<String, &str> = HashMap::new();
        for doc in self.published() {
            let path = normalize_path(&doc.path);
            if let Some(existing) = claims.insert(path.clone(), &doc.id) {
                claims.insert(path.clone(), existing);
                errors.push(ContentError::schema(
                    &doc.id,
                    format!("canonical path {} is already used by {}", path, existing),
                ));
            }
        }
        for doc in self.published() {
            for path in doc.redirect_paths() {
                match claims.get(&path) {
                    Some(claimed_by) => errors.push(duplicate(doc, path, claimed_by)),
                    None => {
                        claims.insert(path, &doc.id);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    fn schema_errors(&self, doc: &Document) -> Vec<ContentError> {
        let mut errors = Vec::new();

        if doc.layout.trim().is_empty() {
            errors.push(ContentError::schema(&doc.id, "missing required field `layout`"));
        } else if !self.layouts.contains(&doc.layout) {
            let known: Vec<&str> = self.layouts.iter().collect();
            errors.push(ContentError::schema(
                &doc.id,
                format!(
                    "unknown layout `{}` (known: {})",
                    doc.layout,
                    known.join(", ")
                ),
            ));
        }

        // Drafts too
        if let Err(reason) = check_site_path(&doc.path) {
            errors.push(ContentError::schema(
                &doc.id,
                format!("path `{}` {}", doc.path, reason),
            ));
        }
        for path in &doc.redirect_from {
            if let Err(reason) = check_site_path(path) {
                errors.push(ContentError::schema(
                    &doc.id,
                    format!("`redirect_from` entry `{}` {}", path, reason),
                ));
            }
        }

        if !doc.published {
            return errors;
        }

        if doc.title.trim().is_empty() {
            errors.push(ContentError::schema(&doc.id, "missing or empty `title`"));
        }
        if doc.description.trim().is_empty() {
            errors.push(ContentError::schema(&doc.id, "missing or empty `description`"));
        }
        if doc.is_post() && doc.publish_date.is_none() {
            errors.push(ContentError::schema(
                &doc.id,
                "post filename must start with a YYYY-MM-DD- date",
            ));
        }
        if doc.redirect_from.iter().any(|p| p.trim().is_empty()) {
            errors.push(ContentError::schema(&doc.id, "empty `redirect_from` entry"));
        }

        errors
    }
}

fn duplicate(doc: &Document, path: String, claimed_by: &str) -> ContentError {
    ContentError::DuplicateRedirect {
        id: doc.id.clone(),
        path,
        claimed_by: claimed_by.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::DocumentKind;

    fn layouts() -> Layouts {
        Layouts::new(["post", "page", "about"])
    }

    fn post(id: &str, redirects: &[&str]) -> Document {
        let mut doc = Document::new(id, DocumentKind::Post);
        doc.layout = "post".to_string();
        doc.title = format!("Title of {}", doc.slug);
        doc.description = "A description".to_string();
        doc.redirect_from = redirects.iter().map(|s| s.to_string()).collect();
        doc.path = format!("/{}/", doc.slug);
        doc
    }

    fn page(id: &str, layout: &str, menu: bool, order: Option<i64>) -> Document {
        let mut doc = Document::new(id, DocumentKind::Page);
        doc.layout = layout.to_string();
        doc.title = doc.slug.clone();
        doc.description = "A page".to_string();
        doc.menu = menu;
        doc.order = order;
        doc.path = format!("/{}/", doc.slug);
        doc
    }

    fn blog() -> ContentStore {
        ContentStore::new(
            vec![
                page("about.md", "about", true, None),
                post("_posts/2015-09-03-mocking-entity-framework.md", &[]),
                post(
                    "_posts/2016-03-08-azure-event-hub.md",
                    &["/post/timing-health-checks-in-a-functional-way"],
                ),
            ],
            layouts(),
        )
    }

    fn ids(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn test_post_listing_newest_first_without_pages() {
        let store = blog();
        assert_eq!(
            ids(&store.list_posts()),
            vec![
                "_posts/2016-03-08-azure-event-hub.md",
                "_posts/2015-09-03-mocking-entity-framework.md",
            ]
        );
    }

    #[test]
    fn test_list_documents_puts_menu_pages_after_posts() {
        let store = blog();
        assert_eq!(
            ids(&store.list_documents()),
            vec![
                "_posts/2016-03-08-azure-event-hub.md",
                "_posts/2015-09-03-mocking-entity-framework.md",
                "about.md",
            ]
        );
    }

    #[test]
    fn test_list_documents_is_idempotent() {
        let store = blog();
        assert_eq!(ids(&store.list_documents()), ids(&store.list_documents()));
    }

    #[test]
    fn test_listing_independent_of_input_order() {
        let mut docs = blog().documents().to_vec();
        docs.reverse();
        let reversed = ContentStore::new(docs, layouts());
        assert_eq!(ids(&reversed.list_documents()), ids(&blog().list_documents()));
    }

    #[test]
    fn test_same_day_posts_ordered_by_id() {
        let store = ContentStore::new(
            vec![
                post("_posts/2016-03-08-b.md", &[]),
                post("_posts/2016-03-08-a.md", &[]),
            ],
            layouts(),
        );
        assert_eq!(
            ids(&store.list_posts()),
            vec!["_posts/2016-03-08-a.md", "_posts/2016-03-08-b.md"]
        );
    }

    #[test]
    fn test_menu_pages_by_order() {
        let store = ContentStore::new(
            vec![
                page("links.md", "page", true, None),
                page("projects.md", "page", true, Some(2)),
                page("about.md", "about", true, Some(1)),
                page("colophon.md", "page", false, Some(0)),
            ],
            layouts(),
        );
        assert_eq!(
            ids(&store.list_menu_pages()),
            vec!["about.md", "projects.md", "links.md"]
        );
        assert_eq!(
            ids(&store.list_documents()),
            vec!["about.md", "projects.md", "links.md", "colophon.md"]
        );
    }

    #[test]
    fn test_unpublished_documents_are_not_listed() {
        let mut draft = post("_posts/2017-01-01-draft.md", &["/old"]);
        draft.published = false;
        draft.title.clear();
        let store = ContentStore::new(vec![draft], layouts());
        assert!(store.list_documents().is_empty());
        assert!(store.redirects().is_empty());
        assert!(store.validate_all().is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_valid_corpus() {
        let store = blog();
        assert!(store.validate_all().is_ok());
        for doc in store.documents() {
            assert!(store.validate(doc).is_ok(), "{}", doc.id);
        }
    }

    #[test]
    fn test_unknown_layout() {
        let mut doc = page("about.md", "aboot", true, None);
        doc.layout = "aboot".to_string();
        let store = ContentStore::new(vec![doc.clone()], layouts());
        let err = store.validate(&doc).unwrap_err();
        assert!(matches!(err, ContentError::Schema { .. }));
        assert!(err.to_string().contains("unknown layout `aboot`"));
        assert!(store.validate_all().is_err());
    }

    #[test]
    fn test_missing_required_fields() {
        let mut doc = post("_posts/2016-03-08-x.md", &[]);
        doc.layout.clear();
        doc.title.clear();
        doc.description = "  ".to_string();
        let store = ContentStore::new(vec![doc], layouts());
        let errors = store.validate_all().unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(errors.len(), 3, "{:?}", messages);
        assert!(messages[0].contains("`layout`"));
        assert!(messages[1].contains("`title`"));
        assert!(messages[2].contains("`description`"));
    }

    #[test]
    fn test_undated_post() {
        let doc = post("_posts/event-hub.md", &[]);
        let store = ContentStore::new(vec![doc.clone()], layouts());
        let err = store.validate(&doc).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_duplicate_redirect_between_documents() {
        let a = post("_posts/2015-09-03-a.md", &["/post/shared"]);
        let b = post("_posts/2016-03-08-b.md", &["/post/shared/"]);
        let store = ContentStore::new(vec![a.clone(), b.clone()], layouts());

        match store.validate(&b).unwrap_err() {
            ContentError::DuplicateRedirect {
                id,
                path,
                claimed_by,
            } => {
                assert_eq!(id, b.id);
                assert_eq!(path, "/post/shared");
                assert_eq!(claimed_by, a.id);
            }
            other => panic!("unexpected error: {}", other),
        }

        // Reported once in a full pass, against the earlier document
        let errors = store.validate_all().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].document_id(), Some(b.id.as_str()));
    }

    #[test]
    fn test_redirect_onto_canonical_path() {
        let a = post("_posts/2015-09-03-a.md", &[]);
        let b = post("_posts/2016-03-08-b.md", &["/a/"]);
        let store = ContentStore::new(vec![a.clone(), b.clone()], layouts());
        let err = store.validate(&b).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateRedirect { ref claimed_by, .. } if *claimed_by == a.id));
    }

    #[test]
    fn test_redirect_repeated_within_document() {
        let a = post("_posts/2015-09-03-a.md", &["/old", "/old/"]);
        let store = ContentStore::new(vec![a.clone()], layouts());
        assert!(matches!(
            store.validate(&a).unwrap_err(),
            ContentError::DuplicateRedirect { .. }
        ));
        assert_eq!(store.validate_all().unwrap_err().len(), 1);
    }

    #[test]
    fn test_shared_canonical_path() {
        let a = page("about.md", "about", true, None);
        let mut b = page("about/index.md", "page", false, None);
        b.path = a.path.clone();
        let store = ContentStore::new(vec![a, b], layouts());
        let errors = store.validate_all().unwrap_err();
        assert!(errors.to_string().contains("already used by about.md"));
    }

    #[test]
    fn test_redirect_table() {
        let store = blog();
        let redirects = store.redirects();
        assert_eq!(
            redirects,
            vec![Redirect {
                from: "/post/timing-health-checks-in-a-functional-way".to_string(),
                to: "/azure-event-hub/".to_string(),
                id: "_posts/2016-03-08-azure-event-hub.md".to_string(),
            }]
        );
    }

    #[test]
    fn test_redirect_outside_site_is_rejected() {
        let doc = page("about.md", "about", true, None);
        let mut escaping = doc.clone();
        escaping.redirect_from = vec!["/../source/about.md".to_string()];
        let store = ContentStore::new(vec![escaping.clone()], layouts());

        let err = store.validate(&escaping).unwrap_err();
        assert!(matches!(err, ContentError::Schema { ref id, .. } if id == "about.md"));
        assert!(err.to_string().contains("`..` segments"));
        assert!(store.validate_all().is_err());
    }

    #[test]
    fn test_permalink_with_dot_segment_is_rejected() {
        let mut doc = post("_posts/2016-03-08-hub.md", &[]);
        doc.path = "/blog/../../escaped/".to_string();
        doc.published = false;
        let store = ContentStore::new(vec![doc], layouts());
        let errors = store.validate_all().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().next().unwrap().to_string().contains("path `/blog/../../escaped/`"));
    }

    #[test]
    fn test_absolute_url_redirect_is_rejected() {
        let doc = post(
            "_posts/2016-03-08-hub.md",
            &["https://old.example.com/post/hub"],
        );
        let store = ContentStore::new(vec![doc.clone()], layouts());
        let err = store.validate(&doc).unwrap_err();
        assert!(err.to_string().contains("must be a site path"));
    }

    #[test]
    fn test_get_by_id() {
        let store = blog();
        assert_eq!(store.get("about.md").map(|d| d.title.as_str()), Some("about"));
        assert!(store.get("missing.md").is_none());
    }
}
