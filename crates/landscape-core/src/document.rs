//! Lecture records and the corpus handed to the pipeline
//!
//! Records are read-only snapshots produced by the query collaborator. The
//! pipeline reads text fields for features, category paths for landmarks and
//! carries everything else through to the output untouched.

use serde::{Deserialize, Serialize};

/// Root sentinel of every category path; never used as a label.
pub const ROOT_CATEGORY: &str = "Top";

/// A category attached to a lecture, with its path from the root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    #[serde(default)]
    pub path: Vec<String>,
}

/// Organization a presenter works at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Lecture presenter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presenter {
    pub name: String,
    #[serde(default)]
    pub works_at: Vec<Organization>,
}

/// One lecture record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Titles of the parent categories
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default, rename = "type")]
    pub lecture_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub presenters: Vec<Presenter>,
    /// Recording date, ISO-8601
    #[serde(default)]
    pub recorded: Option<String>,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, title: impl Into<String>, path: &[&str]) -> Self {
        self.categories.push(Category {
            title: title.into(),
            path: path.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn with_presenter(mut self, presenter: Presenter) -> Self {
        self.presenters.push(presenter);
        self
    }

    /// Category-path expansion used for landmark labeling.
    ///
    /// Paths of all categories are concatenated, underscores become spaces,
    /// duplicates are dropped in first-seen order and the root is excluded.
    pub fn category_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for category in &self.categories {
            for step in &category.path {
                let term = step.replace('_', " ");
                if term != ROOT_CATEGORY && !terms.contains(&term) {
                    terms.push(term);
                }
            }
        }
        terms
    }

    /// Presenter names, or `None` when the lecture lists nobody.
    pub fn presenter_names(&self) -> Option<Vec<String>> {
        if self.presenters.is_empty() {
            return None;
        }
        Some(self.presenters.iter().map(|p| p.name.clone()).collect())
    }

    /// First named organization of any presenter.
    pub fn organization(&self) -> Option<String> {
        self.presenters
            .iter()
            .flat_map(|p| p.works_at.iter())
            .find_map(|o| o.name.clone())
    }
}

/// Ordered, non-empty list of documents selected by one query.
///
/// Point `i` of every pipeline output aligns with document `i`.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Wrap a query result. Empty results are rejected here, before any
    /// pipeline stage runs.
    pub fn new(documents: Vec<Document>) -> crate::Result<Self> {
        if documents.is_empty() {
            return Err(crate::LandscapeError::EmptyCorpus);
        }
        Ok(Self { documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_corpus_is_rejected() {
        let err = Corpus::new(Vec::new()).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn category_terms_expand_paths() {
        let doc = Document::new("Deep nets")
            .with_category("Deep Learning", &["Top", "Computer_Science", "Machine_Learning", "Deep_Learning"])
            .with_category("Big Data", &["Top", "Computer_Science", "Big_Data"]);

        assert_eq!(
            doc.category_terms(),
            vec![
                "Computer Science".to_string(),
                "Machine Learning".to_string(),
                "Deep Learning".to_string(),
                "Big Data".to_string(),
            ]
        );
    }

    #[test]
    fn organization_is_first_named_workplace() {
        let doc = Document::new("Talk")
            .with_presenter(Presenter {
                name: "Ada".into(),
                works_at: vec![Organization::default()],
            })
            .with_presenter(Presenter {
                name: "Grace".into(),
                works_at: vec![Organization {
                    name: Some("Jozef Stefan Institute".into()),
                    city: Some("Ljubljana".into()),
                    country: Some("Slovenia".into()),
                }],
            });

        assert_eq!(doc.organization().as_deref(), Some("Jozef Stefan Institute"));
        assert_eq!(doc.presenter_names(), Some(vec!["Ada".into(), "Grace".into()]));
    }

    #[test]
    fn deserializes_minimal_record() {
        let doc: Document = serde_json::from_str(r#"{"title": "Only a title", "type": "lecture"}"#).unwrap();
        assert_eq!(doc.title, "Only a title");
        assert_eq!(doc.lecture_type.as_deref(), Some("lecture"));
        assert!(doc.categories.is_empty());
        assert_eq!(doc.views, 0);
    }
}
