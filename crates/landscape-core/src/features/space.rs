//! Per-query vocabulary and TF-IDF weighting model

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::matrix::FeatureMatrix;
use super::tokenizer::Tokenizer;
use crate::document::{Corpus, Document};
use crate::error::{LandscapeError, Result};

/// Text source on a lecture record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Title,
    Description,
    Slug,
    /// Titles of the lecture's categories
    Categories,
    /// Titles of the parent categories
    Parents,
}

impl TextField {
    fn values<'a>(&self, doc: &'a Document) -> Vec<&'a str> {
        match self {
            Self::Title => vec![doc.title.as_str()],
            Self::Description => doc.description.as_deref().into_iter().collect(),
            Self::Slug => doc.slug.as_deref().into_iter().collect(),
            Self::Categories => doc.categories.iter().map(|c| c.title.as_str()).collect(),
            Self::Parents => doc.parents.iter().map(|p| p.as_str()).collect(),
        }
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Description => write!(f, "description"),
            Self::Slug => write!(f, "slug"),
            Self::Categories => write!(f, "categories"),
            Self::Parents => write!(f, "parents"),
        }
    }
}

/// One participating field and how it is tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub field: TextField,
    #[serde(default)]
    pub tokenizer: Tokenizer,
}

impl FieldConfig {
    pub fn new(field: TextField, tokenizer: Tokenizer) -> Self {
        Self { field, tokenizer }
    }
}

/// Fields of the lecture space used for point placement.
pub fn lecture_fields() -> Vec<FieldConfig> {
    let words = Tokenizer::Unicode { stopwords: true };
    let names = Tokenizer::Unicode { stopwords: false };
    vec![
        FieldConfig::new(TextField::Title, words),
        FieldConfig::new(TextField::Description, words),
        FieldConfig::new(TextField::Slug, words),
        FieldConfig::new(TextField::Categories, names),
        FieldConfig::new(TextField::Parents, names),
    ]
}

/// Reject empty and duplicated field lists.
pub fn validate_fields(fields: &[FieldConfig]) -> Result<()> {
    if fields.is_empty() {
        return Err(LandscapeError::InvalidFields(
            "at least one field must be configured".to_string(),
        ));
    }
    for (i, config) in fields.iter().enumerate() {
        if fields[..i].iter().any(|c| c.field == config.field) {
            return Err(LandscapeError::InvalidFields(format!(
                "field '{}' configured twice",
                config.field
            )));
        }
    }
    Ok(())
}

/// Vocabulary of a single field.
#[derive(Debug, Clone)]
struct FieldVocabulary {
    config: FieldConfig,
    terms: Vec<String>,
    index: AHashMap<String, usize>,
    idf: Vec<f64>,
}

impl FieldVocabulary {
    fn new(config: FieldConfig) -> Self {
        Self {
            config,
            terms: Vec::new(),
            index: AHashMap::new(),
            idf: Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.terms.clear();
        self.index.clear();
        self.idf.clear();
    }

    fn tokens(&self, doc: &Document) -> Vec<String> {
        let mut tokens = Vec::new();
        for value in self.config.field.values(doc) {
            self.config.tokenizer.tokens_into(value, &mut tokens);
        }
        tokens
    }

    /// Learn terms in first-seen order and their document frequencies.
    fn learn(&mut self, corpus: &Corpus) {
        let mut doc_freq: Vec<usize> = Vec::new();
        for doc in corpus {
            let mut tokens = self.tokens(doc);
            tokens.sort_unstable();
            tokens.dedup();
            for token in tokens {
                match self.index.get(&token) {
                    Some(&idx) => doc_freq[idx] += 1,
                    None => {
                        self.index.insert(token.clone(), self.terms.len());
                        self.terms.push(token);
                        doc_freq.push(1);
                    }
                }
            }
        }

        let n = corpus.len() as f64;
        self.idf = doc_freq
            .iter()
            .map(|&df| (n / (df.max(1) as f64)).ln() + 1.0)
            .collect();
    }

    /// L2-normalized TF-IDF entries `(local term, weight)`, sorted by term.
    fn weigh(&self, doc: &Document) -> Vec<(usize, f64)> {
        let mut tf: AHashMap<usize, f64> = AHashMap::new();
        for token in self.tokens(doc) {
            if let Some(&idx) = self.index.get(&token) {
                *tf.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = tf
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }
        entries
    }
}

/// Vocabulary + weighting model over one field configuration.
///
/// A space is fit on exactly one corpus; each query builds its own space so
/// weights are relative to that corpus and nothing is shared between requests.
/// Extracting before fitting yields an empty vocabulary, not an error.
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    fields: Vec<FieldVocabulary>,
    n_documents: usize,
}

impl FeatureSpace {
    pub fn new(fields: Vec<FieldConfig>) -> Result<Self> {
        validate_fields(&fields)?;
        Ok(Self::from_fields(fields))
    }

    fn from_fields(fields: Vec<FieldConfig>) -> Self {
        Self {
            fields: fields.into_iter().map(FieldVocabulary::new).collect(),
            n_documents: 0,
        }
    }

    /// Space used for point placement.
    pub fn lectures() -> Self {
        Self::from_fields(lecture_fields())
    }

    /// Space over category titles, used only for landmark tags.
    pub fn categories() -> Self {
        Self::from_fields(vec![FieldConfig::new(
            TextField::Categories,
            Tokenizer::Phrase,
        )])
    }

    /// Drop the vocabulary.
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.n_documents = 0;
    }

    /// Replace the vocabulary with one learned from `corpus` alone.
    pub fn fit(&mut self, corpus: &Corpus) {
        self.clear();
        for field in &mut self.fields {
            field.learn(corpus);
        }
        self.n_documents = corpus.len();
    }

    pub fn is_fitted(&self) -> bool {
        self.n_documents > 0
    }

    /// Total number of terms across all fields.
    pub fn dim(&self) -> usize {
        self.fields.iter().map(|f| f.terms.len()).sum()
    }

    /// Term behind a global feature index.
    pub fn feature_name(&self, index: usize) -> Option<&str> {
        let mut offset = 0;
        for field in &self.fields {
            if index < offset + field.terms.len() {
                return Some(field.terms[index - offset].as_str());
            }
            offset += field.terms.len();
        }
        None
    }

    fn sparse_vector(&self, doc: &Document) -> Vec<(usize, f64)> {
        let mut entries = Vec::new();
        let mut offset = 0;
        for field in &self.fields {
            entries.extend(field.weigh(doc).into_iter().map(|(i, w)| (offset + i, w)));
            offset += field.terms.len();
        }
        entries
    }

    /// Sparse matrix with one column per document of `corpus`.
    pub fn extract(&self, corpus: &Corpus) -> FeatureMatrix {
        let columns = corpus.iter().map(|doc| self.sparse_vector(doc)).collect();
        FeatureMatrix::from_columns(self.dim(), columns)
    }

    /// Dense weight vector of one document over the fitted vocabulary.
    pub fn extract_vector(&self, doc: &Document) -> Vec<f64> {
        let mut vector = vec![0.0; self.dim()];
        for (i, w) in self.sparse_vector(doc) {
            vector[i] = w;
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Document::new("Deep learning for vision")
                .with_category("Deep Learning", &["Top", "Machine_Learning", "Deep_Learning"]),
            Document::new("Deep reinforcement learning")
                .with_category("Reinforcement Learning", &["Top", "Machine_Learning"]),
            Document::new("Protein folding").with_category("Biology", &["Top", "Biology"]),
        ])
        .unwrap()
    }

    #[test]
    fn fit_builds_vocabulary_per_corpus() {
        let mut space = FeatureSpace::lectures();
        assert!(!space.is_fitted());
        space.fit(&corpus());
        assert!(space.is_fitted());
        // title: deep, learning, vision, reinforcement, protein, folding
        // categories: deep, learning, reinforcement, biology
        assert_eq!(space.dim(), 10);
        assert_eq!(space.feature_name(0), Some("deep"));
        // first-seen across documents, sorted within one document
        assert_eq!(space.feature_name(3), Some("reinforcement"));
        assert_eq!(space.feature_name(4), Some("folding"));
        assert_eq!(space.feature_name(5), Some("protein"));
        assert_eq!(space.feature_name(6), Some("deep"));
        assert_eq!(space.feature_name(9), Some("biology"));
        assert_eq!(space.feature_name(10), None);
    }

    #[test]
    fn refit_replaces_vocabulary() {
        let mut space = FeatureSpace::lectures();
        space.fit(&corpus());
        let other = Corpus::new(vec![Document::new("Quantum computing")]).unwrap();
        space.fit(&other);
        assert_eq!(space.dim(), 2);
        assert_eq!(space.feature_name(0), Some("computing"));
        assert_eq!(space.feature_name(1), Some("quantum"));
    }

    #[test]
    fn extract_has_one_column_per_document() {
        let mut space = FeatureSpace::lectures();
        let corpus = corpus();
        space.fit(&corpus);
        let matrix = space.extract(&corpus);
        assert_eq!(matrix.cols(), 3);
        assert_eq!(matrix.rows(), space.dim());
        for j in 0..matrix.cols() {
            assert!(matrix.column(j).iter().all(|&(_, w)| w > 0.0));
        }
    }

    #[test]
    fn rare_terms_outweigh_common_ones() {
        let mut space = FeatureSpace::new(vec![FieldConfig::new(
            TextField::Title,
            Tokenizer::default(),
        )])
        .unwrap();
        let corpus = corpus();
        space.fit(&corpus);
        let v = space.extract_vector(&corpus.documents()[0]);
        // "deep" occurs in two titles, "vision" in one
        assert!(v[2] > v[0], "vision {} should outweigh deep {}", v[2], v[0]);
        let norm: f64 = v.iter().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unfitted_space_extracts_nothing() {
        let space = FeatureSpace::lectures();
        let matrix = space.extract(&corpus());
        assert_eq!(matrix.rows(), 0);
        assert!(matrix.is_zero());
        assert!(space.extract_vector(&Document::new("anything")).is_empty());
    }

    #[test]
    fn category_space_uses_whole_titles() {
        let mut space = FeatureSpace::categories();
        space.fit(&corpus());
        assert_eq!(space.dim(), 3);
        assert_eq!(space.feature_name(0), Some("Deep Learning"));
        assert_eq!(space.feature_name(1), Some("Reinforcement Learning"));
    }

    #[test]
    fn invalid_fields_rejected() {
        assert!(FeatureSpace::new(Vec::new()).unwrap_err().is_input_error());
        let dup = vec![
            FieldConfig::new(TextField::Title, Tokenizer::default()),
            FieldConfig::new(TextField::Title, Tokenizer::Phrase),
        ];
        let err = FeatureSpace::new(dup).unwrap_err();
        assert!(err.to_string().contains("title"));
    }
}
