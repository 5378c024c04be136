//! Pipeline output: placed points with their lecture metadata

use serde::Serialize;

use crate::document::{Document, ROOT_CATEGORY};
use crate::embed::Termination;
use crate::features::FeatureSpace;
use crate::landmark::Landmark;
use crate::reduce::ReductionStrategy;

/// One lecture on the landscape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub title: String,
    pub slug: Option<String>,
    #[serde(rename = "type")]
    pub lecture_type: Option<String>,
    /// Presenter names
    pub author: Option<Vec<String>>,
    pub organization: Option<String>,
    pub language: Option<String>,
    /// Category-path terms, root excluded
    pub categories: Vec<String>,
    pub published: Option<String>,
    pub duration: Option<u64>,
    pub public: Option<bool>,
    pub enabled: Option<bool>,
    pub views: u64,
    pub description: Option<String>,
    /// `(category, weight)` for every non-zero entry of the category vector
    pub landmark_tags: Vec<(String, f64)>,
}

impl Point {
    pub fn from_document(doc: &Document, [x, y]: [f64; 2], landmark_tags: Vec<(String, f64)>) -> Self {
        Self {
            x,
            y,
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            lecture_type: doc.lecture_type.clone(),
            author: doc.presenter_names(),
            organization: doc.organization(),
            language: doc.language.clone(),
            categories: doc.category_terms(),
            published: doc.recorded.clone(),
            duration: doc.duration,
            public: doc.public,
            enabled: doc.enabled,
            views: doc.views,
            description: doc.description.clone(),
            landmark_tags,
        }
    }
}

/// Non-zero category weights of `doc`, excluding the root.
pub fn landmark_tags(space: &FeatureSpace, doc: &Document) -> Vec<(String, f64)> {
    space
        .extract_vector(doc)
        .into_iter()
        .enumerate()
        .filter(|&(_, weight)| weight != 0.0)
        .filter_map(|(i, weight)| {
            let term = space.feature_name(i)?;
            (term != ROOT_CATEGORY).then(|| (term.to_string(), weight))
        })
        .collect()
}

/// What a pipeline run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub documents: usize,
    pub terms: usize,
    /// Absent when reduction was skipped
    pub strategy: Option<ReductionStrategy>,
    pub retained_dimensions: usize,
    pub mds_steps: usize,
    pub termination: Option<Termination>,
    pub seed: u64,
    pub elapsed_ms: u128,
}

/// One point per corpus document, in corpus order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointSet {
    pub points: Vec<Point>,
    pub landmarks: Vec<Landmark>,
    pub stats: PipelineStats,
}

impl PointSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.points.iter().map(|p| [p.x, p.y])
    }
}
