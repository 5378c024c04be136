//! Topic labels for regions of the landscape

use ahash::AHashMap;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{LandscapeError, Result};

/// How a label is picked among the candidates of one anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelSelection {
    /// Highest frequency, ties by term
    MostFrequent,
    /// Frequency-weighted draw
    #[default]
    WeightedRandom,
}

/// Landmark placement and labeling knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LandmarkConfig {
    pub enabled: bool,
    /// Random anchors used for large corpora
    pub number_of_landmarks: usize,
    /// Corpora smaller than this use the points themselves as anchors
    pub anchor_threshold: usize,
    /// Proximity radius in unit coordinates
    pub radius: f64,
    /// Candidates considered per anchor
    pub top_k: usize,
    pub selection: LabelSelection,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            number_of_landmarks: 400,
            anchor_threshold: 50,
            radius: 0.05,
            top_k: 3,
            selection: LabelSelection::WeightedRandom,
        }
    }
}

impl LandmarkConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(LandscapeError::InvalidConfig(format!(
                "landmarks.radius must be positive, got {}",
                self.radius
            )));
        }
        if self.top_k == 0 {
            return Err(LandscapeError::InvalidConfig(
                "landmarks.topK must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A label pinned to a spot of the unit square.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub label: String,
    /// Documents near the anchor carrying the label
    pub frequency: usize,
}

/// Anchor positions: the points themselves for small corpora, otherwise
/// `number_of_landmarks` uniform draws over the unit square.
pub fn anchors(points: &[[f64; 2]], config: &LandmarkConfig, rng: &mut StdRng) -> Vec<[f64; 2]> {
    if points.len() < config.anchor_threshold {
        return points.to_vec();
    }
    (0..config.number_of_landmarks)
        .map(|_| [rng.gen::<f64>(), rng.gen::<f64>()])
        .collect()
}

/// Category-term frequencies of the documents strictly within `radius` of
/// `anchor`, sorted by frequency descending then term ascending.
pub fn tally(
    anchor: [f64; 2],
    points: &[[f64; 2]],
    documents: &[Document],
    radius: f64,
) -> Vec<(String, usize)> {
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    for (point, doc) in points.iter().zip(documents) {
        let dx = point[0] - anchor[0];
        let dy = point[1] - anchor[1];
        if (dx * dx + dy * dy).sqrt() < radius {
            for term in doc.category_terms() {
                *counts.entry(term).or_insert(0) += 1;
            }
        }
    }

    let mut tally: Vec<(String, usize)> = counts.into_iter().collect();
    tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tally
}

/// Pick a label among the first `top_k` candidates of a sorted tally.
pub fn choose_label<'a>(
    candidates: &'a [(String, usize)],
    top_k: usize,
    selection: LabelSelection,
    rng: &mut StdRng,
) -> Option<&'a (String, usize)> {
    let top = &candidates[..top_k.max(1).min(candidates.len())];
    match selection {
        LabelSelection::MostFrequent => top.first(),
        LabelSelection::WeightedRandom => {
            let dist = WeightedIndex::new(top.iter().map(|(_, f)| *f)).ok()?;
            top.get(dist.sample(rng))
        }
    }
}

/// Build the landmarks for a normalized layout. Anchors with no nearby
/// documents, or whose neighbours carry no category terms, get no landmark.
pub fn label_landmarks(
    points: &[[f64; 2]],
    documents: &[Document],
    config: &LandmarkConfig,
    rng: &mut StdRng,
) -> Vec<Landmark> {
    if !config.enabled {
        return Vec::new();
    }

    anchors(points, config, rng)
        .into_iter()
        .filter_map(|anchor| {
            let candidates = tally(anchor, points, documents, config.radius);
            let (label, frequency) = choose_label(&candidates, config.top_k, config.selection, rng)?;
            Some(Landmark {
                x: anchor[0],
                y: anchor[1],
                label: label.clone(),
                frequency: *frequency,
            })
        })
        .collect()
}
