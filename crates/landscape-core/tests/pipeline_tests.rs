//! End-to-end tests for the landscape pipeline

use std::sync::Mutex;

use landscape_core::{
    Corpus, Document, FeatureMatrix, LabelSelection, Landscape, LandscapeConfig, LandmarkConfig,
    ReducedBasis, ReductionParams, ReductionStrategy, Reducer, SvdReducer,
};

/// Helper to build a small mixed-topic corpus
fn lectures() -> Vec<Document> {
    vec![
        Document::new("Deep learning for computer vision")
            .with_description("Convolutional networks for image recognition")
            .with_category("Deep Learning", &["Top", "Computer_Science", "Machine_Learning", "Deep_Learning"]),
        Document::new("Recurrent networks and language models")
            .with_description("Deep learning for sequences and text")
            .with_category("Deep Learning", &["Top", "Computer_Science", "Machine_Learning", "Deep_Learning"]),
        Document::new("Kernel methods in machine learning")
            .with_description("Support vector machines and kernels")
            .with_category("Kernel Methods", &["Top", "Computer_Science", "Machine_Learning", "Kernel_Methods"]),
        Document::new("Mining massive graphs")
            .with_description("Scalable algorithms for social network graphs")
            .with_category("Big Data", &["Top", "Computer_Science", "Big_Data"]),
        Document::new("Streaming algorithms for big data")
            .with_description("Sketches and sampling over data streams")
            .with_category("Big Data", &["Top", "Computer_Science", "Big_Data"]),
        Document::new("Protein folding with molecular dynamics")
            .with_description("Simulation of protein structure")
            .with_category("Bioinformatics", &["Top", "Biology", "Bioinformatics"]),
        Document::new("Genome sequencing pipelines")
            .with_description("Alignment of sequencing reads to a reference genome")
            .with_category("Bioinformatics", &["Top", "Biology", "Bioinformatics"]),
        Document::new("Quantum computing primer")
            .with_description("Qubits, gates and quantum algorithms")
            .with_category("Quantum Computing", &["Top", "Physics", "Quantum_Computing"]),
    ]
}

fn corpus() -> Corpus {
    Corpus::new(lectures()).unwrap()
}

/// Seeded config with a generous MDS time budget so runs are reproducible
fn seeded_config() -> LandscapeConfig {
    LandscapeConfig {
        seed: Some(2015),
        mds_max_seconds: 60.0,
        ..LandscapeConfig::default()
    }
}

/// Reducer that records the strategy it was asked to run
#[derive(Default)]
struct RecordingReducer {
    seen: Mutex<Vec<ReductionStrategy>>,
}

impl RecordingReducer {
    fn strategies(&self) -> Vec<ReductionStrategy> {
        self.seen.lock().unwrap().clone()
    }
}

impl Reducer for RecordingReducer {
    fn reduce(
        &self,
        matrix: &FeatureMatrix,
        strategy: ReductionStrategy,
        params: &ReductionParams,
    ) -> landscape_core::Result<ReducedBasis> {
        self.seen.lock().unwrap().push(strategy);
        SvdReducer.reduce(matrix, strategy, params)
    }
}

#[test]
fn test_one_point_per_document_in_unit_square() {
    let landscape = Landscape::new(seeded_config()).unwrap();
    let result = landscape.compute(&corpus()).unwrap();

    assert_eq!(result.len(), 8);
    for (point, doc) in result.points.iter().zip(lectures()) {
        assert_eq!(point.title, doc.title);
        assert!((0.0..=1.0).contains(&point.x), "x = {}", point.x);
        assert!((0.0..=1.0).contains(&point.y), "y = {}", point.y);
    }
}

#[test]
fn test_normalized_axes_span_unit_interval() {
    let landscape = Landscape::new(seeded_config()).unwrap();
    let result = landscape.compute(&corpus()).unwrap();

    for axis in 0..2 {
        let values: Vec<f64> = result.coordinates().map(|p| p[axis]).collect();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let constant = values.iter().all(|&v| v == 0.5);
        assert!(constant || (min == 0.0 && max == 1.0), "axis {} spans {}..{}", axis, min, max);
    }
}

#[test]
fn test_single_document_sits_at_center() {
    let corpus = Corpus::new(vec![lectures().remove(0)]).unwrap();
    let recorder = RecordingReducer::default();
    let landscape = Landscape::with_reducer(seeded_config(), recorder).unwrap();
    let result = landscape.compute(&corpus).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!((result.points[0].x, result.points[0].y), (0.5, 0.5));
    assert!(landscape.reducer().strategies().is_empty());
    assert_eq!(result.stats.strategy, None);
}

#[test]
fn test_empty_corpus_never_reaches_pipeline() {
    let err = Corpus::new(Vec::new()).unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_small_corpus_takes_direct_branch() {
    let config = LandscapeConfig {
        dense_threshold: 8,
        ..seeded_config()
    };
    let landscape = Landscape::with_reducer(config, RecordingReducer::default()).unwrap();
    let result = landscape.compute(&corpus()).unwrap();

    assert_eq!(landscape.reducer().strategies(), vec![ReductionStrategy::Direct]);
    assert_eq!(result.stats.strategy, Some(ReductionStrategy::Direct));
}

#[test]
fn test_large_corpus_takes_clustered_branch() {
    let config = LandscapeConfig {
        dense_threshold: 7,
        cluster_count: 4,
        ..seeded_config()
    };
    let landscape = Landscape::with_reducer(config, RecordingReducer::default()).unwrap();
    let result = landscape.compute(&corpus()).unwrap();

    assert_eq!(
        landscape.reducer().strategies(),
        vec![ReductionStrategy::Clustered { clusters: 4 }]
    );
    assert_eq!(result.len(), 8);
    assert!(result.coordinates().flatten().all(|v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_fixed_seed_is_deterministic() {
    let landscape = Landscape::new(seeded_config()).unwrap();
    let first = landscape.compute(&corpus()).unwrap();
    let second = landscape.compute(&corpus()).unwrap();

    let a: Vec<[f64; 2]> = first.coordinates().collect();
    let b: Vec<[f64; 2]> = second.coordinates().collect();
    assert_eq!(a, b);
    assert_eq!(first.landmarks, second.landmarks);
}

#[test]
fn test_documents_without_terms_collapse_to_center() {
    let corpus = Corpus::new(vec![Document::new("the of and"), Document::new("a an")]).unwrap();
    let landscape = Landscape::new(seeded_config()).unwrap();
    let result = landscape.compute(&corpus).unwrap();

    assert!(result.coordinates().all(|p| p == [0.5, 0.5]));
    assert_eq!(result.stats.terms, 0);
}

#[test]
fn test_landmarks_use_category_paths() {
    let config = LandscapeConfig {
        landmarks: LandmarkConfig {
            selection: LabelSelection::MostFrequent,
            radius: 2.0,
            ..LandmarkConfig::default()
        },
        ..seeded_config()
    };
    let landscape = Landscape::new(config).unwrap();
    let result = landscape.compute(&corpus()).unwrap();

    // with a radius covering the square every anchor sees the whole corpus
    assert_eq!(result.landmarks.len(), 8);
    assert!(result.landmarks.iter().all(|l| l.label == "Computer Science"));
    assert!(result.landmarks.iter().all(|l| l.frequency == 5));
}

#[test]
fn test_landmarks_can_be_disabled() {
    let config = LandscapeConfig {
        landmarks: LandmarkConfig {
            enabled: false,
            ..LandmarkConfig::default()
        },
        ..seeded_config()
    };
    let result = Landscape::new(config).unwrap().compute(&corpus()).unwrap();
    assert!(result.landmarks.is_empty());
}

#[test]
fn test_points_carry_landmark_tags() {
    let landscape = Landscape::new(seeded_config()).unwrap();
    let result = landscape.compute(&corpus()).unwrap();

    let tags = &result.points[0].landmark_tags;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].0, "Deep Learning");
    assert!(tags.iter().all(|(term, _)| term != "Top"));
    assert_eq!(result.points[0].categories[0], "Computer Science");
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let config = LandscapeConfig {
        convex_n: 0,
        ..LandscapeConfig::default()
    };
    let err = Landscape::new(config).unwrap_err();
    assert!(err.is_input_error());
}
