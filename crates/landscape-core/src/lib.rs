//! Lecture Landscape Engine
//!
//! Places the lectures of a corpus on a plane so that lectures with similar
//! text end up close together, then labels dense regions with topic names.
//!
//! The pipeline runs TF-IDF feature extraction, rank reduction (SVD, with
//! spherical k-means first for large corpora), metric MDS of the reduced
//! basis, convex reconstruction of every document and rescaling into the unit
//! square.
//!
//! # Features
//!
//! - `parallel` - Parallel k-means assignment and reconstruction via rayon
//!
//! # Example
//!
//! ```rust
//! use landscape_core::{Corpus, Document, Landscape, LandscapeConfig};
//!
//! let corpus = Corpus::new(vec![
//!     Document::new("Graph mining at scale"),
//!     Document::new("Mining social graphs"),
//!     Document::new("Protein structure prediction"),
//! ])
//! .unwrap();
//!
//! let config = LandscapeConfig {
//!     seed: Some(7),
//!     ..LandscapeConfig::default()
//! };
//! let landscape = Landscape::new(config).unwrap();
//! let points = landscape.compute(&corpus).unwrap();
//!
//! assert_eq!(points.len(), 3);
//! for p in &points.points {
//!     assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
//! }
//! ```

pub mod config;
pub mod document;
pub mod embed;
pub mod error;
pub mod features;
pub mod landmark;
pub mod normalize;
pub mod pipeline;
pub mod points;
pub mod reconstruct;
pub mod reduce;

// Re-export main types at crate root
pub use config::LandscapeConfig;
pub use document::{Category, Corpus, Document, Organization, Presenter, ROOT_CATEGORY};
pub use embed::{retained_dimensions, DistanceMetric, Embedding, Mds, MdsParams, Termination};
pub use error::{LandscapeError, Result, Stage};
pub use features::{FeatureMatrix, FeatureSpace, FieldConfig, TextField, Tokenizer};
pub use landmark::{LabelSelection, Landmark, LandmarkConfig};
pub use normalize::normalize_unit_square;
pub use pipeline::Landscape;
pub use points::{PipelineStats, Point, PointSet};
pub use reconstruct::{convex_combination, reconstruct};
pub use reduce::{ReducedBasis, ReductionParams, ReductionStrategy, Reducer, SvdReducer};
