//! Text feature extraction
//!
//! Turns a corpus into a sparse term × document TF-IDF matrix. Each field owns
//! its vocabulary; a document column concatenates its per-field sub-vectors,
//! each L2-normalized.
//!
//! # Example
//!
//! ```rust
//! use landscape_core::{Corpus, Document, FeatureSpace};
//!
//! let corpus = Corpus::new(vec![
//!     Document::new("Graph mining at scale"),
//!     Document::new("Mining social graphs"),
//! ])
//! .unwrap();
//!
//! let mut space = FeatureSpace::lectures();
//! space.fit(&corpus);
//! let matrix = space.extract(&corpus);
//! assert_eq!(matrix.cols(), 2);
//! ```

mod matrix;
mod space;
mod tokenizer;

pub use matrix::FeatureMatrix;
pub use space::{lecture_fields, validate_fields, FeatureSpace, FieldConfig, TextField};
pub use tokenizer::{is_stop_word, phrase, tokenize, Tokenizer};
