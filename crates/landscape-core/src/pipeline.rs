//! The landscape layout pipeline

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::LandscapeConfig;
use crate::document::Corpus;
use crate::embed::{retained_dimensions, Mds};
use crate::error::Result;
use crate::features::FeatureSpace;
use crate::landmark::label_landmarks;
use crate::normalize::{normalize_unit_square, MIDPOINT};
use crate::points::{landmark_tags, PipelineStats, Point, PointSet};
use crate::reconstruct::reconstruct;
use crate::reduce::{ReductionStrategy, Reducer, SvdReducer};

/// Lays out one corpus at a time. Holds no per-corpus state, so one value
/// can serve any number of queries.
#[derive(Debug, Clone)]
pub struct Landscape<R = SvdReducer> {
    config: LandscapeConfig,
    reducer: R,
}

impl Landscape<SvdReducer> {
    pub fn new(config: LandscapeConfig) -> Result<Self> {
        Self::with_reducer(config, SvdReducer)
    }
}

impl<R: Reducer> Landscape<R> {
    pub fn with_reducer(config: LandscapeConfig, reducer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, reducer })
    }

    pub fn config(&self) -> &LandscapeConfig {
        &self.config
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    /// Place every document of `corpus` in the unit square and label the
    /// dense regions.
    ///
    /// Feature spaces are built for this corpus alone. The first failing
    /// stage aborts the run.
    pub fn compute(&self, corpus: &Corpus) -> Result<PointSet> {
        let started = Instant::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        debug!("landscape: {} documents, seed {}", corpus.len(), seed);

        let mut lectures = FeatureSpace::new(self.config.fields.clone())?;
        lectures.fit(corpus);
        let mut categories = FeatureSpace::categories();
        categories.fit(corpus);

        let mut stats = PipelineStats {
            documents: corpus.len(),
            terms: lectures.dim(),
            seed,
            ..PipelineStats::default()
        };

        let coordinates = if corpus.len() == 1 {
            vec![[MIDPOINT, MIDPOINT]]
        } else {
            self.layout(corpus, &lectures, seed, &mut stats)?
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let landmarks = label_landmarks(&coordinates, corpus.documents(), &self.config.landmarks, &mut rng);
        debug!("landmarks: {} labeled", landmarks.len());

        let points = corpus
            .iter()
            .zip(&coordinates)
            .map(|(doc, &xy)| Point::from_document(doc, xy, landmark_tags(&categories, doc)))
            .collect::<Vec<_>>();

        stats.elapsed_ms = started.elapsed().as_millis();
        info!(
            "landscape complete: {} points in {}ms",
            points.len(),
            stats.elapsed_ms
        );

        Ok(PointSet {
            points,
            landmarks,
            stats,
        })
    }

    fn layout(
        &self,
        corpus: &Corpus,
        lectures: &FeatureSpace,
        seed: u64,
        stats: &mut PipelineStats,
    ) -> Result<Vec<[f64; 2]>> {
        let matrix = lectures.extract(corpus);
        debug!(
            "features: {} terms x {} documents, {} non-zero",
            matrix.rows(),
            matrix.cols(),
            matrix.nnz()
        );
        if matrix.is_zero() {
            warn!(
                "no document has a single term, placing all {} at the midpoint",
                corpus.len()
            );
            return Ok(vec![[MIDPOINT, MIDPOINT]; corpus.len()]);
        }

        let params = self.config.reduction_params(seed);
        let strategy = ReductionStrategy::select(matrix.cols(), &params);
        let basis = self.reducer.reduce(&matrix, strategy, &params)?;
        stats.strategy = Some(basis.strategy);

        let k = retained_dimensions(&basis.singular_values, self.config.energy_ratio);
        stats.retained_dimensions = k;
        debug!(
            "reduce: {:?}, {} basis columns, keeping {} of {} dimensions",
            basis.strategy,
            basis.width(),
            k,
            basis.singular_values.len()
        );

        let embedding = Mds::new(self.config.mds_params(), seed).fit_transform(&basis.planar_input(k))?;
        stats.mds_steps = embedding.steps;
        stats.termination = Some(embedding.termination);

        let mut coordinates = reconstruct(&matrix, &basis.basis, &embedding.coordinates, self.config.convex_n)?;
        normalize_unit_square(&mut coordinates);
        Ok(coordinates)
    }
}
