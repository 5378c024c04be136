use std::sync::Arc;
use std::time::Duration;

use landscape_core::{Corpus, Landmark, Landscape, LandscapeConfig, PipelineStats, Point, PointSet};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::cache::ResultCache;
use crate::catalog::{CorpusSource, MemoryCatalog, QueryFilter};
use crate::error::{Error, Result};

/// Reply when the filter selects no lectures.
pub const NO_DATA: &str = "No data found!";

/// Reply when the pipeline fails; details go to the log only.
pub const SERVER_ERROR: &str = "Error on the server side!";

/// Category of the warm-up landscape.
pub const INITIAL_CATEGORY: &str = "Big Data";

/// What a landscape request returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LandscapeResponse {
    Points {
        searchwords: QueryFilter,
        points: Vec<Point>,
        landmarks: Vec<Landmark>,
        stats: PipelineStats,
    },
    Error {
        error: String,
    },
}

impl LandscapeResponse {
    fn from_points(searchwords: QueryFilter, set: PointSet) -> Self {
        Self::Points {
            searchwords,
            points: set.points,
            landmarks: set.landmarks,
            stats: set.stats,
        }
    }

    fn error(message: &str) -> Self {
        Self::Error {
            error: message.to_string(),
        }
    }

    pub fn points(&self) -> &[Point] {
        match self {
            Self::Points { points, .. } => points,
            Self::Error { .. } => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Points { .. } => None,
        }
    }
}

/// Service health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub lectures: usize,
    pub cache_entries: usize,
    pub initial_ready: bool,
}

/// Renders landscapes for query filters.
///
/// Each request gets its own corpus and feature spaces; the pipeline runs on
/// the blocking pool and its result is cached under the filter's key.
pub struct LandscapeService<S = MemoryCatalog> {
    source: Arc<S>,
    landscape: Arc<Landscape>,
    cache: ResultCache<LandscapeResponse>,
    initial: RwLock<Option<Arc<LandscapeResponse>>>,
    timeout: Option<Duration>,
}

impl<S: CorpusSource> LandscapeService<S> {
    pub fn new(source: S, config: LandscapeConfig) -> Result<Self> {
        let landscape = Landscape::new(config).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self {
            source: Arc::new(source),
            landscape: Arc::new(landscape),
            cache: ResultCache::new(),
            initial: RwLock::new(None),
            timeout: None,
        })
    }

    /// Stop waiting for a pipeline run after `timeout`. The abandoned run
    /// finishes on its worker and its result is dropped.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Landscape for `filter`, from cache when available.
    pub async fn render(&self, filter: &QueryFilter) -> Result<Arc<LandscapeResponse>> {
        let key = filter.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            debug!("cache hit for '{}'", key);
            return Ok(hit);
        }

        let corpus = Corpus::new(self.source.query(filter))?;
        debug!("query '{}' selected {} lectures", key, corpus.len());

        let landscape = Arc::clone(&self.landscape);
        let task = tokio::task::spawn_blocking(move || landscape.compute(&corpus));
        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| Error::Internal(format!("landscape timed out after {:?}", limit)))?,
            None => task.await,
        };
        let set = joined.map_err(|e| Error::Internal(format!("landscape worker failed: {}", e)))??;

        let response = Arc::new(LandscapeResponse::from_points(filter.clone(), set));
        Ok(self.cache.insert(key, response))
    }

    /// Landscape for `filter` with failures turned into error replies.
    pub async fn points(&self, filter: &QueryFilter) -> Arc<LandscapeResponse> {
        match self.render(filter).await {
            Ok(response) => response,
            Err(e) if e.is_empty_corpus() => {
                info!("no lectures for '{}'", filter.cache_key());
                Arc::new(LandscapeResponse::error(NO_DATA))
            }
            Err(e) => {
                error!("landscape for '{}' failed: {}", filter.cache_key(), e);
                Arc::new(LandscapeResponse::error(SERVER_ERROR))
            }
        }
    }

    /// Compute and keep the landscape served by [`Self::initial`].
    pub async fn warm_up(&self, category: &str) -> Arc<LandscapeResponse> {
        info!("computing initial landscape for '{}'", category);
        let response = self.points(&QueryFilter::category(category)).await;
        *self.initial.write() = Some(Arc::clone(&response));
        response
    }

    pub fn initial(&self) -> Option<Arc<LandscapeResponse>> {
        self.initial.read().clone()
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            lectures: self.source.size(),
            cache_entries: self.cache.len(),
            initial_ready: self.initial.read().is_some(),
        }
    }

    /// Drop one cached landscape, or all of them. Returns how many went.
    pub fn invalidate(&self, key: Option<&str>) -> usize {
        let dropped = match key {
            Some(key) => usize::from(self.cache.invalidate(key)),
            None => self.cache.invalidate_all(),
        };
        info!("invalidated {} cached landscapes", dropped);
        dropped
    }
}
