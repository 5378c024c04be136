use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{CorpusSource, QueryFilter};
use crate::error::{Error, Result};
use crate::service::LandscapeService;

/// Known request methods.
const KNOWN_METHODS: &[&str] = &["points", "initial", "status", "invalidate"];

/// One JSON request: `{"id": ..., "method": "points", "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub data: Value,
}

/// Reply to one request, echoing its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub body: Value,
}

/// Handler context wrapping the shared service.
pub struct HandlerContext<S> {
    service: Arc<LandscapeService<S>>,
}

impl<S> Clone for HandlerContext<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: CorpusSource> HandlerContext<S> {
    pub fn new(service: Arc<LandscapeService<S>>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &LandscapeService<S> {
        &self.service
    }

    /// Parse one request line and answer it. Failures become `{"error": ...}`.
    pub async fn dispatch(&self, line: &str) -> Reply {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("malformed request: {}", e);
                return Reply {
                    id: None,
                    body: serde_json::json!({ "error": format!("Invalid request: {}", e) }),
                };
            }
        };

        let id = request.id.clone();
        let body = match self.handle(request).await {
            Ok(body) => body,
            Err(e) => {
                warn!("request failed: {}", e);
                serde_json::json!({ "error": e.to_string() })
            }
        };
        Reply { id, body }
    }

    /// Route a request to its handler.
    pub async fn handle(&self, request: Request) -> Result<Value> {
        debug!("request: {}", request.method);
        match request.method.as_str() {
            "points" => self.handle_points(request.data).await,
            "initial" => self.handle_initial(),
            "status" => Ok(serde_json::to_value(self.service.status())?),
            "invalidate" => self.handle_invalidate(request.data),
            other => Err(Error::Handler(format!(
                "Unknown method '{}', expected one of: {}",
                other,
                KNOWN_METHODS.join(", ")
            ))),
        }
    }

    /// `points` - landscape for a query filter (`null` selects everything).
    async fn handle_points(&self, data: Value) -> Result<Value> {
        let filter: QueryFilter = if data.is_null() {
            QueryFilter::default()
        } else {
            serde_json::from_value(data)
                .map_err(|e| Error::Handler(format!("Invalid points request: {}", e)))?
        };
        let response = self.service.points(&filter).await;
        Ok(serde_json::to_value(response.as_ref())?)
    }

    /// `initial` - the warm-up landscape.
    fn handle_initial(&self) -> Result<Value> {
        let response = self
            .service
            .initial()
            .ok_or_else(|| Error::Handler("initial landscape has not been computed".to_string()))?;
        Ok(serde_json::to_value(response.as_ref())?)
    }

    /// `invalidate` - drop one cache key, or everything when no key is given.
    fn handle_invalidate(&self, data: Value) -> Result<Value> {
        #[derive(Deserialize, Default)]
        struct InvalidateRequest {
            #[serde(default)]
            key: Option<String>,
        }

        let req: InvalidateRequest = if data.is_null() {
            InvalidateRequest::default()
        } else {
            serde_json::from_value(data)
                .map_err(|e| Error::Handler(format!("Invalid invalidate request: {}", e)))?
        };
        let dropped = self.service.invalidate(req.key.as_deref());
        Ok(serde_json::json!({ "invalidated": dropped }))
    }
}
