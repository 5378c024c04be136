//! Lecture landscape service.
//!
//! Wraps the landscape engine with a lecture catalog, a write-once result
//! cache and JSON request handlers. The pipeline itself runs on tokio's
//! blocking pool so request handling never waits on numeric work.

pub mod cache;
pub mod catalog;
pub mod error;
pub mod handlers;
pub mod service;
pub mod tracing;

pub use cache::ResultCache;
pub use catalog::{CorpusSource, MemoryCatalog, QueryFilter};
pub use error::{Error, Result};
pub use handlers::{HandlerContext, Reply, Request};
pub use service::{LandscapeResponse, LandscapeService, ServiceStatus, INITIAL_CATEGORY, NO_DATA, SERVER_ERROR};
